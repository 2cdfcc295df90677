//! # API Route Modules
//!
//! - `producers` — producer CRUD; deleting a producer cascades to its farms.
//! - `farms` — farm CRUD with the area invariant, filterable by producer.
//! - `harvests` — harvest create/read/delete, paged listing, per-farm view.
//! - `crops` — crop create/read/delete, paged listing, per-harvest and
//!   per-type views.
//! - `dashboard` — read-only aggregations over the live dataset.
//!
//! Every handler takes a [`CallerIdentity`](crate::auth::CallerIdentity):
//! reads require `viewer`, mutations require `operator`.

pub mod crops;
pub mod dashboard;
pub mod farms;
pub mod harvests;
pub mod producers;

use axum::Router;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::state::AppState;

/// Assemble every `/api` route.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(producers::router())
        .merge(farms::router())
        .merge(harvests::router())
        .merge(crops::router())
        .merge(dashboard::router())
}

/// Offset pagination for list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// Number of items to skip (default: 0).
    pub skip: Option<usize>,
    /// Maximum number of items to return (default: 100, max: 1000).
    pub limit: Option<usize>,
}

impl Pagination {
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIMIT: usize = 1000;

    fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    fn effective_skip(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    /// Slice one page out of an ordered listing.
    pub fn page<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.effective_skip())
            .take(self.effective_limit())
            .collect()
    }
}
