//! # Sample Data Bootstrap
//!
//! Seeds a fixed demonstration dataset at startup when
//! `SEED_SAMPLE_DATA=true` and the registry is empty.
//!
//! Seeding is a deployment step, not a domain rule: records go through the
//! normal services, so every invariant applies, and are written through to
//! the database when one is configured. A registry that already holds any
//! record is never touched.

use agro_core::{
    CropType, DomainError, NewCrop, NewFarm, NewHarvest, NewProducer, ProducerId,
};
use agro_registry::{ReadUnit, RecordCounts, Repository};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors while seeding.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A sample record was rejected by the registry.
    #[error("sample record rejected: {0}")]
    Domain(#[from] DomainError),

    /// A sample record could not be written to the database.
    #[error("failed to persist sample record: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

struct SampleProducer {
    name: &'static str,
    document: &'static str,
    farms: &'static [SampleFarm],
}

struct SampleFarm {
    name: &'static str,
    city: &'static str,
    state: &'static str,
    total_area: f64,
    agricultural_area: f64,
    vegetation_area: f64,
    harvests: &'static [SampleHarvest],
}

struct SampleHarvest {
    year: i32,
    description: &'static str,
    crops: &'static [(CropType, f64)],
}

use CropType::{Coffee, Corn, Cotton, Soy, Sugarcane};

const SAMPLE: &[SampleProducer] = &[
    SampleProducer {
        name: "João Silva Santos",
        document: "111.444.777-35",
        farms: &[
            SampleFarm {
                name: "Fazenda Santa Rita",
                city: "Ribeirão Preto",
                state: "SP",
                total_area: 1200.0,
                agricultural_area: 900.0,
                vegetation_area: 300.0,
                harvests: &[
                    SampleHarvest {
                        year: 2024,
                        description: "Safra 2024 - Principal",
                        crops: &[(Soy, 700.0), (Corn, 200.0)],
                    },
                    SampleHarvest {
                        year: 2024,
                        description: "Safrinha 2024",
                        crops: &[(Corn, 500.0), (Cotton, 400.0)],
                    },
                ],
            },
            SampleFarm {
                name: "Sítio Boa Vista",
                city: "Franca",
                state: "SP",
                total_area: 450.0,
                agricultural_area: 350.0,
                vegetation_area: 100.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024",
                    crops: &[(Coffee, 250.0), (Soy, 100.0)],
                }],
            },
            SampleFarm {
                name: "Fazenda Nova Era",
                city: "Araraquara",
                state: "SP",
                total_area: 650.0,
                agricultural_area: 500.0,
                vegetation_area: 150.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024",
                    crops: &[(Sugarcane, 350.0), (Soy, 150.0)],
                }],
            },
        ],
    },
    SampleProducer {
        name: "Maria Oliveira Costa",
        document: "987.654.321-00",
        farms: &[SampleFarm {
            name: "Fazenda Esperança",
            city: "Uberaba",
            state: "MG",
            total_area: 2500.0,
            agricultural_area: 2000.0,
            vegetation_area: 500.0,
            harvests: &[SampleHarvest {
                year: 2024,
                description: "Safra 2024 - Principal",
                crops: &[(Soy, 1500.0), (Corn, 500.0)],
            }],
        }],
    },
    SampleProducer {
        name: "Fazendas Reunidas Ltda",
        document: "11.222.333/0001-81",
        farms: &[
            SampleFarm {
                name: "Complexo Agropecuário Vale Verde",
                city: "Campo Grande",
                state: "MS",
                total_area: 5000.0,
                agricultural_area: 4200.0,
                vegetation_area: 800.0,
                harvests: &[
                    SampleHarvest {
                        year: 2024,
                        description: "Safra 2024 - Verão",
                        crops: &[(Soy, 3000.0), (Corn, 1200.0)],
                    },
                    SampleHarvest {
                        year: 2024,
                        description: "Safra 2024 - Inverno",
                        crops: &[(Cotton, 2500.0), (Corn, 1700.0)],
                    },
                ],
            },
            SampleFarm {
                name: "Fazenda União",
                city: "Dourados",
                state: "MS",
                total_area: 3200.0,
                agricultural_area: 2800.0,
                vegetation_area: 400.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024",
                    crops: &[(Soy, 2000.0), (Sugarcane, 800.0)],
                }],
            },
        ],
    },
    SampleProducer {
        name: "Pedro Almeida Ferreira",
        document: "123.456.789-09",
        farms: &[SampleFarm {
            name: "Rancho Dois Irmãos",
            city: "Barretos",
            state: "SP",
            total_area: 800.0,
            agricultural_area: 600.0,
            vegetation_area: 200.0,
            harvests: &[SampleHarvest {
                year: 2024,
                description: "Safra 2024",
                crops: &[(Coffee, 400.0), (Corn, 200.0)],
            }],
        }],
    },
    SampleProducer {
        name: "Agropecuária Brasil S/A",
        document: "11.444.777/0001-61",
        farms: &[
            SampleFarm {
                name: "Fazenda Continental",
                city: "Sorriso",
                state: "MT",
                total_area: 8500.0,
                agricultural_area: 7500.0,
                vegetation_area: 1000.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024 - Principal",
                    crops: &[(Soy, 5500.0), (Corn, 2000.0)],
                }],
            },
            SampleFarm {
                name: "Fazenda Primavera",
                city: "Lucas do Rio Verde",
                state: "MT",
                total_area: 6200.0,
                agricultural_area: 5500.0,
                vegetation_area: 700.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024 - Principal",
                    crops: &[(Soy, 4000.0), (Cotton, 1500.0)],
                }],
            },
        ],
    },
    SampleProducer {
        name: "Cooperativa Agrícola Central",
        document: "22.333.444/0001-81",
        farms: &[
            SampleFarm {
                name: "Fazenda Cooperada Norte",
                city: "Cristalina",
                state: "GO",
                total_area: 4800.0,
                agricultural_area: 4000.0,
                vegetation_area: 800.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024 - Verão",
                    crops: &[(Soy, 3000.0), (Corn, 1000.0)],
                }],
            },
            SampleFarm {
                name: "Fazenda Cooperada Sul",
                city: "Rio Verde",
                state: "GO",
                total_area: 3600.0,
                agricultural_area: 3000.0,
                vegetation_area: 600.0,
                harvests: &[SampleHarvest {
                    year: 2024,
                    description: "Safra 2024 - Verão",
                    crops: &[(Soy, 2200.0), (Cotton, 800.0)],
                }],
            },
        ],
    },
];

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert the sample dataset if the registry is empty.
///
/// Returns the number of records created, or `None` if the registry already
/// held data and nothing was done.
pub async fn seed_sample_data(state: &AppState) -> Result<Option<RecordCounts>, BootstrapError> {
    let existing = state.registry.repository().read(|unit| unit.counts());
    if !existing.is_empty() {
        tracing::info!(
            producers = existing.producers,
            farms = existing.farms,
            "registry already populated; skipping sample data"
        );
        return Ok(None);
    }

    let mut created = RecordCounts::default();
    for sample in SAMPLE {
        let producer_id = seed_producer(state, sample).await?;
        created.producers += 1;

        for farm in sample.farms {
            seed_farm(state, producer_id, farm, &mut created).await?;
        }
    }

    tracing::info!(
        producers = created.producers,
        farms = created.farms,
        harvests = created.harvests,
        crops = created.crops,
        "sample data seeded"
    );
    Ok(Some(created))
}

async fn seed_producer(
    state: &AppState,
    sample: &SampleProducer,
) -> Result<ProducerId, BootstrapError> {
    let producer = state.registry.producers().create(NewProducer {
        name: sample.name.to_string(),
        document: sample.document.to_string(),
    })?;
    if let Some(pool) = &state.db_pool {
        crate::db::producers::insert(pool, &producer).await?;
    }
    Ok(producer.id)
}

async fn seed_farm(
    state: &AppState,
    producer_id: ProducerId,
    sample: &SampleFarm,
    created: &mut RecordCounts,
) -> Result<(), BootstrapError> {
    let farm = state.registry.farms().create(NewFarm {
        producer_id,
        name: sample.name.to_string(),
        city: sample.city.to_string(),
        state: sample.state.to_string(),
        total_area: sample.total_area,
        agricultural_area: sample.agricultural_area,
        vegetation_area: sample.vegetation_area,
    })?;
    if let Some(pool) = &state.db_pool {
        crate::db::farms::insert(pool, &farm).await?;
    }
    created.farms += 1;

    for sample_harvest in sample.harvests {
        let harvest = state.registry.harvests().create(NewHarvest {
            farm_id: farm.id,
            year: sample_harvest.year,
            description: sample_harvest.description.to_string(),
        })?;
        if let Some(pool) = &state.db_pool {
            crate::db::harvests::insert(pool, &harvest).await?;
        }
        created.harvests += 1;

        for &(crop_type, planted_area) in sample_harvest.crops {
            let crop = state.registry.crops().create(NewCrop {
                harvest_id: harvest.id,
                crop_type,
                planted_area,
            })?;
            if let Some(pool) = &state.db_pool {
                crate::db::crops::insert(pool, &crop).await?;
            }
            created.crops += 1;
        }
    }
    Ok(())
}
