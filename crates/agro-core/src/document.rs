//! # Taxpayer Documents (CPF / CNPJ)
//!
//! Structural validation and canonical rendering of Brazilian taxpayer
//! registry numbers:
//!
//! - **CPF** — individual taxpayer, 11 digits, rendered `NNN.NNN.NNN-NN`
//! - **CNPJ** — corporate taxpayer, 14 digits, rendered `NN.NNN.NNN/NNNN-NN`
//!
//! Both carry two trailing check digits computed from weighted sums modulo
//! 11. Sequences of one repeated digit (`111.111.111-11`) satisfy the
//! arithmetic but are never issued, so they are rejected explicitly.
//!
//! Every function here is pure: punctuation is stripped first, so
//! `"111.444.777-35"` and `"11144477735"` validate and format identically.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Strip every character that is not an ASCII digit.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Decode a normalized digit string into numeric digits.
fn to_digits(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_identical(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// CPF check digit over `digits`, weights descending from `len + 1` to 2.
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let value = 11 - sum % 11;
    if value >= 10 {
        0
    } else {
        value
    }
}

/// CNPJ check digit with an explicit weight vector.
fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        11 - rest
    }
}

/// Whether `raw` is a structurally valid CPF.
///
/// Requires exactly 11 digits after normalization, not all identical, with
/// both check digits matching.
pub fn is_valid_cpf(raw: &str) -> bool {
    let d = to_digits(&normalize(raw));
    if d.len() != CPF_LEN || all_identical(&d) {
        return false;
    }
    cpf_check_digit(&d[..9]) == d[9] && cpf_check_digit(&d[..10]) == d[10]
}

/// Whether `raw` is a structurally valid CNPJ.
///
/// Requires exactly 14 digits after normalization, not all identical, with
/// both check digits matching.
pub fn is_valid_cnpj(raw: &str) -> bool {
    let d = to_digits(&normalize(raw));
    if d.len() != CNPJ_LEN || all_identical(&d) {
        return false;
    }
    cnpj_check_digit(&d[..12], &CNPJ_FIRST_WEIGHTS) == d[12]
        && cnpj_check_digit(&d[..13], &CNPJ_SECOND_WEIGHTS) == d[13]
}

/// Whether `raw` is a valid CPF or CNPJ, dispatching on normalized length.
pub fn is_valid_document(raw: &str) -> bool {
    match DocumentKind::detect(raw) {
        Some(DocumentKind::Cpf) => is_valid_cpf(raw),
        Some(DocumentKind::Cnpj) => is_valid_cnpj(raw),
        None => false,
    }
}

/// Render `raw` in its punctuated form.
///
/// Inputs that do not normalize to 11 or 14 digits are returned unchanged
/// (not normalized). Checksums are not consulted.
pub fn format(raw: &str) -> String {
    let d = normalize(raw);
    match d.len() {
        CPF_LEN => format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]),
        CNPJ_LEN => format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        ),
        _ => raw.to_string(),
    }
}

/// Which registry a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Corporate taxpayer (14 digits).
    Cnpj,
}

impl DocumentKind {
    /// Classify by normalized length alone. Checksums are not consulted.
    pub fn detect(raw: &str) -> Option<Self> {
        match normalize(raw).len() {
            CPF_LEN => Some(Self::Cpf),
            CNPJ_LEN => Some(Self::Cnpj),
            _ => None,
        }
    }

    /// Return the uppercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated CPF or CNPJ.
///
/// Stored in canonical digits-only form; two documents compare equal
/// exactly when their digits match, regardless of how they were punctuated
/// on input. Deserialization re-validates, so an invalid document can never
/// be materialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Document(String);

impl Document {
    /// Validate and normalize `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDocument`] carrying the original
    /// input if it is not a valid CPF or CNPJ.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if !is_valid_document(raw) {
            return Err(ValidationError::InvalidDocument(raw.to_string()));
        }
        Ok(Self(normalize(raw)))
    }

    /// The document digits, without punctuation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a CPF or a CNPJ.
    pub fn kind(&self) -> DocumentKind {
        if self.0.len() == CPF_LEN {
            DocumentKind::Cpf
        } else {
            DocumentKind::Cnpj
        }
    }

    /// The punctuated rendering (`NNN.NNN.NNN-NN` or `NN.NNN.NNN/NNNN-NN`).
    pub fn formatted(&self) -> String {
        format(&self.0)
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<String> for Document {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Document> for String {
    fn from(doc: Document) -> String {
        doc.0
    }
}

impl std::str::FromStr for Document {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
