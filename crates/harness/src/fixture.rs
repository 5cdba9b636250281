//! Canonical input fixtures for form-filling steps.
//!
//! The fixture set is read-only: steps copy values into form fields and
//! never mutate the records themselves.

/// A fixed patient record used as form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePatient {
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub phone: String,
    pub address: String,
}

/// Positional variants for repeated form entries. `variant(n)` cycles
/// through these deterministically.
const VARIANTS: [(&str, &str, &str, &str, &str); 3] = [
    (
        "Eleanor Vance",
        "female",
        "1957-03-14",
        "555-0142",
        "18 Rosewood Lane",
    ),
    (
        "Marcus Webb",
        "male",
        "1984-11-02",
        "555-0178",
        "402 Harbor View Road",
    ),
    (
        "Priya Natarajan",
        "female",
        "1991-06-27",
        "555-0163",
        "77 Juniper Court, Apt 4",
    ),
];

impl SamplePatient {
    /// The canonical record used by the first add-patient step.
    pub fn base() -> Self {
        Self::variant(0)
    }

    /// Deterministic positional variant for repeated entries.
    pub fn variant(n: usize) -> Self {
        let (name, gender, birth_date, phone, address) = VARIANTS[n % VARIANTS.len()];
        Self {
            name: name.to_string(),
            gender: gender.to_string(),
            birth_date: birth_date.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
        }
    }

    /// A deliberately invalid record (2-character name, below the console's
    /// minimum length) used to capture the validation-error UI state.
    pub fn invalid() -> Self {
        Self {
            name: "Jo".to_string(),
            gender: "other".to_string(),
            birth_date: "2001-01-01".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Short Street".to_string(),
        }
    }
}
