use std::fmt;

/// Recoverable failures of the history operations.
///
/// None of them leaves partial state behind: every check runs before the
/// first mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuantError {
    /// The history is not present in the tree.
    NotDeclared(String),
    /// The history exists but has no energy to report.
    NoEnergy(String),
    /// Neither side of an equality carries energy.
    NoEnergyToMerge(String, String),
}

impl fmt::Display for QuantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantError::NotDeclared(h) => write!(f, "history {h} is not declared"),
            QuantError::NoEnergy(h) => write!(f, "history {h} has no energy"),
            QuantError::NoEnergyToMerge(a, b) => {
                write!(f, "neither {a} nor {b} has energy to merge")
            }
        }
    }
}

impl std::error::Error for QuantError {}

pub type Result<T> = std::result::Result<T, QuantError>;
