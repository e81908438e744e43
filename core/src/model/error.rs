//! Model error types.

use thiserror::Error;

use crate::model::category::Category;
use crate::model::process::ProcessKey;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Unknown issue: {0}")]
    UnknownIssue(String),

    #[error("Routing for {category} sums to {sum:.4}, expected 1")]
    InvalidRouting { category: Category, sum: f64 },

    #[error("Routing for {category} has a negative fraction for {process}")]
    NegativeFraction { category: Category, process: ProcessKey },

    #[error("Routing for {category} sends cartons to Decant")]
    DecantDestination { category: Category },

    #[error("Invalid scenario name: '{0}' (use letters, digits, '-' or '_')")]
    InvalidScenarioName(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
