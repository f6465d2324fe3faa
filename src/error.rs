//! Error types for the volatility / VaR engine.
//!
//! Three failure kinds cover the whole core:
//! - `InvalidData`  — malformed or insufficient input (precondition violation)
//! - `Convergence`  — the likelihood optimizer exhausted its budget or left
//!   the feasible region
//! - `NotFitted`    — forecast requested before `fit()`
//!
//! No error is recovered silently inside the core; the caller decides on
//! retries or fallbacks.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("invalid data: {reason}")]
    InvalidData { reason: String },

    #[error("optimizer did not converge: {reason}")]
    Convergence { reason: String },

    #[error("model not fitted: call fit() before forecast()")]
    NotFitted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RiskError {
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        RiskError::InvalidData { reason: reason.into() }
    }

    pub fn convergence(reason: impl Into<String>) -> Self {
        RiskError::Convergence { reason: reason.into() }
    }
}
