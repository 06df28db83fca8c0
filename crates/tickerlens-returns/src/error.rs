//! Error types for return calculations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for return calculations.
pub type Result<T> = std::result::Result<T, ReturnError>;

/// Reasons a year's percentage return is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ReturnError {
    /// The first price of the year is zero.
    #[error("Division by zero: first price of {year} is zero")]
    DivisionByZero {
        /// Calendar year of the bucket
        year: i32,
    },

    /// The first or last price of the year is NaN or infinite.
    #[error("Non-finite price in {year}")]
    NonFinitePrice {
        /// Calendar year of the bucket
        year: i32,
    },

    /// The ratio of last to first price does not fit in an `f64`.
    #[error("Return overflow in {year}: first price is too small")]
    ReturnOverflow {
        /// Calendar year of the bucket
        year: i32,
    },
}

impl ReturnError {
    /// Calendar year the error refers to.
    pub const fn year(&self) -> i32 {
        match self {
            Self::DivisionByZero { year }
            | Self::NonFinitePrice { year }
            | Self::ReturnOverflow { year } => *year,
        }
    }
}
