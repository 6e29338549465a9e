// Copyright (c) 2022. Sebastien Soudan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http:www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Diagnostic-driven two-sample hypothesis testing
//!
//! Check the [`prelude`] module for the public API.
use thiserror::Error;

/// The prelude module re-exports the most commonly used types and traits.
/// This is the public API. Enjoy!
pub mod prelude;

/// Group extraction from tabular records
pub mod cohort;

/// Spearman rank correlation and equal-length reductions
pub mod correlation;

/// Test selection and orchestration
pub mod evaluator;

/// Shapiro-Wilk normality test
pub mod normality;

/// Test records and verdicts
pub mod report;

/// The four greater-mean significance tests
pub mod significance;

pub(crate) mod dist;
pub(crate) mod sample;

/// The error type for this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A sample is too small for the method.
    #[error("{method} requires at least {required} observations, got {actual}")]
    InsufficientData {
        /// Method that rejected the input.
        method: &'static str,
        /// Minimum number of observations.
        required: usize,
        /// Number of observations supplied.
        actual: usize,
    },
    /// A paired method was given samples of different lengths.
    ///
    /// This is a case of insufficient data: the longer sample has
    /// observations with nothing to pair them with. Use
    /// [`Error::is_insufficient_data`] to match both variants.
    #[error("{method} requires paired samples of equal length, got {left} and {right}")]
    UnequalLengths {
        /// Method that rejected the input.
        method: &'static str,
        /// Length of the first sample.
        left: usize,
        /// Length of the second sample.
        right: usize,
    },
    /// The statistic is undefined because the data has no spread.
    #[error("{method} is undefined for constant data")]
    ConstantData {
        /// Method that rejected the input.
        method: &'static str,
    },
    /// A sample is empty or holds non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the input has too few usable observations. This covers
    /// [`Error::InsufficientData`] and [`Error::UnequalLengths`].
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Error::InsufficientData { .. } | Error::UnequalLengths { .. }
        )
    }
}
