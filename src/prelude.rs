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
//! We have two samples, say the sick-leave days of two groups of employees, and we
//! want to know whether the first group's mean is significantly greater than the
//! second's. Which test is appropriate depends on the data: the t-tests assume
//! normality, the rank tests do not, and paired tests need observations that
//! correspond one-to-one.
//!
//! [`HypothesisEvaluator`] checks the data first and picks the test accordingly:
//!
//! | normal? | strongly correlated? | test |
//! |---|---|---|
//! | no  | yes | Wilcoxon signed-rank |
//! | no  | no  | Mann-Whitney U |
//! | yes | yes | Student's paired t |
//! | yes | no  | Student's t |
//!
//! Normality is checked with a Shapiro-Wilk test on both samples pooled together,
//! correlation with Spearman's rho. The returned [`Verdict`] keeps the statistic and
//! p-value of every test that was run.
//!
//! # References
//! - [Shapiro-Wilk test](https://en.wikipedia.org/wiki/Shapiro%E2%80%93Wilk_test)
//! - [Spearman's rank correlation](https://en.wikipedia.org/wiki/Spearman%27s_rank_correlation_coefficient)
//! - [Mann-Whitney U test](https://en.wikipedia.org/wiki/Mann%E2%80%93Whitney_U_test)
//! - [Wilcoxon signed-rank test](https://en.wikipedia.org/wiki/Wilcoxon_signed-rank_test)
//! - [Student's t-test](https://en.wikipedia.org/wiki/Student%27s_t-test)
//!
//! # Example
//!
//! ```rust
//! use adaptive_ht::prelude::*;
//! use rand::prelude::Distribution;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rand_distr::StandardNormal;
//!
//! let mut rng = &mut ChaCha8Rng::seed_from_u64(42);
//!
//! let a = StandardNormal
//!     .sample_iter(&mut rng)
//!     .take(100)
//!     .map(|x: f64| x + 0.7)
//!     .collect::<Vec<f64>>();
//! let b = StandardNormal
//!     .sample_iter(&mut rng)
//!     .take(100)
//!     .collect::<Vec<f64>>();
//!
//! let verdict = evaluate(&a, &b).unwrap();
//! assert!(verdict.rejects_null());
//! // mean(a) > mean(b) is supported, whichever of the unpaired tests was used
//! assert!(!verdict.strategy().is_paired());
//!
//! for record in verdict.trail() {
//!     println!("{record}");
//! }
//! ```

pub use crate::correlation::Reduction;
pub use crate::evaluator::{evaluate, Config, HypothesisEvaluator};
pub use crate::report::{DiagnosticResult, Method, TestRecord, Verdict};
pub use crate::significance::{Alternative, Strategy};
pub use crate::Error;

/// Shapiro-Wilk normality test
pub mod normality {
    pub use crate::normality::{shapiro_wilk, MIN_OBSERVATIONS};
}

/// Spearman rank correlation
pub mod correlation {
    pub use crate::correlation::{spearman, spearman_reduced, Reduction, MIN_PAIRS};
}

/// greater-mean significance tests
pub mod significance {
    pub use crate::significance::{
        mann_whitney_u, paired_t, student_t, wilcoxon_signed_rank, Alternative, Strategy,
    };
}

/// sick-leave cohorts
pub mod cohort {
    pub use crate::cohort::{split, CohortReport, Cohorts, Record, Sex};
}
