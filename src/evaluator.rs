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

use num_traits::ToPrimitive;

use crate::correlation::{spearman_reduced, Reduction};
use crate::normality::shapiro_wilk;
use crate::report::{Method, TestRecord, Verdict};
use crate::sample::to_f64;
use crate::significance::{Alternative, Strategy};
use crate::Error;

/// Thresholds and options of the decision procedure.
///
/// The defaults reproduce the conventional setup: every decision is taken at
/// the 5% level and two samples count as strongly correlated above a rank
/// correlation of 0.7.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Significance level of the selected test.
    pub alpha: f64,
    /// Normality is rejected when the Shapiro-Wilk p-value is below this.
    pub normality_alpha: f64,
    /// Rank correlation above which the samples may be treated as paired.
    pub correlation_threshold: f64,
    /// The samples are treated as paired only when the Spearman p-value is
    /// above this.
    pub correlation_alpha: f64,
    /// Direction of the alternative hypothesis.
    pub alternative: Alternative,
    /// Equal-length reduction applied before the correlation check.
    pub reduction: Reduction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            normality_alpha: 0.05,
            correlation_threshold: 0.7,
            correlation_alpha: 0.05,
            alternative: Alternative::Greater,
            reduction: Reduction::Truncate,
        }
    }
}

impl Config {
    /// Set the significance level of the selected test.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the normality threshold.
    pub fn with_normality_alpha(mut self, alpha: f64) -> Self {
        self.normality_alpha = alpha;
        self
    }

    /// Set the correlation strength and p-value thresholds.
    pub fn with_correlation(mut self, threshold: f64, alpha: f64) -> Self {
        self.correlation_threshold = threshold;
        self.correlation_alpha = alpha;
        self
    }

    /// Set the alternative hypothesis.
    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Set the equal-length reduction.
    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Check every threshold is in range.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("normality_alpha", self.normality_alpha),
            ("correlation_alpha", self.correlation_alpha),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
        }
        if !(-1.0..=1.0).contains(&self.correlation_threshold) {
            return Err(Error::InvalidConfig(format!(
                "correlation_threshold must be in [-1, 1], got {}",
                self.correlation_threshold
            )));
        }
        Ok(())
    }
}

/// Decides whether one sample's mean is significantly greater than another's,
/// picking the test from the data.
///
/// # Description
///
/// [`HypothesisEvaluator::evaluate`] runs, in order:
///
/// 1. a Shapiro-Wilk normality check on the two samples pooled together,
/// 2. a Spearman correlation check between the two samples, reduced to a
///    common length by the configured [`Reduction`],
/// 3. the significance test picked by [`Strategy::select`]: the data counts as
///    normal when the normality p-value is at least `normality_alpha`, and as
///    correlated when rho exceeds `correlation_threshold` while the
///    correlation p-value exceeds `correlation_alpha`.
///
/// The null hypothesis is rejected when the selected test's p-value is below
/// `alpha`. The evaluator holds no state between calls.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::*;
///
/// let a = [12.1, 14.3, 13.8, 15.2, 14.9, 13.1, 16.0, 14.4, 15.5, 13.6];
/// let b = [10.2, 9.8, 11.5, 10.9, 9.5, 11.1, 10.4, 12.0, 9.9, 10.7];
///
/// let verdict = HypothesisEvaluator::default().evaluate(&a, &b).unwrap();
/// assert!(verdict.rejects_null());
/// assert_eq!(verdict.trail().len(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HypothesisEvaluator {
    config: Config,
}

impl HypothesisEvaluator {
    /// Create an evaluator after validating `config`.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Test whether `a` is greater than `b` (or whatever the configured
    /// alternative says).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if a sample is empty or holds a value that
    ///   is not a finite number.
    /// - [`Error::InsufficientData`] if a sample is too small for one of the
    ///   tests that has to run.
    /// - [`Error::UnequalLengths`] if a paired test is selected for samples of
    ///   different lengths, or the reduction is
    ///   [`Reduction::RequireEqual`].
    /// - [`Error::ConstantData`] if the selected significance test is
    ///   undefined because the data has no spread. A constant sample only
    ///   makes the correlation undefined (NaN), and the samples are then
    ///   treated as uncorrelated.
    pub fn evaluate<S: ToPrimitive>(&self, a: &[S], b: &[S]) -> Result<Verdict, Error> {
        let a = to_f64(a, "A")?;
        let b = to_f64(b, "B")?;
        let config = &self.config;

        let normality = shapiro_wilk(&[a.as_slice(), b.as_slice()].concat())?;
        let correlation = spearman_reduced(&a, &b, config.reduction)?;

        let normal = normality.p_value >= config.normality_alpha;
        let correlated = correlation.statistic > config.correlation_threshold
            && correlation.p_value > config.correlation_alpha;
        let strategy = Strategy::select(normal, correlated);
        tracing::debug!(
            w = normality.statistic,
            p_norm = normality.p_value,
            rho = correlation.statistic,
            p_corr = correlation.p_value,
            ?strategy,
            "selected significance test"
        );

        let significance = strategy.run(&a, &b, config.alternative)?;
        let rejects_null = significance.p_value < config.alpha;
        tracing::debug!(
            method = %significance.method,
            statistic = significance.statistic,
            p_value = significance.p_value,
            rejects_null,
            "significance test done"
        );

        Ok(Verdict::new(
            rejects_null,
            strategy,
            TestRecord::new(Method::ShapiroWilk, normality),
            TestRecord::new(Method::Spearman, correlation),
            significance,
        ))
    }
}

/// [`HypothesisEvaluator::evaluate`] with the default [`Config`]: is the mean
/// of `a` significantly greater than the mean of `b` at the 5% level?
pub fn evaluate<S: ToPrimitive>(a: &[S], b: &[S]) -> Result<Verdict, Error> {
    HypothesisEvaluator::default().evaluate(a, b)
}
