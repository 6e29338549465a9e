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

use std::fmt;

use crate::significance::Strategy;

/// Statistic and p-value of a single test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticResult {
    /// Test statistic (W, rho, U, T+ or t depending on the test).
    pub statistic: f64,
    /// p-value.
    pub p_value: f64,
}

/// Every test the evaluator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Shapiro-Wilk normality test
    ShapiroWilk,
    /// Spearman rank correlation
    Spearman,
    /// Mann-Whitney U test
    MannWhitneyU,
    /// Wilcoxon signed-rank test
    WilcoxonSignedRank,
    /// Student's paired t-test
    PairedT,
    /// Student's two-sample t-test
    StudentT,
}

impl Method {
    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Method::ShapiroWilk => "Shapiro-Wilk",
            Method::Spearman => "Spearman",
            Method::MannWhitneyU => "Mann-Whitney U",
            Method::WilcoxonSignedRank => "Wilcoxon signed-rank",
            Method::PairedT => "Student's paired t",
            Method::StudentT => "Student's t",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the audit trail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestRecord {
    /// The test that produced the row.
    pub method: Method,
    /// Its statistic.
    pub statistic: f64,
    /// Its p-value.
    pub p_value: f64,
}

impl TestRecord {
    pub(crate) fn new(method: Method, result: DiagnosticResult) -> Self {
        Self {
            method,
            statistic: result.statistic,
            p_value: result.p_value,
        }
    }

    /// Display name of the method.
    pub fn name(&self) -> &'static str {
        self.method.name()
    }
}

impl fmt::Display for TestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: statistic = {:.6}, p-value = {:.6}",
            self.method, self.statistic, self.p_value
        )
    }
}

/// Outcome of [`crate::evaluator::HypothesisEvaluator::evaluate`].
///
/// The trail always holds three records: the normality check, the
/// correlation check and the significance test, in that order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Verdict {
    rejects_null: bool,
    strategy: Strategy,
    trail: [TestRecord; 3],
}

impl Verdict {
    pub(crate) fn new(
        rejects_null: bool,
        strategy: Strategy,
        normality: TestRecord,
        correlation: TestRecord,
        significance: TestRecord,
    ) -> Self {
        Self {
            rejects_null,
            strategy,
            trail: [normality, correlation, significance],
        }
    }

    /// Whether the null hypothesis was rejected in favour of the alternative.
    pub fn rejects_null(&self) -> bool {
        self.rejects_null
    }

    /// The significance test that was selected.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Every test that was run, in execution order.
    pub fn trail(&self) -> &[TestRecord] {
        &self.trail
    }

    /// The normality check.
    pub fn normality(&self) -> &TestRecord {
        &self.trail[0]
    }

    /// The correlation check.
    pub fn correlation(&self) -> &TestRecord {
        &self.trail[1]
    }

    /// The significance test.
    pub fn significance(&self) -> &TestRecord {
        &self.trail[2]
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rejects null hypothesis: {}", self.rejects_null)?;
        for record in &self.trail {
            writeln!(f, "  {record}")?;
        }
        Ok(())
    }
}
