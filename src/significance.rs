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

use statrs::distribution::ContinuousCDF;

use crate::dist::{normal_cdf, normal_sf, students_t};
use crate::report::{DiagnosticResult, Method, TestRecord};
use crate::sample::{average_ranks, ensure_len, ensure_paired, mean, tie_term, variance};
use crate::Error;

// Mann-Whitney U uses the exact null distribution when the smaller sample has
// at most this many observations and there are no ties.
const MWU_EXACT_MAX: usize = 8;

// Wilcoxon signed-rank uses the exact null distribution up to this many
// non-zero differences, as long as there are no zeros or ties.
const WILCOXON_EXACT_MAX: usize = 50;

/// Direction of the alternative hypothesis, comparing sample `a` to sample
/// `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alternative {
    /// H1: `a` is greater than `b`
    /// Pr(T >= t | H0)
    #[default]
    Greater,
    /// H1: `a` is less than `b`
    /// Pr(T <= t | H0)
    Less,
    /// H1: `a` and `b` differ
    /// 2 * min (Pr(T >= t | H0), Pr(T <= t | H0))
    TwoSided,
}

impl Alternative {
    // p-value from Pr(T <= t | H0) and Pr(T >= t | H0)
    fn tails(self, lower: f64, upper: f64) -> f64 {
        let p = match self {
            Alternative::Greater => upper,
            Alternative::Less => lower,
            Alternative::TwoSided => 2.0 * lower.min(upper),
        };
        p.clamp(0.0, 1.0)
    }
}

/// The four significance tests the evaluator chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Wilcoxon signed-rank test
    PairedNonParametric,
    /// Mann-Whitney U test
    UnpairedNonParametric,
    /// Student's paired t-test
    PairedParametric,
    /// Student's two-sample t-test
    UnpairedParametric,
}

// indexed by [normal][correlated]
const SELECTION: [[Strategy; 2]; 2] = [
    [
        Strategy::UnpairedNonParametric,
        Strategy::PairedNonParametric,
    ],
    [Strategy::UnpairedParametric, Strategy::PairedParametric],
];

impl Strategy {
    /// Pick the test for data that is (or is not) normal and whose samples are
    /// (or are not) strongly correlated.
    ///
    /// ```rust
    /// use adaptive_ht::prelude::significance::Strategy;
    ///
    /// assert_eq!(Strategy::select(true, true), Strategy::PairedParametric);
    /// assert_eq!(Strategy::select(false, false), Strategy::UnpairedNonParametric);
    /// ```
    pub fn select(normal: bool, correlated: bool) -> Self {
        SELECTION[usize::from(normal)][usize::from(correlated)]
    }

    /// The test this strategy runs.
    pub fn method(self) -> Method {
        match self {
            Strategy::PairedNonParametric => Method::WilcoxonSignedRank,
            Strategy::UnpairedNonParametric => Method::MannWhitneyU,
            Strategy::PairedParametric => Method::PairedT,
            Strategy::UnpairedParametric => Method::StudentT,
        }
    }

    /// Whether the test needs one-to-one paired observations.
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            Strategy::PairedNonParametric | Strategy::PairedParametric
        )
    }

    /// Whether the test assumes normally distributed data.
    pub fn is_parametric(self) -> bool {
        matches!(
            self,
            Strategy::PairedParametric | Strategy::UnpairedParametric
        )
    }

    /// Run the test of `a` against `b` under `alternative`.
    pub fn run(self, a: &[f64], b: &[f64], alternative: Alternative) -> Result<TestRecord, Error> {
        let result = match self {
            Strategy::PairedNonParametric => wilcoxon_signed_rank(a, b, alternative),
            Strategy::UnpairedNonParametric => mann_whitney_u(a, b, alternative),
            Strategy::PairedParametric => paired_t(a, b, alternative),
            Strategy::UnpairedParametric => student_t(a, b, alternative),
        }?;
        Ok(TestRecord::new(self.method(), result))
    }
}

/// Mann-Whitney U test of `a` against `b`.
///
/// # Description
///
/// The statistic is the U of sample `a`: the number of pairs `(x, y)` with
/// `x` from `a` and `y` from `b` such that `x > y`, ties counting one half.
///
/// When there are no ties and one of the samples has at most 8 observations,
/// the p-value comes from the exact null distribution of U. Otherwise it uses
/// the normal approximation with tie and continuity corrections.
///
/// `a` and `b` need not be of the same size.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::significance::{mann_whitney_u, Alternative};
///
/// let r = mann_whitney_u(&[6.0, 7.0, 8.0, 9.0], &[1.0, 2.0, 3.0, 4.0], Alternative::Greater)
///     .unwrap();
/// assert_eq!(r.statistic, 16.0);
/// // only one of the 70 orderings is this extreme
/// assert!((r.p_value - 1.0 / 70.0).abs() < 1e-12);
/// ```
pub fn mann_whitney_u(
    a: &[f64],
    b: &[f64],
    alternative: Alternative,
) -> Result<DiagnosticResult, Error> {
    let method = Method::MannWhitneyU.name();
    ensure_len(method, a, 1)?;
    ensure_len(method, b, 1)?;

    let n1 = a.len();
    let n2 = b.len();
    let pooled = [a, b].concat();
    let (ranks, ties) = average_ranks(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;

    let (u, factor) = match alternative {
        Alternative::Greater => (u1, 1.0),
        Alternative::Less => (u2, 1.0),
        Alternative::TwoSided => (u1.max(u2), 2.0),
    };

    let upper = if ties.is_empty() && n1.min(n2) <= MWU_EXACT_MAX {
        // U is integral without ties
        mwu_exact_sf(u.round() as usize, n1, n2)
    } else {
        let n = n1f + n2f;
        let sigma_sq = n1f * n2f / 12.0 * ((n + 1.0) - tie_term(&ties) / (n * (n - 1.0)));
        if sigma_sq <= 0.0 {
            return Err(Error::ConstantData { method });
        }
        normal_sf((u - n1f * n2f / 2.0 - 0.5) / sigma_sq.sqrt())
    };

    Ok(DiagnosticResult {
        statistic: u1,
        p_value: (factor * upper).clamp(0.0, 1.0),
    })
}

// Pr(U >= u) under H0 for samples of sizes n1 and n2 without ties.
//
// The counts of U are the coefficients of the Gaussian binomial
// [n1 + n2 choose m] = Π_{i=1..m} (1 - q^(k+i)) / (1 - q^i), m = min, k = max.
fn mwu_exact_sf(u: usize, n1: usize, n2: usize) -> f64 {
    let (m, k) = (n1.min(n2), n1.max(n2));
    let max = m * k;
    if u > max {
        return 0.0;
    }

    let mut counts = vec![0.0f64; max + 1];
    counts[0] = 1.0;
    for i in 1..=m {
        // coefficients above `max` are dropped; the division below only reads
        // lower ones.
        let shift = k + i;
        for j in (shift..=max).rev() {
            counts[j] -= counts[j - shift];
        }
        for j in i..=max {
            counts[j] += counts[j - i];
        }
    }

    let total: f64 = counts.iter().sum();
    counts[u..].iter().sum::<f64>() / total
}

/// Wilcoxon signed-rank test of the paired differences `a - b`.
///
/// # Description
///
/// Zero differences are discarded. The statistic is the sum of the ranks of
/// the positive differences (T+), absolute differences being ranked with
/// average ranks for ties.
///
/// With no zeros, no ties and at most 50 differences the p-value comes from
/// the exact null distribution of T+. Otherwise it uses the normal
/// approximation with tie correction.
///
/// # Errors
///
/// - [`Error::UnequalLengths`] if `a` and `b` differ in length.
/// - [`Error::InsufficientData`] if every difference is zero.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::significance::{wilcoxon_signed_rank, Alternative};
///
/// let after = [6.0, 7.5, 8.25, 9.75, 11.5];
/// let before = [5.0, 6.0, 7.0, 8.0, 9.0];
/// let r = wilcoxon_signed_rank(&after, &before, Alternative::Greater).unwrap();
/// assert_eq!(r.statistic, 15.0);
/// // all 5 differences positive: 1 of 32 sign patterns
/// assert!((r.p_value - 1.0 / 32.0).abs() < 1e-12);
/// ```
pub fn wilcoxon_signed_rank(
    a: &[f64],
    b: &[f64],
    alternative: Alternative,
) -> Result<DiagnosticResult, Error> {
    let method = Method::WilcoxonSignedRank.name();
    ensure_paired(method, a, b)?;

    let diffs: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .filter(|d| *d != 0.0)
        .collect();
    let has_zeros = diffs.len() < a.len();
    ensure_len(method, &diffs, 1)?;

    let abs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let (ranks, ties) = average_ranks(&abs);
    let t_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();

    let n = diffs.len();
    let p_value = if !has_zeros && ties.is_empty() && n <= WILCOXON_EXACT_MAX {
        let t = t_plus.round() as usize;
        let dist = signed_rank_distribution(n);
        let total: f64 = dist.iter().sum();
        let upper = dist[t..].iter().sum::<f64>() / total;
        let lower = dist[..=t].iter().sum::<f64>() / total;
        alternative.tails(lower, upper)
    } else {
        let nf = n as f64;
        let mu = nf * (nf + 1.0) / 4.0;
        let sigma_sq = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_term(&ties) / 48.0;
        if sigma_sq <= 0.0 {
            return Err(Error::ConstantData { method });
        }
        let z = (t_plus - mu) / sigma_sq.sqrt();
        alternative.tails(normal_cdf(z), normal_sf(z))
    };

    Ok(DiagnosticResult {
        statistic: t_plus,
        p_value,
    })
}

// Number of subsets of {1..=n} with each possible sum, 0..=n(n+1)/2.
fn signed_rank_distribution(n: usize) -> Vec<f64> {
    let max = n * (n + 1) / 2;
    let mut counts = vec![0.0f64; max + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for s in (k..=max).rev() {
            counts[s] += counts[s - k];
        }
    }
    counts
}

/// Student's paired t-test on the differences `a - b`, with `n - 1` degrees of
/// freedom.
///
/// # Errors
///
/// - [`Error::UnequalLengths`] if `a` and `b` differ in length.
/// - [`Error::InsufficientData`] with fewer than 2 pairs.
/// - [`Error::ConstantData`] if every difference is the same.
pub fn paired_t(a: &[f64], b: &[f64], alternative: Alternative) -> Result<DiagnosticResult, Error> {
    let method = Method::PairedT.name();
    ensure_paired(method, a, b)?;
    ensure_len(method, a, 2)?;

    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let var = variance(&diffs);
    if var <= 0.0 {
        return Err(Error::ConstantData { method });
    }

    let n = diffs.len() as f64;
    let t = mean(&diffs) / (var / n).sqrt();
    t_result(t, n - 1.0, alternative)
}

/// Student's two-sample t-test with pooled variance, with `n_a + n_b - 2`
/// degrees of freedom.
///
/// # Errors
///
/// - [`Error::InsufficientData`] if either sample has fewer than 2 values.
/// - [`Error::ConstantData`] if the pooled variance is zero.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::significance::{student_t, Alternative};
///
/// let r = student_t(&[7.1, 6.9, 7.2, 7.0, 6.8], &[5.1, 4.9, 5.2, 5.0, 4.8], Alternative::Greater)
///     .unwrap();
/// assert!(r.statistic > 0.0);
/// assert!(r.p_value < 0.001);
/// ```
pub fn student_t(a: &[f64], b: &[f64], alternative: Alternative) -> Result<DiagnosticResult, Error> {
    let method = Method::StudentT.name();
    ensure_len(method, a, 2)?;
    ensure_len(method, b, 2)?;

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * variance(a) + (n2 - 1.0) * variance(b)) / df;
    if pooled <= 0.0 {
        return Err(Error::ConstantData { method });
    }

    let t = (mean(a) - mean(b)) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    t_result(t, df, alternative)
}

fn t_result(t: f64, df: f64, alternative: Alternative) -> Result<DiagnosticResult, Error> {
    let dist = students_t(df)?;
    Ok(DiagnosticResult {
        statistic: t,
        p_value: alternative.tails(dist.cdf(t), dist.sf(t)),
    })
}
