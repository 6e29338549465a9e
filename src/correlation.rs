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

use std::borrow::Cow;

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::ContinuousCDF;

use crate::dist::students_t;
use crate::report::{DiagnosticResult, Method};
use crate::sample::{average_ranks, ensure_len, ensure_paired, mean};
use crate::Error;

pub(crate) const METHOD: &str = Method::Spearman.name();

/// Smallest number of pairs the test is defined for.
pub const MIN_PAIRS: usize = 3;

/// How two samples of different lengths are brought to a common length before
/// their rank correlation is measured.
///
/// Every variant is deterministic: the same inputs always produce the same
/// pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reduction {
    /// Keep the first `min(len)` observations of each sample.
    #[default]
    Truncate,
    /// Draw `min(len)` observations from the longer sample without
    /// replacement, keeping their original order. The draw is driven by a
    /// ChaCha8 generator seeded with `seed`.
    Subsample {
        /// Seed of the generator.
        seed: u64,
    },
    /// Refuse samples of different lengths.
    RequireEqual,
}

impl Reduction {
    /// Bring `a` and `b` to the same length. Samples that already match are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::UnequalLengths`] for [`Reduction::RequireEqual`] when the
    /// lengths differ.
    pub fn reduce<'a>(
        &self,
        a: &'a [f64],
        b: &'a [f64],
    ) -> Result<(Cow<'a, [f64]>, Cow<'a, [f64]>), Error> {
        if a.len() == b.len() {
            return Ok((Cow::Borrowed(a), Cow::Borrowed(b)));
        }
        let len = a.len().min(b.len());

        match self {
            Reduction::Truncate => Ok((Cow::Borrowed(&a[..len]), Cow::Borrowed(&b[..len]))),
            Reduction::Subsample { seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                let mut subsample = |longer: &[f64]| {
                    let mut picked = index::sample(&mut rng, longer.len(), len).into_vec();
                    picked.sort_unstable();
                    picked.into_iter().map(|i| longer[i]).collect::<Vec<f64>>()
                };
                if a.len() > len {
                    Ok((Cow::Owned(subsample(a)), Cow::Borrowed(b)))
                } else {
                    Ok((Cow::Borrowed(a), Cow::Owned(subsample(b))))
                }
            }
            Reduction::RequireEqual => Err(Error::UnequalLengths {
                method: METHOD,
                left: a.len(),
                right: b.len(),
            }),
        }
    }
}

/// Spearman rank correlation between `a` and `b`, with the two-sided p-value
/// of the null hypothesis that they are uncorrelated.
///
/// Ties receive average ranks; rho is the Pearson correlation of the ranks.
/// The p-value uses `t = rho * sqrt((n - 2) / (1 - rho²))` under a Student's t
/// distribution with `n - 2` degrees of freedom. A perfect monotonic relation
/// (|rho| = 1) has a p-value of 0.
///
/// When either sample has all equal values the correlation is undefined and
/// both rho and the p-value are NaN. NaN never exceeds a threshold, so such
/// samples never count as correlated.
///
/// # Errors
///
/// - [`Error::UnequalLengths`] if `a` and `b` differ in length; see
///   [`Reduction`] and [`spearman_reduced`].
/// - [`Error::InsufficientData`] with fewer than [`MIN_PAIRS`] pairs.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::correlation::spearman;
///
/// let r = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.5]).unwrap();
/// assert!((r.statistic - 0.9).abs() < 1e-12);
/// ```
pub fn spearman(a: &[f64], b: &[f64]) -> Result<DiagnosticResult, Error> {
    ensure_paired(METHOD, a, b)?;
    ensure_len(METHOD, a, MIN_PAIRS)?;

    let (ra, _) = average_ranks(a);
    let (rb, _) = average_ranks(b);
    let Some(rho) = pearson(&ra, &rb) else {
        tracing::debug!(n = a.len(), "rank correlation undefined for constant sample");
        return Ok(DiagnosticResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        });
    };

    let n = a.len() as f64;
    let p_value = if rho.abs() >= 1.0 {
        0.0
    } else {
        let t = rho * ((n - 2.0) / ((1.0 + rho) * (1.0 - rho))).sqrt();
        2.0 * students_t(n - 2.0)?.sf(t.abs())
    };

    Ok(DiagnosticResult {
        statistic: rho,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// [`spearman`] after reducing `a` and `b` to a common length with
/// `reduction`.
pub fn spearman_reduced(
    a: &[f64],
    b: &[f64],
    reduction: Reduction,
) -> Result<DiagnosticResult, Error> {
    let (a, b) = reduction.reduce(a, b)?;
    spearman(&a, &b)
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let mx = mean(x);
    let my = mean(y);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let (dx, dy) = (xi - mx, yi - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_perfect_monotonic() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [1.0, 4.0, 9.0, 16.0, 25.0];
        let r = spearman(&a, &b).unwrap();
        assert_relative_eq!(r.statistic, 1.0);
        assert_eq!(r.p_value, 0.0);

        let reversed = [5.0, 4.0, 3.0, 2.0, 1.0];
        let r = spearman(&a, &reversed).unwrap();
        assert_relative_eq!(r.statistic, -1.0);
        assert_eq!(r.p_value, 0.0);
    }

    #[test]
    fn test_strong_but_insignificant() {
        // one swapped pair out of four: rho = 0.8, too few pairs to be significant
        let r = spearman(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(r.statistic, 0.8, epsilon = 1e-12);
        assert_relative_eq!(r.p_value, 0.2, epsilon = 1e-7);
    }

    #[test]
    fn test_ties_use_average_ranks() {
        let r = spearman(&[1.0, 2.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        // ranks [1, 2.5, 2.5, 4] against [1, 2, 3, 4]
        assert_relative_eq!(r.statistic, 4.5 / (4.5f64 * 5.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            spearman(&[1.0, 2.0], &[2.0, 1.0]),
            Err(Error::InsufficientData {
                method: METHOD,
                required: 3,
                actual: 2
            })
        );
        assert_eq!(
            spearman(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(Error::UnequalLengths {
                method: METHOD,
                left: 3,
                right: 2
            })
        );
    }

    #[test]
    fn test_constant_sample_is_undefined() {
        let r = spearman(&[1.0, 2.0, 3.0], &[7.0, 7.0, 7.0]).unwrap();
        assert!(r.statistic.is_nan());
        assert!(r.p_value.is_nan());

        // only the truncated prefix of `b` is constant
        let r = spearman_reduced(
            &[1.0, 2.0, 3.0],
            &[7.0, 7.0, 7.0, 8.0],
            Reduction::Truncate,
        )
        .unwrap();
        assert!(r.statistic.is_nan());
    }

    #[test]
    fn test_truncate_keeps_prefix() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [9.0, 8.0, 7.0];
        let (ra, rb) = Reduction::Truncate.reduce(&a, &b).unwrap();
        assert_eq!(&*ra, &[1.0, 2.0, 3.0]);
        assert_eq!(&*rb, &b);
    }

    #[test]
    fn test_subsample_is_reproducible_and_ordered() {
        let a: Vec<f64> = (0..100).map(f64::from).collect();
        let b = [3.0, 1.0, 2.0, 5.0, 4.0];

        let (first, kept) = Reduction::Subsample { seed: 7 }.reduce(&a, &b).unwrap();
        let (second, _) = Reduction::Subsample { seed: 7 }.reduce(&a, &b).unwrap();
        assert_eq!(first, second);
        assert_eq!(&*kept, &b);
        assert_eq!(first.len(), 5);
        assert!(first.windows(2).all(|w| w[0] < w[1]));

        // the shorter sample may be either side
        let (kept, reduced) = Reduction::Subsample { seed: 7 }.reduce(&b, &a).unwrap();
        assert_eq!(&*kept, &b);
        assert_eq!(reduced, first);
    }

    #[test]
    fn test_require_equal() {
        assert!(matches!(
            Reduction::RequireEqual.reduce(&[1.0, 2.0], &[1.0]),
            Err(Error::UnequalLengths { .. })
        ));
        let (a, b) = Reduction::RequireEqual
            .reduce(&[1.0, 2.0], &[3.0, 4.0])
            .unwrap();
        assert_eq!((&*a, &*b), (&[1.0, 2.0][..], &[3.0, 4.0][..]));
    }

    #[test]
    fn test_spearman_reduced() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0, -100.0];
        let b = [10.0, 20.0, 30.0, 40.0, 50.0];
        let r = spearman_reduced(&a, &b, Reduction::Truncate).unwrap();
        assert_relative_eq!(r.statistic, 1.0);
    }
}
