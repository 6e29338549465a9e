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

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::dist::{normal_quantile, normal_sf};
use crate::report::{DiagnosticResult, Method};
use crate::sample::{cmp_f64, ensure_len, mean};
use crate::Error;

pub(crate) const METHOD: &str = Method::ShapiroWilk.name();

/// Smallest sample the test is defined for.
pub const MIN_OBSERVATIONS: usize = 3;

// Royston's approximation is calibrated up to this size.
const CALIBRATED_MAX: usize = 5000;

// polynomial coefficients from Royston (1995), AS R94
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Shapiro-Wilk test of the null hypothesis that `data` comes from a normal
/// distribution.
///
/// # Description
///
/// Follows Royston's approximation (AS R94): the weights are derived from
/// Blom scores with polynomial corrections for the two most extreme order
/// statistics, and `1 - W` is mapped to a standard normal deviate. The p-value
/// is the upper tail of that deviate, so small values reject normality.
///
/// For `n = 3` the exact distribution of `W` is used.
///
/// # Errors
///
/// - [`Error::InsufficientData`] with fewer than [`MIN_OBSERVATIONS`] values.
/// - [`Error::ConstantData`] when every value is identical.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::normality::shapiro_wilk;
///
/// let r = shapiro_wilk(&[-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5]).unwrap();
/// assert!(r.statistic > 0.9);
/// assert!(r.p_value > 0.05);
/// ```
pub fn shapiro_wilk(data: &[f64]) -> Result<DiagnosticResult, Error> {
    ensure_len(METHOD, data, MIN_OBSERVATIONS)?;

    let n = data.len();
    if n > CALIBRATED_MAX {
        tracing::warn!(n, "Shapiro-Wilk p-value may be inaccurate beyond 5000 observations");
    }

    let mut x = data.to_vec();
    x.sort_by(cmp_f64);
    if x[n - 1] - x[0] <= 0.0 {
        return Err(Error::ConstantData { method: METHOD });
    }

    let weights = weights(n);
    let m = mean(&x);
    let ss: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    let sa: f64 = weights
        .iter()
        .enumerate()
        .map(|(i, a)| a * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (sa * sa / ss).min(1.0);

    Ok(DiagnosticResult {
        statistic: w,
        p_value: p_value(w, n).clamp(0.0, 1.0),
    })
}

// c[0] + c[1] x + c[2] x² + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

// Weights for the n/2 largest order statistics, most extreme first.
fn weights(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| -normal_quantile((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let mut a = vec![0.0; half];
    a[0] = poly(&C1, rsn) + m[0] / ssumm2;
    let corrected = if n > 5 {
        a[1] = poly(&C2, rsn) + m[1] / ssumm2;
        2
    } else {
        1
    };

    let head_m: f64 = m[..corrected].iter().map(|v| v * v).sum();
    let head_a: f64 = a[..corrected].iter().map(|v| v * v).sum();
    let fac = ((summ2 - 2.0 * head_m) / (1.0 - 2.0 * head_a)).sqrt();
    for i in corrected..half {
        a[i] = m[i] / fac;
    }

    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        // exact: W is supported on [3/4, 1]
        let asin_min = (0.75f64).sqrt().asin();
        return 6.0 / PI * (w.sqrt().asin() - asin_min);
    }

    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let mut y = w1.ln();
    let nf = n as f64;

    let (mu, sigma) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal_sf((y - mu) / sigma)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, Exp, StandardNormal};

    use super::*;

    #[test]
    fn test_too_few_observations() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(Error::InsufficientData {
                method: METHOD,
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_constant_data() {
        assert_eq!(
            shapiro_wilk(&[4.0; 10]),
            Err(Error::ConstantData { method: METHOD })
        );
    }

    #[test]
    fn test_three_observations_exact() {
        // equally spaced points reach the maximum W = 1
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(r.statistic, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-12);

        // two tied points and an outlier reach the minimum W = 3/4
        let r = shapiro_wilk(&[0.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(r.statistic, 0.75, epsilon = 1e-12);
        assert_relative_eq!(r.p_value, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_weights_are_normalised() {
        for n in [4, 5, 6, 11, 12, 50, 500] {
            let a = weights(n);
            let norm = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
            assert!(a.windows(2).all(|w| w[0] > w[1]), "n = {n}: {a:?}");
        }
    }

    #[test]
    fn test_normal_sample_is_not_rejected() {
        let rng = ChaCha8Rng::seed_from_u64(42);
        let data = StandardNormal
            .sample_iter(rng)
            .take(200)
            .collect::<Vec<f64>>();
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.statistic > 0.97);
        assert!(r.p_value > 0.01);
    }

    #[test]
    fn test_skewed_sample_is_rejected() {
        let rng = ChaCha8Rng::seed_from_u64(42);
        let data = Exp::new(1.0)
            .unwrap()
            .sample_iter(rng)
            .take(200)
            .collect::<Vec<f64>>();
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.p_value < 1e-4);
    }

    #[test]
    fn test_small_sample_with_outlier() {
        let r = shapiro_wilk(&[1.0, 1.1, 0.9, 1.05, 0.95, 1.0, 9.0]).unwrap();
        assert!(r.statistic < 0.6);
        assert!(r.p_value < 0.001);
    }
}
