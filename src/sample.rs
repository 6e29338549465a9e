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

use std::cmp::Ordering;

use num_traits::ToPrimitive;

use crate::Error;

/// Convert a caller sample to `f64`, rejecting empty samples and values that
/// are not finite numbers.
pub(crate) fn to_f64<S: ToPrimitive>(sample: &[S], label: &str) -> Result<Vec<f64>, Error> {
    if sample.is_empty() {
        return Err(Error::InvalidInput(format!("sample {label} is empty")));
    }

    sample
        .iter()
        .enumerate()
        .map(|(i, v)| match v.to_f64() {
            Some(x) if x.is_finite() => Ok(x),
            _ => Err(Error::InvalidInput(format!(
                "sample {label} has a non-numeric value at position {i}"
            ))),
        })
        .collect()
}

pub(crate) fn ensure_len(method: &'static str, s: &[f64], required: usize) -> Result<(), Error> {
    if s.len() < required {
        return Err(Error::InsufficientData {
            method,
            required,
            actual: s.len(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_paired(method: &'static str, a: &[f64], b: &[f64]) -> Result<(), Error> {
    if a.len() != b.len() {
        return Err(Error::UnequalLengths {
            method,
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

pub(crate) fn mean(s: &[f64]) -> f64 {
    s.iter().sum::<f64>() / s.len() as f64
}

/// Unbiased sample variance (n - 1 denominator).
pub(crate) fn variance(s: &[f64]) -> f64 {
    let m = mean(s);
    s.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (s.len() as f64 - 1.0)
}

pub(crate) fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Ranks of `s` (1-based), ties receiving the average of their positions.
///
/// Also returns the sizes of every tie group with more than one member.
pub(crate) fn average_ranks(s: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let n = s.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| cmp_f64(&s[i], &s[j]));

    let mut ranks = vec![0.0; n];
    let mut ties = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && s[order[j]] == s[order[i]] {
            j += 1;
        }
        // positions i..j share the average of ranks i+1..=j
        let rank = (i + 1 + j) as f64 / 2.0;
        for &k in &order[i..j] {
            ranks[k] = rank;
        }
        if j - i > 1 {
            ties.push(j - i);
        }
        i = j;
    }

    (ranks, ties)
}

/// Σ (t³ - t) over tie groups.
pub(crate) fn tie_term(ties: &[usize]) -> f64 {
    ties.iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_to_f64_rejects_empty_and_nan() {
        let empty: [f64; 0] = [];
        assert!(matches!(to_f64(&empty, "A"), Err(Error::InvalidInput(_))));
        assert!(matches!(
            to_f64(&[1.0, f64::NAN], "A"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            to_f64(&[1.0, f64::INFINITY], "B"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_to_f64_accepts_integers() {
        assert_eq!(to_f64(&[1u32, 2, 3], "A").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(to_f64(&[-4i64, 7], "B").unwrap(), vec![-4.0, 7.0]);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let (ranks, ties) = average_ranks(&[10.0, 20.0, 10.0, 30.0, 20.0, 20.0]);
        assert_eq!(ranks, vec![1.5, 4.0, 1.5, 6.0, 4.0, 4.0]);
        assert_eq!(ties, vec![2, 3]);
        assert_relative_eq!(tie_term(&ties), 6.0 + 24.0);
    }

    #[test]
    fn test_moments() {
        let s = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&s), 5.0);
        assert_relative_eq!(variance(&s), 32.0 / 7.0);
    }
}
