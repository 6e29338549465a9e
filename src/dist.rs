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

//! Thin wrappers over the `statrs` distributions used by the tests.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::Error;

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).unwrap()
}

pub(crate) fn normal_cdf(z: f64) -> f64 {
    standard_normal().cdf(z)
}

/// Upper tail Pr(Z >= z).
pub(crate) fn normal_sf(z: f64) -> f64 {
    standard_normal().sf(z)
}

pub(crate) fn normal_quantile(p: f64) -> f64 {
    standard_normal().inverse_cdf(p)
}

/// Student's t distribution with `df` degrees of freedom.
pub(crate) fn students_t(df: f64) -> Result<StudentsT, Error> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| Error::InvalidInput(format!("t distribution with {df} degrees of freedom: {e}")))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_normal_tails() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normal_sf(1.959963984540054), 0.025, epsilon = 1e-9);
        assert_relative_eq!(normal_quantile(0.975), 1.959963984540054, epsilon = 1e-7);
    }

    #[test]
    fn test_students_t() {
        let t = students_t(10.0).unwrap();
        // critical value of the one-sided 5% test with 10 degrees of freedom
        assert_relative_eq!(t.sf(1.812461122811676), 0.05, epsilon = 1e-7);
        assert!(students_t(0.0).is_err());
    }
}
