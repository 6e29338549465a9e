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

//! Splitting sick-leave records into the groups that get compared.
//!
//! A loader hands over [`Record`]s; [`split`] keeps the records above a
//! sick-day threshold and partitions them by sex and by age. The resulting
//! [`Cohorts`] are plain values and can be evaluated any number of times.

use std::fmt;
use std::str::FromStr;

use crate::evaluator::HypothesisEvaluator;
use crate::report::Verdict;
use crate::Error;

/// Sex of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sex {
    /// Male ("M" or "М")
    #[cfg_attr(feature = "serde", serde(alias = "M", alias = "М"))]
    Male,
    /// Female ("F" or "Ж")
    #[cfg_attr(feature = "serde", serde(alias = "F", alias = "Ж"))]
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"') {
            "M" | "М" => Ok(Sex::Male),
            "F" | "Ж" => Ok(Sex::Female),
            other => Err(Error::InvalidInput(format!("unknown sex {other:?}"))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("M"),
            Sex::Female => f.write_str("F"),
        }
    }
}

/// One employee's yearly record.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Working days missed due to sickness.
    pub sick_days: f64,
    /// Age in years.
    pub age: u32,
    /// Sex.
    pub sex: Sex,
}

/// Sick-day samples of the four compared groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohorts {
    /// Men.
    pub male: Vec<f64>,
    /// Women.
    pub female: Vec<f64>,
    /// Employees older than the age threshold.
    pub older: Vec<f64>,
    /// Employees at or below the age threshold.
    pub younger: Vec<f64>,
}

/// Verdicts of the two comparisons run on [`Cohorts`].
#[derive(Debug, Clone, PartialEq)]
pub struct CohortReport {
    /// Men miss more days than women.
    pub by_sex: Verdict,
    /// Older employees miss more days than younger ones.
    pub by_age: Verdict,
}

/// Keep the records with more than `work_days` sick days and split them by
/// sex and by `age` (older means strictly above `age`).
///
/// # Errors
///
/// [`Error::InvalidInput`] if any of the four groups ends up empty, or a
/// record has a non-finite number of sick days.
///
/// # Example
///
/// ```rust
/// use adaptive_ht::prelude::cohort::{split, Record, Sex};
///
/// let records = [
///     Record { sick_days: 5.0, age: 40, sex: Sex::Male },
///     Record { sick_days: 1.0, age: 50, sex: Sex::Male },
///     Record { sick_days: 3.0, age: 28, sex: Sex::Female },
/// ];
/// let cohorts = split(&records, 35, 2.0).unwrap();
/// assert_eq!(cohorts.male, vec![5.0]);
/// assert_eq!(cohorts.younger, vec![3.0]);
/// ```
pub fn split(records: &[Record], age: u32, work_days: f64) -> Result<Cohorts, Error> {
    let mut cohorts = Cohorts {
        male: Vec::new(),
        female: Vec::new(),
        older: Vec::new(),
        younger: Vec::new(),
    };

    for (i, r) in records.iter().enumerate() {
        if !r.sick_days.is_finite() {
            return Err(Error::InvalidInput(format!(
                "record {i} has a non-numeric number of sick days"
            )));
        }
        if r.sick_days <= work_days {
            continue;
        }
        match r.sex {
            Sex::Male => cohorts.male.push(r.sick_days),
            Sex::Female => cohorts.female.push(r.sick_days),
        }
        if r.age > age {
            cohorts.older.push(r.sick_days);
        } else {
            cohorts.younger.push(r.sick_days);
        }
    }

    tracing::trace!(
        male = cohorts.male.len(),
        female = cohorts.female.len(),
        older = cohorts.older.len(),
        younger = cohorts.younger.len(),
        "split records"
    );

    for (group, sample) in [
        ("male", &cohorts.male),
        ("female", &cohorts.female),
        ("older", &cohorts.older),
        ("younger", &cohorts.younger),
    ] {
        if sample.is_empty() {
            return Err(Error::InvalidInput(format!(
                "no {group} records with more than {work_days} sick days (age threshold {age})"
            )));
        }
    }

    Ok(cohorts)
}

impl Cohorts {
    /// Test that men miss more days than women, and that older employees miss
    /// more days than younger ones.
    pub fn evaluate(&self, evaluator: &HypothesisEvaluator) -> Result<CohortReport, Error> {
        Ok(CohortReport {
            by_sex: evaluator.evaluate(&self.male, &self.female)?,
            by_age: evaluator.evaluate(&self.older, &self.younger)?,
        })
    }
}
