// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Materialization of recurring transactions.
//!
//! A run selects every definition whose `next_date` is on or before the
//! reference date, creates one transaction per definition dated at that
//! `next_date`, moves `next_date` forward by a single period and commits the
//! whole batch at once. A definition that is several periods behind only
//! catches up one period per run.

use chrono::{Days, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::models::{NewTransaction, RecurringTransaction};

/// How often a recurring transaction happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    /// A calendar month of variable length.
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// The date one period after `date`, or `None` past the end of the calendar.
    ///
    /// Months and years are calendar steps: when the target month is too short
    /// the day is clamped to its last day (Jan 31 -> Feb 29 in 2024, Feb 29 ->
    /// Feb 28 a year later). Each step starts from the date it is given, so a
    /// clamped day carries forward: Jan 31 -> Feb 29 -> Mar 29.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Yearly => date.checked_add_months(Months::new(12)),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(Error::UnknownFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replacement of one definition's `next_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAdvance {
    pub id: i64,
    /// The `next_date` the definition had when it was selected.
    pub previous: NaiveDate,
    pub next: NaiveDate,
}

/// Everything a run writes, committed as one unit.
#[derive(Debug, Default, Clone)]
pub struct StagedBatch {
    pub transactions: Vec<NewTransaction>,
    pub advances: Vec<ScheduleAdvance>,
}

impl StagedBatch {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.advances.is_empty()
    }
}

/// Persistence the processor depends on.
pub trait RecurrenceStore {
    /// Every definition with `next_date <= reference`, ordered by
    /// `next_date` then `id`.
    fn due_definitions(&self, reference: NaiveDate) -> Result<Vec<RecurringTransaction>>;

    /// Persist all of `batch` or none of it.
    fn commit(&mut self, batch: &StagedBatch) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedDefinition {
    pub id: i64,
    pub description: String,
    /// Date of the transaction that was created.
    pub occurrence: NaiveDate,
    pub next_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDefinition {
    pub id: i64,
    pub description: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSummary {
    pub reference_date: NaiveDate,
    pub processed: Vec<ProcessedDefinition>,
    pub failed: Vec<FailedDefinition>,
}

impl ProcessingSummary {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of definitions that were due, including the ones that failed.
    pub fn due_count(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Build the transaction for the current occurrence of `definition` and the
/// schedule advance that follows it.
pub fn materialize(
    definition: &RecurringTransaction,
) -> Result<(NewTransaction, ScheduleAdvance)> {
    let frequency: Frequency = definition.frequency.parse()?;
    let next = frequency
        .advance(definition.next_date)
        .ok_or(Error::DateOverflow {
            id: definition.id,
            date: definition.next_date,
        })?;

    let transaction = NewTransaction {
        description: definition.description.clone(),
        amount: definition.amount,
        date: definition.next_date.and_time(NaiveTime::MIN),
        category_id: definition.category_id,
        user_id: definition.user_id,
    };
    let advance = ScheduleAdvance {
        id: definition.id,
        previous: definition.next_date,
        next,
    };
    Ok((transaction, advance))
}

/// Materialize every definition due on or before `reference_date`.
///
/// Definitions that cannot be advanced are reported in
/// [`ProcessingSummary::failed`] and left untouched; the rest are committed
/// together. A commit failure discards the whole batch.
pub fn process_due<S>(store: &mut S, reference_date: NaiveDate) -> Result<ProcessingSummary>
where
    S: RecurrenceStore + ?Sized,
{
    let due = store.due_definitions(reference_date)?;
    info!(count = due.len(), %reference_date, "selected due recurring transactions");

    let mut batch = StagedBatch::default();
    let mut processed = Vec::with_capacity(due.len());
    let mut failed = Vec::new();

    for definition in &due {
        match materialize(definition) {
            Ok((transaction, advance)) => {
                debug!(
                    id = definition.id,
                    occurrence = %advance.previous,
                    next_date = %advance.next,
                    "staged recurring transaction"
                );
                processed.push(ProcessedDefinition {
                    id: definition.id,
                    description: definition.description.clone(),
                    occurrence: advance.previous,
                    next_date: advance.next,
                });
                batch.transactions.push(transaction);
                batch.advances.push(advance);
            }
            Err(err) => {
                warn!(id = definition.id, error = %err, "skipping recurring transaction");
                failed.push(FailedDefinition {
                    id: definition.id,
                    description: definition.description.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if !batch.is_empty() {
        store
            .commit(&batch)
            .map_err(|err| Error::Commit(Box::new(err)))?;
        info!(
            transactions = batch.transactions.len(),
            "committed recurring batch"
        );
    }

    Ok(ProcessingSummary {
        reference_date,
        processed,
        failed,
    })
}
