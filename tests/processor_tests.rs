// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveTime};
use pocketledger::errors::{Error, Result};
use pocketledger::models::{NewTransaction, RecurringTransaction};
use pocketledger::recurring::{RecurrenceStore, StagedBatch, process_due};
use rust_decimal::Decimal;

/// Vec-backed store; `fail_commit` makes every commit fail before applying.
#[derive(Default)]
struct MemoryStore {
    definitions: Vec<RecurringTransaction>,
    transactions: Vec<NewTransaction>,
    fail_commit: bool,
    commits: usize,
}

impl RecurrenceStore for MemoryStore {
    fn due_definitions(&self, reference: NaiveDate) -> Result<Vec<RecurringTransaction>> {
        let mut due: Vec<RecurringTransaction> = self
            .definitions
            .iter()
            .filter(|d| d.next_date <= reference)
            .cloned()
            .collect();
        due.sort_by_key(|d| (d.next_date, d.id));
        Ok(due)
    }

    fn commit(&mut self, batch: &StagedBatch) -> Result<()> {
        self.commits += 1;
        if self.fail_commit {
            return Err(Error::Database(rusqlite::Error::InvalidQuery));
        }
        self.transactions.extend(batch.transactions.iter().cloned());
        for a in &batch.advances {
            let def = self
                .definitions
                .iter_mut()
                .find(|d| d.id == a.id)
                .ok_or(Error::StaleDefinition(a.id))?;
            def.next_date = a.next;
        }
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn definition(id: i64, frequency: &str, next_date: NaiveDate) -> RecurringTransaction {
    RecurringTransaction {
        id,
        description: format!("Definition {}", id),
        amount: Decimal::new(-4999, 2),
        frequency: frequency.to_string(),
        start_date: next_date,
        next_date,
        category_id: 10 + id,
        user_id: 100 + id,
    }
}

#[test]
fn due_definition_yields_one_transaction_with_copied_fields() {
    let mut store = MemoryStore {
        definitions: vec![definition(1, "monthly", date(2024, 1, 15))],
        ..Default::default()
    };

    let summary = process_due(&mut store, date(2024, 2, 20)).unwrap();

    assert_eq!(summary.processed_count(), 1);
    assert_eq!(
        store.transactions,
        vec![NewTransaction {
            description: "Definition 1".to_string(),
            amount: Decimal::new(-4999, 2),
            date: date(2024, 1, 15).and_time(NaiveTime::MIN),
            category_id: 11,
            user_id: 101,
        }]
    );
    assert_eq!(store.definitions[0].next_date, date(2024, 2, 15));
    assert_eq!(store.definitions[0].start_date, date(2024, 1, 15));
}

#[test]
fn twenty_one_days_overdue_weekly_produces_one_transaction() {
    let today = date(2024, 9, 30);
    let overdue = today - chrono::Days::new(21);
    let mut store = MemoryStore {
        definitions: vec![definition(1, "weekly", overdue)],
        ..Default::default()
    };

    process_due(&mut store, today).unwrap();

    assert_eq!(store.transactions.len(), 1);
    assert_eq!(store.transactions[0].date.date(), overdue);
    assert_eq!(store.definitions[0].next_date, overdue + chrono::Days::new(7));
    assert!(store.definitions[0].next_date < today);
}

#[test]
fn failed_commit_surfaces_as_commit_error() {
    let mut store = MemoryStore {
        definitions: vec![definition(1, "monthly", date(2024, 1, 1))],
        fail_commit: true,
        ..Default::default()
    };

    let err = process_due(&mut store, date(2024, 1, 1)).unwrap_err();

    assert!(matches!(err, Error::Commit(_)));
    assert!(store.transactions.is_empty());
    assert_eq!(store.definitions[0].next_date, date(2024, 1, 1));
}

#[test]
fn nothing_due_skips_the_commit() {
    let mut store = MemoryStore {
        definitions: vec![definition(1, "yearly", date(2025, 1, 1))],
        fail_commit: true,
        ..Default::default()
    };

    let summary = process_due(&mut store, date(2024, 12, 31)).unwrap();

    assert_eq!(summary.due_count(), 0);
    assert_eq!(store.commits, 0);
}

#[test]
fn only_bad_definitions_due_commits_nothing() {
    let mut store = MemoryStore {
        definitions: vec![definition(1, "fortnightly", date(2024, 1, 1))],
        fail_commit: true,
        ..Default::default()
    };

    let summary = process_due(&mut store, date(2024, 1, 1)).unwrap();

    assert_eq!(summary.processed_count(), 0);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(store.commits, 0);
}

#[test]
fn calendar_overflow_is_reported_per_definition() {
    let mut store = MemoryStore {
        definitions: vec![
            definition(1, "weekly", NaiveDate::MAX),
            definition(2, "weekly", date(2024, 1, 1)),
        ],
        ..Default::default()
    };

    let summary = process_due(&mut store, NaiveDate::MAX).unwrap();

    assert_eq!(summary.processed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].id, 1);
    assert_eq!(store.definitions[0].next_date, NaiveDate::MAX);
}
