// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // opaque, managed outside this crate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Expense => "expense",
            CategoryKind::Income => "income",
        }
    }

    /// Apply the sign convention: expenses are stored negative, income positive.
    pub fn signed(self, amount: Decimal) -> Decimal {
        let mut magnitude = amount.abs().round_dp(2);
        magnitude.rescale(2);
        match self {
            CategoryKind::Expense => -magnitude,
            CategoryKind::Income => magnitude,
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(CategoryKind::Expense),
            "income" => Ok(CategoryKind::Income),
            other => Err(Error::UnknownCategoryKind(other.to_string())),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: Decimal, // positive = income, negative = expense
    pub date: NaiveDateTime,
    pub category_id: i64,
    pub user_id: i64,
}

/// A transaction that has not been written to the store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDateTime,
    pub category_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub amount: Decimal,
    pub month: u32, // 1..=12
    pub year: i32,
    pub category_id: i64,
    pub user_id: i64,
}

/// Template that generates transactions on a schedule.
///
/// `frequency` is kept as the stored text so a corrupt tag only fails the
/// definition that carries it; see [`crate::recurring::Frequency`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub next_date: NaiveDate,
    pub category_id: i64,
    pub user_id: i64,
}
