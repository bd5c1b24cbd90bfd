// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A stored frequency tag that is not `monthly`, `weekly` or `yearly`.
    #[error("unrecognized frequency '{0}' (expected monthly, weekly or yearly)")]
    UnknownFrequency(String),

    #[error("advancing recurring transaction #{id} past {date} overflows the calendar")]
    DateOverflow { id: i64, date: NaiveDate },

    #[error("unknown category type '{0}' (expected expense or income)")]
    UnknownCategoryKind(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The row changed or disappeared between selection and commit.
    #[error("recurring transaction #{0} changed while the batch was running")]
    StaleDefinition(i64),

    #[error("recurring batch commit failed: {0}")]
    Commit(#[source] Box<Error>),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
