// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error kinds raised by the accounting engine and its store boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountingError {
    /// Bad input: amount, duration, date or month out of range.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The record exists but belongs to another owner or property.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl AccountingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AccountingError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AccountingError>;
