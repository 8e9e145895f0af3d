//! Error types for the point ledger engine
//!
//! This module defines all error conditions the engine can report.
//! Business-rule failures are local, synchronous, and non-retryable; the
//! caller is expected to reject the request upstream. None of them indicate
//! a system fault, and none of them leave a partial mutation behind.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: file not found, permission denied, etc.
//! - **CSV Parsing Errors**: malformed rows, invalid field values
//! - **Business-Rule Errors**: invalid amounts, unknown users, insufficient
//!   balance, balance ceiling violations

use thiserror::Error;

/// Main error type for the point ledger engine
///
/// Each variant carries enough context to diagnose the rejection without
/// consulting the stores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable at the front end - the malformed row is skipped and
    /// processing continues with the next row.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown operation type encountered in input
    ///
    /// Recoverable at the front end - the row is skipped.
    #[error("Invalid operation type '{op_type}'")]
    InvalidOperationType {
        /// The unrecognized operation type string
        op_type: String,
    },

    /// Operation amount was absent or not strictly positive
    #[error("Operation amount must be a positive number{}", amount.map(|a| format!(", got {}", a)).unwrap_or_else(|| String::from(" but was absent")))]
    InvalidAmount {
        /// The offending amount, or `None` when it was absent
        amount: Option<i64>,
    },

    /// Non-positive user id on a read operation
    #[error("User id must be a positive number, got {user_id}")]
    InvalidUserId {
        /// The offending user id
        user_id: i64,
    },

    /// Use against a user that has never charged
    ///
    /// The operation fails before any store mutation; it never provisions
    /// a balance row.
    #[error("User {user_id} does not exist")]
    UserNotFound {
        /// The unknown user id
        user_id: i64,
    },

    /// Use amount exceeds the current balance
    #[error("Insufficient balance for user {user_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// The user id
        user_id: i64,
        /// Current balance at the time of the check
        balance: i64,
        /// Requested use amount
        requested: i64,
    },

    /// Charge would push the balance past the configured ceiling
    ///
    /// Only reported when a maximum balance is configured.
    #[error("Charge for user {user_id} exceeds the balance limit: resulting {resulting}, limit {limit}")]
    AmountExceedsLimit {
        /// The user id
        user_id: i64,
        /// Balance the charge would have produced
        resulting: i64,
        /// Configured maximum balance
        limit: i64,
    },

    /// Charge would overflow the balance representation
    ///
    /// The charge is rejected and the stored balance is unchanged.
    #[error("Balance overflow for user {user_id}")]
    BalanceOverflow {
        /// The user id
        user_id: i64,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Option<i64>) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidUserId error
    pub fn invalid_user_id(user_id: i64) -> Self {
        LedgerError::InvalidUserId { user_id }
    }

    /// Create a UserNotFound error
    pub fn user_not_found(user_id: i64) -> Self {
        LedgerError::UserNotFound { user_id }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user_id: i64, balance: i64, requested: i64) -> Self {
        LedgerError::InsufficientBalance {
            user_id,
            balance,
            requested,
        }
    }

    /// Create an AmountExceedsLimit error
    pub fn amount_exceeds_limit(user_id: i64, resulting: i64, limit: i64) -> Self {
        LedgerError::AmountExceedsLimit {
            user_id,
            resulting,
            limit,
        }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(user_id: i64) -> Self {
        LedgerError::BalanceOverflow { user_id }
    }

    /// Create an InvalidOperationType error
    pub fn invalid_operation_type(op_type: &str) -> Self {
        LedgerError::InvalidOperationType {
            op_type: op_type.to_string(),
        }
    }
}
