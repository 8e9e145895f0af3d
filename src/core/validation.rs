//! Validation rules for balance operations
//!
//! Pure, stateless predicates applied by the service before or during its
//! locked sections. Each function either passes the value through or
//! returns the matching business-rule error; none of them touch the stores.

use crate::types::{LedgerError, UserId};

/// Require a strictly positive operation amount
pub fn validate_amount(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::invalid_amount(Some(amount)));
    }
    Ok(())
}

/// Require a strictly positive user id
///
/// Applied on the read paths; mutation paths accept any id the lock
/// registry can key on.
pub fn validate_user_id(user_id: UserId) -> Result<(), LedgerError> {
    if user_id <= 0 {
        return Err(LedgerError::invalid_user_id(user_id));
    }
    Ok(())
}

/// Require the current balance to cover the requested use amount
pub fn validate_sufficient(
    user_id: UserId,
    balance: i64,
    requested: i64,
) -> Result<(), LedgerError> {
    if balance < requested {
        return Err(LedgerError::insufficient_balance(
            user_id, balance, requested,
        ));
    }
    Ok(())
}

/// Require the resulting balance to stay within the configured ceiling
///
/// With no ceiling configured (`None`), every resulting amount passes.
pub fn validate_ceiling(
    user_id: UserId,
    resulting: i64,
    max_balance: Option<i64>,
) -> Result<(), LedgerError> {
    if let Some(limit) = max_balance {
        if resulting > limit {
            return Err(LedgerError::amount_exceeds_limit(user_id, resulting, limit));
        }
    }
    Ok(())
}
