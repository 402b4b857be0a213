//! The single temple account.

use crate::error::TempleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running balance of donations received and retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempleAccount {
    pub balance: i64,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub last_updated: DateTime<Utc>,
}

impl TempleAccount {
    pub fn new(balance: i64, at: DateTime<Utc>) -> Self {
        Self {
            balance,
            last_updated: at,
        }
    }

    /// Add an approved amount.
    pub fn credit(&mut self, amount: i64, at: DateTime<Utc>) -> Result<(), TempleError> {
        self.balance = self.credited(amount)?;
        self.last_updated = at;
        Ok(())
    }

    /// Balance after crediting `amount`, without mutating.
    pub fn credited(&self, amount: i64) -> Result<i64, TempleError> {
        self.balance.checked_add(amount).ok_or_else(|| {
            TempleError::InvalidState(format!(
                "crediting {} would overflow the balance {}",
                amount, self.balance
            ))
        })
    }

    /// Admin override.
    pub fn adjust(&mut self, new_balance: i64, at: DateTime<Utc>) {
        self.balance = new_balance;
        self.last_updated = at;
    }
}
