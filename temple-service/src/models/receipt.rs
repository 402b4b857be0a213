//! Receipt model.

use super::payment::{PaymentConfirmation, PaymentMode};
use crate::error::TempleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Administrative fields stamped onto every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptIssuer {
    pub temple_name: String,
    pub location: String,
    pub receiver: String,
}

/// Donation receipt, minted once per approved payment.
///
/// Donor fields are a snapshot taken at approval time; the only later
/// mutation is `is_cancelled` going from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: i64,
    pub payment_id: i64,
    pub donor_name: String,
    pub payment_mode: PaymentMode,
    pub amount: i64,
    pub transaction_id: String,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
    pub temple_name: String,
    pub location: String,
    pub receiver: String,
    pub is_cancelled: bool,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Snapshot an approved payment into a new receipt.
    pub fn issue(
        receipt_number: i64,
        payment: &PaymentConfirmation,
        issuer: &ReceiptIssuer,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            receipt_number,
            payment_id: payment.id,
            donor_name: payment.donor_name.clone(),
            payment_mode: payment.payment_mode,
            amount: payment.amount_paid,
            transaction_id: payment.transaction_id.clone(),
            date: payment.date,
            temple_name: issuer.temple_name.clone(),
            location: issuer.location.clone(),
            receiver: issuer.receiver.clone(),
            is_cancelled: false,
            issued_at,
        }
    }

    /// Void the receipt. There is no way back.
    pub fn cancel(&mut self) -> Result<(), TempleError> {
        if self.is_cancelled {
            return Err(TempleError::InvalidState(format!(
                "receipt {} is already cancelled",
                self.receipt_number
            )));
        }
        self.is_cancelled = true;
        Ok(())
    }

    pub fn donor_detail(&self) -> DonorDetail {
        DonorDetail {
            date: self.date,
            donor_name: self.donor_name.clone(),
            payment_mode: self.payment_mode,
            amount: self.amount,
            transaction_id: self.transaction_id.clone(),
        }
    }
}

/// Donor-list row derived from a valid receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorDetail {
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
    pub donor_name: String,
    pub payment_mode: PaymentMode,
    pub amount: i64,
    pub transaction_id: String,
}

/// Aggregate over non-cancelled receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReport {
    pub total_amount: i128,
    pub total_collections: u64,
}
