//! Payment confirmation model and its verification state machine.

use crate::error::TempleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the donor says the money was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMode {
    Upi,
    Cash,
    GPay,
    Cheque,
    PhonePe,
}

impl PaymentMode {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::Cash => "cash",
            Self::GPay => "gPay",
            Self::Cheque => "cheque",
            Self::PhonePe => "phonePe",
        }
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = TempleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(Self::Upi),
            "cash" => Ok(Self::Cash),
            "gPay" => Ok(Self::GPay),
            "cheque" => Ok(Self::Cheque),
            "phonePe" => Ok(Self::PhonePe),
            other => Err(TempleError::InvalidInput(format!(
                "unknown payment mode '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verification status. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    PendingVerification,
    Approved,
    Rejected,
}

impl PaymentStatus {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingVerification => "pendingVerification",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingVerification)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = TempleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendingVerification" => Ok(Self::PendingVerification),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TempleError::InvalidInput(format!(
                "unknown payment status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Donor-supplied fields of a confirmation, used for both submit and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub donor_name: String,
    pub mobile_number: String,
    pub amount_paid: i64,
    pub payment_mode: PaymentMode,
    pub transaction_id: String,
    /// Donor-declared payment time, not the submission time.
    pub date: DateTime<Utc>,
}

impl PaymentDetails {
    /// Reject non-positive amounts.
    pub fn validate(&self) -> Result<(), TempleError> {
        if self.amount_paid <= 0 {
            return Err(TempleError::InvalidInput(format!(
                "amountPaid must be a positive integer, got {}",
                self.amount_paid
            )));
        }
        Ok(())
    }
}

/// A submitted donation payment awaiting (or past) admin verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub id: i64,
    pub donor_name: String,
    pub mobile_number: String,
    pub amount_paid: i64,
    pub payment_mode: PaymentMode,
    pub transaction_id: String,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
    pub status: PaymentStatus,
    #[serde(
        default,
        with = "chrono::serde::ts_nanoseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub verification_date: Option<DateTime<Utc>>,
}

impl PaymentConfirmation {
    /// New pending confirmation.
    pub fn pending(id: i64, details: PaymentDetails) -> Self {
        Self {
            id,
            donor_name: details.donor_name,
            mobile_number: details.mobile_number,
            amount_paid: details.amount_paid,
            payment_mode: details.payment_mode,
            transaction_id: details.transaction_id,
            date: details.date,
            status: PaymentStatus::PendingVerification,
            verification_date: None,
        }
    }

    pub fn ensure_pending(&self) -> Result<(), TempleError> {
        if self.status.is_terminal() {
            return Err(TempleError::InvalidState(format!(
                "payment {} is already {}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// Overwrite the donor-supplied fields. Only allowed while pending.
    pub fn apply_edit(&mut self, details: PaymentDetails) -> Result<(), TempleError> {
        self.ensure_pending()?;
        details.validate()?;
        self.donor_name = details.donor_name;
        self.mobile_number = details.mobile_number;
        self.amount_paid = details.amount_paid;
        self.payment_mode = details.payment_mode;
        self.transaction_id = details.transaction_id;
        self.date = details.date;
        Ok(())
    }

    /// Move out of `PendingVerification` into a terminal status.
    pub fn verify(&mut self, to: PaymentStatus, at: DateTime<Utc>) -> Result<(), TempleError> {
        if !to.is_terminal() {
            return Err(TempleError::InvalidState(format!(
                "cannot transition payment {} back to {}",
                self.id, to
            )));
        }
        self.ensure_pending()?;
        self.status = to;
        self.verification_date = Some(at);
        Ok(())
    }
}
