//! Storage seams for temple-service.
//!
//! Every write is a single atomic unit: the in-memory store holds one lock
//! for the whole call, the PostgreSQL store runs it in one transaction.

use crate::error::TempleError;
use crate::models::{
    CommitteeMember, CommitteeMemberInput, ContactInput, GalleryItem, GalleryItemInput,
    GalleryItemUpdate, Jatre, JatreInput, PaymentConfirmation, PaymentDetails, PaymentStatus,
    Receipt, ReceiptIssuer, TempleAccount, TempleContact, UserRole,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a successful approval, all produced by the same atomic unit.
#[derive(Debug, Clone)]
pub struct Approval {
    pub payment: PaymentConfirmation,
    pub receipt: Receipt,
    pub account: TempleAccount,
}

/// Payments, receipts, the ledger and role assignments.
#[async_trait]
pub trait TempleRepository: Send + Sync {
    async fn health_check(&self) -> Result<(), TempleError>;

    /// Store a new pending confirmation under the next id.
    async fn insert_payment(
        &self,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError>;

    /// Overwrite a pending confirmation's donor fields.
    async fn update_pending_payment(
        &self,
        id: i64,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError>;

    /// Confirmations with `status`, in submission order.
    async fn list_payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<PaymentConfirmation>, TempleError>;

    /// Approve, mint the next receipt and credit the ledger in one unit.
    async fn approve_payment(
        &self,
        id: i64,
        issuer: &ReceiptIssuer,
        at: DateTime<Utc>,
    ) -> Result<Approval, TempleError>;

    async fn reject_payment(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<PaymentConfirmation, TempleError>;

    async fn get_receipt(&self, receipt_number: i64) -> Result<Option<Receipt>, TempleError>;

    async fn cancel_receipt(&self, receipt_number: i64) -> Result<Receipt, TempleError>;

    /// All receipts, cancelled included, in receipt-number order.
    async fn list_receipts(&self) -> Result<Vec<Receipt>, TempleError>;

    async fn get_account(&self) -> Result<TempleAccount, TempleError>;

    async fn set_balance(
        &self,
        balance: i64,
        at: DateTime<Utc>,
    ) -> Result<TempleAccount, TempleError>;

    async fn get_role(&self, principal: &str) -> Result<Option<UserRole>, TempleError>;

    async fn assign_role(&self, principal: &str, role: UserRole) -> Result<(), TempleError>;
}

/// Committee members, contacts, jatres and gallery items.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn add_committee_member(
        &self,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError>;
    async fn edit_committee_member(
        &self,
        id: i64,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError>;
    async fn remove_committee_member(&self, id: i64) -> Result<(), TempleError>;
    async fn list_committee_members(&self) -> Result<Vec<CommitteeMember>, TempleError>;

    async fn add_contact(&self, input: ContactInput) -> Result<TempleContact, TempleError>;
    async fn edit_contact(&self, id: i64, input: ContactInput)
        -> Result<TempleContact, TempleError>;
    async fn remove_contact(&self, id: i64) -> Result<(), TempleError>;
    async fn list_contacts(&self) -> Result<Vec<TempleContact>, TempleError>;

    async fn add_jatre(&self, input: JatreInput) -> Result<Jatre, TempleError>;
    async fn edit_jatre(&self, id: i64, input: JatreInput) -> Result<Jatre, TempleError>;
    async fn remove_jatre(&self, id: i64) -> Result<(), TempleError>;
    async fn list_jatres(&self) -> Result<Vec<Jatre>, TempleError>;

    async fn add_gallery_item(&self, input: GalleryItemInput)
        -> Result<GalleryItem, TempleError>;
    async fn edit_gallery_item(
        &self,
        id: i64,
        update: GalleryItemUpdate,
    ) -> Result<GalleryItem, TempleError>;
    async fn remove_gallery_item(&self, id: i64) -> Result<(), TempleError>;
    async fn list_gallery_items(&self) -> Result<Vec<GalleryItem>, TempleError>;
}

/// A complete storage backend.
pub trait Store: TempleRepository + DirectoryRepository {}

impl<T: TempleRepository + DirectoryRepository> Store for T {}
