//! In-memory storage backend.
//!
//! All state sits behind one `RwLock`: writers are serialized, readers see
//! a consistent snapshot. Fallible steps run on copies and are committed
//! only once everything has succeeded.

use crate::error::TempleError;
use crate::models::{
    CommitteeMember, CommitteeMemberInput, ContactInput, GalleryItem, GalleryItemInput,
    GalleryItemUpdate, Jatre, JatreInput, PaymentConfirmation, PaymentDetails, PaymentStatus,
    Receipt, ReceiptIssuer, TempleAccount, TempleContact, UserRole,
};
use crate::services::repository::{Approval, DirectoryRepository, TempleRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::instrument;

/// Rows keyed by a monotonically increasing id.
#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn replace_with(
        &mut self,
        id: i64,
        what: &str,
        build: impl FnOnce(i64) -> T,
    ) -> Result<T, TempleError> {
        let slot = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| TempleError::NotFound(format!("{} {}", what, id)))?;
        *slot = build(id);
        Ok(slot.clone())
    }

    fn remove(&mut self, id: i64, what: &str) -> Result<(), TempleError> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TempleError::NotFound(format!("{} {}", what, id)))
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug)]
struct MemoryState {
    payments: Table<PaymentConfirmation>,
    receipts: BTreeMap<i64, Receipt>,
    account: TempleAccount,
    roles: HashMap<String, UserRole>,
    committee: Table<CommitteeMember>,
    contacts: Table<TempleContact>,
    jatres: Table<Jatre>,
    gallery: Table<GalleryItem>,
}

/// Process-local store; contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new(initial_balance: i64) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                payments: Table::new(),
                receipts: BTreeMap::new(),
                account: TempleAccount::new(initial_balance, Utc::now()),
                roles: HashMap::new(),
                committee: Table::new(),
                contacts: Table::new(),
                jatres: Table::new(),
                gallery: Table::new(),
            }),
        }
    }
}

fn payment_not_found(id: i64) -> TempleError {
    TempleError::NotFound(format!("Payment {}", id))
}

fn receipt_not_found(receipt_number: i64) -> TempleError {
    TempleError::NotFound(format!("Receipt {}", receipt_number))
}

#[async_trait]
impl TempleRepository for InMemoryRepository {
    async fn health_check(&self) -> Result<(), TempleError> {
        Ok(())
    }

    #[instrument(skip(self, details), fields(store = "memory"))]
    async fn insert_payment(
        &self,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        details.validate()?;
        let mut state = self.state.write().await;
        Ok(state
            .payments
            .insert_with(|id| PaymentConfirmation::pending(id, details)))
    }

    #[instrument(skip(self, details), fields(store = "memory"))]
    async fn update_pending_payment(
        &self,
        id: i64,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .rows
            .get_mut(&id)
            .ok_or_else(|| payment_not_found(id))?;
        payment.apply_edit(details)?;
        Ok(payment.clone())
    }

    async fn list_payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<PaymentConfirmation>, TempleError> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .rows
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, issuer), fields(store = "memory"))]
    async fn approve_payment(
        &self,
        id: i64,
        issuer: &ReceiptIssuer,
        at: DateTime<Utc>,
    ) -> Result<Approval, TempleError> {
        let mut state = self.state.write().await;

        let mut payment = state
            .payments
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| payment_not_found(id))?;
        payment.verify(PaymentStatus::Approved, at)?;

        let mut account = state.account;
        account.credit(payment.amount_paid, at)?;

        // Receipts are never deleted, so max + 1 is never a reused number.
        let receipt_number = state.receipts.keys().next_back().copied().unwrap_or(0) + 1;
        let receipt = Receipt::issue(receipt_number, &payment, issuer, at);

        state.payments.rows.insert(id, payment.clone());
        state.receipts.insert(receipt_number, receipt.clone());
        state.account = account;

        Ok(Approval {
            payment,
            receipt,
            account,
        })
    }

    #[instrument(skip(self), fields(store = "memory"))]
    async fn reject_payment(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<PaymentConfirmation, TempleError> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .rows
            .get_mut(&id)
            .ok_or_else(|| payment_not_found(id))?;
        payment.verify(PaymentStatus::Rejected, at)?;
        Ok(payment.clone())
    }

    async fn get_receipt(&self, receipt_number: i64) -> Result<Option<Receipt>, TempleError> {
        let state = self.state.read().await;
        Ok(state.receipts.get(&receipt_number).cloned())
    }

    #[instrument(skip(self), fields(store = "memory"))]
    async fn cancel_receipt(&self, receipt_number: i64) -> Result<Receipt, TempleError> {
        let mut state = self.state.write().await;
        let receipt = state
            .receipts
            .get_mut(&receipt_number)
            .ok_or_else(|| receipt_not_found(receipt_number))?;
        receipt.cancel()?;
        Ok(receipt.clone())
    }

    async fn list_receipts(&self) -> Result<Vec<Receipt>, TempleError> {
        let state = self.state.read().await;
        Ok(state.receipts.values().cloned().collect())
    }

    async fn get_account(&self) -> Result<TempleAccount, TempleError> {
        Ok(self.state.read().await.account)
    }

    #[instrument(skip(self), fields(store = "memory"))]
    async fn set_balance(
        &self,
        balance: i64,
        at: DateTime<Utc>,
    ) -> Result<TempleAccount, TempleError> {
        let mut state = self.state.write().await;
        state.account.adjust(balance, at);
        Ok(state.account)
    }

    async fn get_role(&self, principal: &str) -> Result<Option<UserRole>, TempleError> {
        Ok(self.state.read().await.roles.get(principal).copied())
    }

    async fn assign_role(&self, principal: &str, role: UserRole) -> Result<(), TempleError> {
        self.state
            .write()
            .await
            .roles
            .insert(principal.to_string(), role);
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryRepository {
    async fn add_committee_member(
        &self,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        let mut state = self.state.write().await;
        Ok(state.committee.insert_with(|id| CommitteeMember {
            id,
            name: input.name,
            role: input.role,
            mobile_number: input.mobile_number,
        }))
    }

    async fn edit_committee_member(
        &self,
        id: i64,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        let mut state = self.state.write().await;
        state
            .committee
            .replace_with(id, "Committee member", |id| CommitteeMember {
                id,
                name: input.name,
                role: input.role,
                mobile_number: input.mobile_number,
            })
    }

    async fn remove_committee_member(&self, id: i64) -> Result<(), TempleError> {
        self.state
            .write()
            .await
            .committee
            .remove(id, "Committee member")
    }

    async fn list_committee_members(&self) -> Result<Vec<CommitteeMember>, TempleError> {
        Ok(self.state.read().await.committee.all())
    }

    async fn add_contact(&self, input: ContactInput) -> Result<TempleContact, TempleError> {
        let mut state = self.state.write().await;
        Ok(state.contacts.insert_with(|id| TempleContact {
            id,
            contact_type: input.contact_type,
            contact_number: input.contact_number,
        }))
    }

    async fn edit_contact(
        &self,
        id: i64,
        input: ContactInput,
    ) -> Result<TempleContact, TempleError> {
        let mut state = self.state.write().await;
        state.contacts.replace_with(id, "Contact", |id| TempleContact {
            id,
            contact_type: input.contact_type,
            contact_number: input.contact_number,
        })
    }

    async fn remove_contact(&self, id: i64) -> Result<(), TempleError> {
        self.state.write().await.contacts.remove(id, "Contact")
    }

    async fn list_contacts(&self) -> Result<Vec<TempleContact>, TempleError> {
        Ok(self.state.read().await.contacts.all())
    }

    async fn add_jatre(&self, input: JatreInput) -> Result<Jatre, TempleError> {
        let mut state = self.state.write().await;
        Ok(state.jatres.insert_with(|id| Jatre {
            id,
            name: input.name,
            date: input.date,
            description: input.description,
            activities: input.activities,
        }))
    }

    async fn edit_jatre(&self, id: i64, input: JatreInput) -> Result<Jatre, TempleError> {
        let mut state = self.state.write().await;
        state.jatres.replace_with(id, "Jatre", |id| Jatre {
            id,
            name: input.name,
            date: input.date,
            description: input.description,
            activities: input.activities,
        })
    }

    async fn remove_jatre(&self, id: i64) -> Result<(), TempleError> {
        self.state.write().await.jatres.remove(id, "Jatre")
    }

    async fn list_jatres(&self) -> Result<Vec<Jatre>, TempleError> {
        let mut jatres = self.state.read().await.jatres.all();
        jatres.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(jatres)
    }

    async fn add_gallery_item(
        &self,
        input: GalleryItemInput,
    ) -> Result<GalleryItem, TempleError> {
        let mut state = self.state.write().await;
        Ok(state.gallery.insert_with(|id| GalleryItem {
            id,
            title: input.title,
            description: input.description,
            media_type: input.media_type,
            blob_url: input.blob_url,
        }))
    }

    async fn edit_gallery_item(
        &self,
        id: i64,
        update: GalleryItemUpdate,
    ) -> Result<GalleryItem, TempleError> {
        let mut state = self.state.write().await;
        let item = state
            .gallery
            .rows
            .get_mut(&id)
            .ok_or_else(|| TempleError::NotFound(format!("Gallery item {}", id)))?;
        item.title = update.title;
        item.description = update.description;
        item.media_type = update.media_type;
        Ok(item.clone())
    }

    async fn remove_gallery_item(&self, id: i64) -> Result<(), TempleError> {
        self.state.write().await.gallery.remove(id, "Gallery item")
    }

    async fn list_gallery_items(&self) -> Result<Vec<GalleryItem>, TempleError> {
        Ok(self.state.read().await.gallery.all())
    }
}
