//! PostgreSQL storage backend for temple-service.

use crate::error::TempleError;
use crate::models::{
    CommitteeMember, CommitteeMemberInput, ContactInput, GalleryItem, GalleryItemInput,
    GalleryItemUpdate, Jatre, JatreInput, PaymentConfirmation, PaymentDetails, PaymentStatus,
    Receipt, ReceiptIssuer, TempleAccount, TempleContact, UserRole,
};
use crate::services::metrics::STORE_OPERATION_DURATION;
use crate::services::repository::{Approval, DirectoryRepository, TempleRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{info, instrument};

const PAYMENT_COLUMNS: &str = "id, donor_name, mobile_number, amount_paid, payment_mode, \
     transaction_id, paid_at, status, verification_date";

const RECEIPT_COLUMNS: &str = "receipt_number, payment_id, donor_name, payment_mode, amount, \
     transaction_id, paid_at, temple_name, location, receiver, is_cancelled, issued_at";

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: i64,
    donor_name: String,
    mobile_number: String,
    amount_paid: i64,
    payment_mode: String,
    transaction_id: String,
    paid_at: DateTime<Utc>,
    status: String,
    verification_date: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for PaymentConfirmation {
    type Error = TempleError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            donor_name: row.donor_name,
            mobile_number: row.mobile_number,
            amount_paid: row.amount_paid,
            payment_mode: row.payment_mode.parse().map_err(corrupt)?,
            transaction_id: row.transaction_id,
            date: row.paid_at,
            status: row.status.parse().map_err(corrupt)?,
            verification_date: row.verification_date,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReceiptRow {
    receipt_number: i64,
    payment_id: i64,
    donor_name: String,
    payment_mode: String,
    amount: i64,
    transaction_id: String,
    paid_at: DateTime<Utc>,
    temple_name: String,
    location: String,
    receiver: String,
    is_cancelled: bool,
    issued_at: DateTime<Utc>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = TempleError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Self {
            receipt_number: row.receipt_number,
            payment_id: row.payment_id,
            donor_name: row.donor_name,
            payment_mode: row.payment_mode.parse().map_err(corrupt)?,
            amount: row.amount,
            transaction_id: row.transaction_id,
            date: row.paid_at,
            temple_name: row.temple_name,
            location: row.location,
            receiver: row.receiver,
            is_cancelled: row.is_cancelled,
            issued_at: row.issued_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    balance: i64,
    last_updated: DateTime<Utc>,
}

impl From<AccountRow> for TempleAccount {
    fn from(row: AccountRow) -> Self {
        TempleAccount::new(row.balance, row.last_updated)
    }
}

#[derive(Debug, FromRow)]
struct CommitteeRow {
    id: i64,
    name: String,
    role: String,
    mobile_number: String,
}

impl TryFrom<CommitteeRow> for CommitteeMember {
    type Error = TempleError;

    fn try_from(row: CommitteeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            role: row.role.parse().map_err(corrupt)?,
            mobile_number: row.mobile_number,
        })
    }
}

#[derive(Debug, FromRow)]
struct JatreRow {
    id: i64,
    name: String,
    held_at: DateTime<Utc>,
    description: String,
    activities: Vec<String>,
}

impl From<JatreRow> for Jatre {
    fn from(row: JatreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            date: row.held_at,
            description: row.description,
            activities: row.activities,
        }
    }
}

/// A stored enum value that no longer parses is a storage fault, not bad input.
fn corrupt(err: TempleError) -> TempleError {
    TempleError::Storage(anyhow::anyhow!("Corrupt row: {}", err))
}

fn not_found(what: &str, id: i64) -> TempleError {
    TempleError::NotFound(format!("{} {}", what, id))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "temple-service"))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, TempleError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), TempleError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Create the account row with `initial_balance` unless it already exists.
    #[instrument(skip(self))]
    pub async fn ensure_account(&self, initial_balance: i64) -> Result<(), TempleError> {
        sqlx::query(
            r#"
            INSERT INTO temple_account (id, balance, last_updated)
            VALUES (1, $1, now())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(initial_balance)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TempleRepository for PgRepository {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), TempleError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, details), fields(store = "postgres"))]
    async fn insert_payment(
        &self,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        details.validate()?;
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["insert_payment"])
            .start_timer();

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            INSERT INTO payment_confirmations
                (donor_name, mobile_number, amount_paid, payment_mode, transaction_id, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(&details.donor_name)
        .bind(&details.mobile_number)
        .bind(details.amount_paid)
        .bind(details.payment_mode.as_str())
        .bind(&details.transaction_id)
        .bind(details.date)
        .fetch_one(&self.pool)
        .await?;

        timer.observe_duration();
        row.try_into()
    }

    #[instrument(skip(self, details), fields(store = "postgres"))]
    async fn update_pending_payment(
        &self,
        id: i64,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["update_pending_payment"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_confirmations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found("Payment", id))?;

        let mut payment = PaymentConfirmation::try_from(row)?;
        payment.apply_edit(details)?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            UPDATE payment_confirmations
            SET donor_name = $2, mobile_number = $3, amount_paid = $4,
                payment_mode = $5, transaction_id = $6, paid_at = $7
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&payment.donor_name)
        .bind(&payment.mobile_number)
        .bind(payment.amount_paid)
        .bind(payment.payment_mode.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.observe_duration();

        row.try_into()
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn list_payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<PaymentConfirmation>, TempleError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["list_payments_by_status"])
            .start_timer();

        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_confirmations WHERE status = $1 ORDER BY id"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        rows.into_iter().map(PaymentConfirmation::try_from).collect()
    }

    /// Locks the payment row, then the account row. Every writer that touches
    /// both takes them in this order.
    #[instrument(skip(self, issuer), fields(store = "postgres"))]
    async fn approve_payment(
        &self,
        id: i64,
        issuer: &ReceiptIssuer,
        at: DateTime<Utc>,
    ) -> Result<Approval, TempleError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["approve_payment"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_confirmations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found("Payment", id))?;

        let mut payment = PaymentConfirmation::try_from(row)?;
        payment.verify(PaymentStatus::Approved, at)?;

        let mut account: TempleAccount = sqlx::query_as::<_, AccountRow>(
            "SELECT balance, last_updated FROM temple_account WHERE id = 1 FOR UPDATE",
        )
        .fetch_one(&mut *tx)
        .await?
        .into();
        account.credit(payment.amount_paid, at)?;

        // The account row lock serializes approvals, so max + 1 cannot race.
        let receipt_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(receipt_number), 0) + 1 FROM receipts")
                .fetch_one(&mut *tx)
                .await?;
        let receipt = Receipt::issue(receipt_number, &payment, issuer, at);

        sqlx::query(
            "UPDATE payment_confirmations SET status = $2, verification_date = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(payment.status.as_str())
        .bind(at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            r#"
            INSERT INTO receipts ({RECEIPT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#
        ))
        .bind(receipt.receipt_number)
        .bind(receipt.payment_id)
        .bind(&receipt.donor_name)
        .bind(receipt.payment_mode.as_str())
        .bind(receipt.amount)
        .bind(&receipt.transaction_id)
        .bind(receipt.date)
        .bind(&receipt.temple_name)
        .bind(&receipt.location)
        .bind(&receipt.receiver)
        .bind(receipt.is_cancelled)
        .bind(receipt.issued_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE temple_account SET balance = $1, last_updated = $2 WHERE id = 1")
            .bind(account.balance)
            .bind(account.last_updated)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.observe_duration();

        Ok(Approval {
            payment,
            receipt,
            account,
        })
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn reject_payment(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<PaymentConfirmation, TempleError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_confirmations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found("Payment", id))?;

        let mut payment = PaymentConfirmation::try_from(row)?;
        payment.verify(PaymentStatus::Rejected, at)?;

        sqlx::query(
            "UPDATE payment_confirmations SET status = $2, verification_date = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(payment.status.as_str())
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(payment)
    }

    async fn get_receipt(&self, receipt_number: i64) -> Result<Option<Receipt>, TempleError> {
        sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE receipt_number = $1"
        ))
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?
        .map(Receipt::try_from)
        .transpose()
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn cancel_receipt(&self, receipt_number: i64) -> Result<Receipt, TempleError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE receipt_number = $1 FOR UPDATE"
        ))
        .bind(receipt_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found("Receipt", receipt_number))?;

        let mut receipt = Receipt::try_from(row)?;
        receipt.cancel()?;

        sqlx::query("UPDATE receipts SET is_cancelled = TRUE WHERE receipt_number = $1")
            .bind(receipt_number)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(receipt)
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn list_receipts(&self) -> Result<Vec<Receipt>, TempleError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["list_receipts"])
            .start_timer();

        let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY receipt_number"
        ))
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        rows.into_iter().map(Receipt::try_from).collect()
    }

    async fn get_account(&self) -> Result<TempleAccount, TempleError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT balance, last_updated FROM temple_account WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(store = "postgres"))]
    async fn set_balance(
        &self,
        balance: i64,
        at: DateTime<Utc>,
    ) -> Result<TempleAccount, TempleError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE temple_account SET balance = $1, last_updated = $2
            WHERE id = 1
            RETURNING balance, last_updated
            "#,
        )
        .bind(balance)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_role(&self, principal: &str) -> Result<Option<UserRole>, TempleError> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM role_assignments WHERE principal = $1")
                .bind(principal)
                .fetch_optional(&self.pool)
                .await?;
        role.map(|r| r.parse().map_err(corrupt)).transpose()
    }

    #[instrument(skip(self))]
    async fn assign_role(&self, principal: &str, role: UserRole) -> Result<(), TempleError> {
        sqlx::query(
            r#"
            INSERT INTO role_assignments (principal, role) VALUES ($1, $2)
            ON CONFLICT (principal) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(principal)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for PgRepository {
    async fn add_committee_member(
        &self,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        sqlx::query_as::<_, CommitteeRow>(
            r#"
            INSERT INTO committee_members (name, role, mobile_number)
            VALUES ($1, $2, $3)
            RETURNING id, name, role, mobile_number
            "#,
        )
        .bind(&input.name)
        .bind(input.role.as_str())
        .bind(&input.mobile_number)
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    async fn edit_committee_member(
        &self,
        id: i64,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        sqlx::query_as::<_, CommitteeRow>(
            r#"
            UPDATE committee_members SET name = $2, role = $3, mobile_number = $4
            WHERE id = $1
            RETURNING id, name, role, mobile_number
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.role.as_str())
        .bind(&input.mobile_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Committee member", id))?
        .try_into()
    }

    async fn remove_committee_member(&self, id: i64) -> Result<(), TempleError> {
        delete_by_id(&self.pool, "committee_members", id, "Committee member").await
    }

    async fn list_committee_members(&self) -> Result<Vec<CommitteeMember>, TempleError> {
        sqlx::query_as::<_, CommitteeRow>(
            "SELECT id, name, role, mobile_number FROM committee_members ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(CommitteeMember::try_from)
        .collect()
    }

    async fn add_contact(&self, input: ContactInput) -> Result<TempleContact, TempleError> {
        let (id, contact_type, contact_number): (i64, String, String) = sqlx::query_as(
            r#"
            INSERT INTO temple_contacts (contact_type, contact_number)
            VALUES ($1, $2)
            RETURNING id, contact_type, contact_number
            "#,
        )
        .bind(&input.contact_type)
        .bind(&input.contact_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(TempleContact {
            id,
            contact_type,
            contact_number,
        })
    }

    async fn edit_contact(
        &self,
        id: i64,
        input: ContactInput,
    ) -> Result<TempleContact, TempleError> {
        let updated = sqlx::query("UPDATE temple_contacts SET contact_type = $2, contact_number = $3 WHERE id = $1")
            .bind(id)
            .bind(&input.contact_type)
            .bind(&input.contact_number)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(not_found("Contact", id));
        }
        Ok(TempleContact {
            id,
            contact_type: input.contact_type,
            contact_number: input.contact_number,
        })
    }

    async fn remove_contact(&self, id: i64) -> Result<(), TempleError> {
        delete_by_id(&self.pool, "temple_contacts", id, "Contact").await
    }

    async fn list_contacts(&self) -> Result<Vec<TempleContact>, TempleError> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT id, contact_type, contact_number FROM temple_contacts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, contact_type, contact_number)| TempleContact {
                id,
                contact_type,
                contact_number,
            })
            .collect())
    }

    async fn add_jatre(&self, input: JatreInput) -> Result<Jatre, TempleError> {
        let row = sqlx::query_as::<_, JatreRow>(
            r#"
            INSERT INTO jatres (name, held_at, description, activities)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, held_at, description, activities
            "#,
        )
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.description)
        .bind(&input.activities)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn edit_jatre(&self, id: i64, input: JatreInput) -> Result<Jatre, TempleError> {
        let row = sqlx::query_as::<_, JatreRow>(
            r#"
            UPDATE jatres SET name = $2, held_at = $3, description = $4, activities = $5
            WHERE id = $1
            RETURNING id, name, held_at, description, activities
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.description)
        .bind(&input.activities)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Jatre", id))?;
        Ok(row.into())
    }

    async fn remove_jatre(&self, id: i64) -> Result<(), TempleError> {
        delete_by_id(&self.pool, "jatres", id, "Jatre").await
    }

    async fn list_jatres(&self) -> Result<Vec<Jatre>, TempleError> {
        let rows = sqlx::query_as::<_, JatreRow>(
            "SELECT id, name, held_at, description, activities FROM jatres ORDER BY held_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Jatre::from).collect())
    }

    async fn add_gallery_item(
        &self,
        input: GalleryItemInput,
    ) -> Result<GalleryItem, TempleError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO gallery_items (title, description, media_type, blob_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.media_type)
        .bind(&input.blob_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(GalleryItem {
            id,
            title: input.title,
            description: input.description,
            media_type: input.media_type,
            blob_url: input.blob_url,
        })
    }

    async fn edit_gallery_item(
        &self,
        id: i64,
        update: GalleryItemUpdate,
    ) -> Result<GalleryItem, TempleError> {
        let blob_url: String = sqlx::query_scalar(
            r#"
            UPDATE gallery_items SET title = $2, description = $3, media_type = $4
            WHERE id = $1
            RETURNING blob_url
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.media_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Gallery item", id))?;

        Ok(GalleryItem {
            id,
            title: update.title,
            description: update.description,
            media_type: update.media_type,
            blob_url,
        })
    }

    async fn remove_gallery_item(&self, id: i64) -> Result<(), TempleError> {
        delete_by_id(&self.pool, "gallery_items", id, "Gallery item").await
    }

    async fn list_gallery_items(&self) -> Result<Vec<GalleryItem>, TempleError> {
        let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
            "SELECT id, title, description, media_type, blob_url FROM gallery_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, description, media_type, blob_url)| GalleryItem {
                id,
                title,
                description,
                media_type,
                blob_url,
            })
            .collect())
    }
}

/// `table` is always one of the fixed directory table names above.
async fn delete_by_id(pool: &PgPool, table: &str, id: i64, what: &str) -> Result<(), TempleError> {
    let deleted = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(not_found(what, id));
    }
    Ok(())
}
