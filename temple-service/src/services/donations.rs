//! Payment approval workflow: confirmations, receipts and the ledger.

use crate::error::TempleError;
use crate::models::{
    Caller, DonationReport, DonorDetail, PaymentConfirmation, PaymentDetails, PaymentStatus,
    Receipt, ReceiptIssuer, TempleAccount,
};
use crate::services::metrics::{
    BALANCE_ADJUSTMENTS, DONATED_AMOUNT, ERRORS_TOTAL, PAYMENTS_TOTAL, RECEIPTS_CANCELLED,
    RECEIPTS_ISSUED,
};
use crate::services::reporting;
use crate::services::repository::Store;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

/// Count a failed operation, then hand the error back.
fn track<T>(operation: &str, result: Result<T, TempleError>) -> Result<T, TempleError> {
    if let Err(e) = &result {
        ERRORS_TOTAL
            .with_label_values(&[operation, e.kind()])
            .inc();
    }
    result
}

#[derive(Clone)]
pub struct DonationService {
    store: Arc<dyn Store>,
    issuer: ReceiptIssuer,
}

impl DonationService {
    pub fn new(store: Arc<dyn Store>, issuer: ReceiptIssuer) -> Self {
        Self { store, issuer }
    }

    /// Record a donor's payment confirmation as pending. Open to everyone.
    #[instrument(skip(self, caller, details), fields(amount = details.amount_paid, mode = %details.payment_mode))]
    pub async fn submit(
        &self,
        caller: &Caller,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        let result = async {
            details.validate()?;
            self.store.insert_payment(details).await
        }
        .await;
        let payment = track("submit_payment", result)?;

        PAYMENTS_TOTAL.with_label_values(&["submitted"]).inc();
        info!(
            payment_id = payment.id,
            principal = caller.principal.as_deref().unwrap_or("-"),
            "Payment confirmation submitted"
        );
        Ok(payment)
    }

    #[instrument(skip(self, caller, details))]
    pub async fn edit(
        &self,
        caller: &Caller,
        id: i64,
        details: PaymentDetails,
    ) -> Result<PaymentConfirmation, TempleError> {
        let result = async {
            caller.require_admin("editPaymentConfirmation")?;
            details.validate()?;
            self.store.update_pending_payment(id, details).await
        }
        .await;
        let payment = track("edit_payment", result)?;

        PAYMENTS_TOTAL.with_label_values(&["edited"]).inc();
        info!(payment_id = id, "Pending payment confirmation edited");
        Ok(payment)
    }

    #[instrument(skip(self, caller))]
    pub async fn list_pending(
        &self,
        caller: &Caller,
    ) -> Result<Vec<PaymentConfirmation>, TempleError> {
        let result = async {
            caller.require_admin("getPendingPayments")?;
            self.store
                .list_payments_by_status(PaymentStatus::PendingVerification)
                .await
        }
        .await;
        track("list_pending", result)
    }

    /// Approve a pending confirmation, mint its receipt and credit the account.
    #[instrument(skip(self, caller))]
    pub async fn approve(&self, caller: &Caller, id: i64) -> Result<Receipt, TempleError> {
        let result = async {
            caller.require_admin("approvePayment")?;
            self.store.approve_payment(id, &self.issuer, Utc::now()).await
        }
        .await;
        let approval = track("approve_payment", result)?;

        PAYMENTS_TOTAL.with_label_values(&["approved"]).inc();
        RECEIPTS_ISSUED.inc();
        DONATED_AMOUNT.inc_by(approval.receipt.amount.unsigned_abs());
        info!(
            payment_id = id,
            receipt_number = approval.receipt.receipt_number,
            amount = approval.receipt.amount,
            balance = approval.account.balance,
            "Payment approved and receipt issued"
        );
        Ok(approval.receipt)
    }

    #[instrument(skip(self, caller))]
    pub async fn reject(
        &self,
        caller: &Caller,
        id: i64,
    ) -> Result<PaymentConfirmation, TempleError> {
        let result = async {
            caller.require_admin("rejectPayment")?;
            self.store.reject_payment(id, Utc::now()).await
        }
        .await;
        let payment = track("reject_payment", result)?;

        PAYMENTS_TOTAL.with_label_values(&["rejected"]).inc();
        info!(payment_id = id, "Payment rejected");
        Ok(payment)
    }

    /// Fetch a receipt by number. Open to everyone.
    #[instrument(skip(self))]
    pub async fn get_receipt(&self, receipt_number: i64) -> Result<Receipt, TempleError> {
        let result = self
            .store
            .get_receipt(receipt_number)
            .await
            .and_then(|r| {
                r.ok_or_else(|| TempleError::NotFound(format!("Receipt {}", receipt_number)))
            });
        track("get_receipt", result)
    }

    /// Re-issue the stored receipt for display. Cancelled receipts are
    /// returned as they are, flag included.
    #[instrument(skip(self, caller))]
    pub async fn regenerate(
        &self,
        caller: &Caller,
        receipt_number: i64,
    ) -> Result<Receipt, TempleError> {
        let result = async {
            caller.require_admin("regenerateReceipt")?;
            self.store
                .get_receipt(receipt_number)
                .await?
                .ok_or_else(|| TempleError::NotFound(format!("Receipt {}", receipt_number)))
        }
        .await;
        let receipt = track("regenerate_receipt", result)?;
        info!(
            receipt_number,
            is_cancelled = receipt.is_cancelled,
            "Receipt regenerated"
        );
        Ok(receipt)
    }

    /// Void a receipt. The account balance is left as it is.
    #[instrument(skip(self, caller))]
    pub async fn cancel(&self, caller: &Caller, receipt_number: i64) -> Result<Receipt, TempleError> {
        let result = async {
            caller.require_admin("cancelReceipt")?;
            self.store.cancel_receipt(receipt_number).await
        }
        .await;
        let receipt = track("cancel_receipt", result)?;

        RECEIPTS_CANCELLED.inc();
        info!(receipt_number, amount = receipt.amount, "Receipt cancelled");
        Ok(receipt)
    }

    #[instrument(skip(self, caller))]
    pub async fn get_account(&self, caller: &Caller) -> Result<TempleAccount, TempleError> {
        let result = async {
            caller.require_admin("getTempleAccountBalance")?;
            self.store.get_account().await
        }
        .await;
        track("get_account", result)
    }

    /// Overwrite the balance. Only `last_updated` records that it happened.
    #[instrument(skip(self, caller))]
    pub async fn adjust_balance(
        &self,
        caller: &Caller,
        new_balance: i64,
    ) -> Result<TempleAccount, TempleError> {
        let result = async {
            caller.require_admin("adminAdjustBalance")?;
            self.store.set_balance(new_balance, Utc::now()).await
        }
        .await;
        let account = track("adjust_balance", result)?;

        BALANCE_ADJUSTMENTS.inc();
        info!(
            principal = caller.principal.as_deref().unwrap_or("-"),
            balance = account.balance,
            "Account balance adjusted by admin"
        );
        Ok(account)
    }

    /// Totals over valid receipts. Open to everyone.
    #[instrument(skip(self))]
    pub async fn donation_report(&self) -> Result<DonationReport, TempleError> {
        let receipts = track("donation_report", self.store.list_receipts().await)?;
        Ok(reporting::donation_report(&receipts))
    }

    #[instrument(skip(self, caller))]
    pub async fn donor_list(&self, caller: &Caller) -> Result<Vec<DonorDetail>, TempleError> {
        let result = async {
            caller.require_admin("getDonorList")?;
            self.store.list_receipts().await
        }
        .await;
        let receipts = track("donor_list", result)?;
        Ok(reporting::donor_list(&receipts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMode, UserRole};
    use crate::services::memory::InMemoryRepository;

    fn service(initial_balance: i64) -> DonationService {
        let issuer = ReceiptIssuer {
            temple_name: "Temple".to_string(),
            location: "Village".to_string(),
            receiver: "Committee".to_string(),
        };
        DonationService::new(Arc::new(InMemoryRepository::new(initial_balance)), issuer)
    }

    fn admin() -> Caller {
        Caller::new("root", UserRole::Admin)
    }

    fn details(amount: i64) -> PaymentDetails {
        PaymentDetails {
            donor_name: "A".to_string(),
            mobile_number: "9999999999".to_string(),
            amount_paid: amount,
            payment_mode: PaymentMode::Upi,
            transaction_id: "T1".to_string(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn approval_credits_balance_and_report_ignores_cancellation() {
        let svc = service(1_000);
        let payment = svc.submit(&Caller::guest(), details(500)).await.unwrap();
        assert_eq!(payment.id, 1);

        let receipt = svc.approve(&admin(), payment.id).await.unwrap();
        assert_eq!(receipt.receipt_number, 1);
        assert_eq!(receipt.amount, 500);
        assert!(!receipt.is_cancelled);
        assert_eq!(svc.get_account(&admin()).await.unwrap().balance, 1_500);

        let report = svc.donation_report().await.unwrap();
        assert_eq!((report.total_amount, report.total_collections), (500, 1));

        svc.cancel(&admin(), 1).await.unwrap();
        let report = svc.donation_report().await.unwrap();
        assert_eq!((report.total_amount, report.total_collections), (0, 0));
        assert_eq!(svc.get_account(&admin()).await.unwrap().balance, 1_500);
    }

    #[tokio::test]
    async fn second_approval_is_invalid_state() {
        let svc = service(0);
        let payment = svc.submit(&Caller::guest(), details(250)).await.unwrap();
        svc.approve(&admin(), payment.id).await.unwrap();

        let err = svc.approve(&admin(), payment.id).await.unwrap_err();
        assert!(matches!(err, TempleError::InvalidState(_)));
        assert_eq!(svc.get_account(&admin()).await.unwrap().balance, 250);
        assert!(matches!(
            svc.get_receipt(2).await,
            Err(TempleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejection_mints_nothing() {
        let svc = service(10);
        let payment = svc.submit(&Caller::guest(), details(250)).await.unwrap();

        let rejected = svc.reject(&admin(), payment.id).await.unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
        assert!(rejected.verification_date.is_some());
        assert_eq!(svc.get_account(&admin()).await.unwrap().balance, 10);
        assert!(svc.list_pending(&admin()).await.unwrap().is_empty());
        assert_eq!(svc.donation_report().await.unwrap(), DonationReport::default());

        let err = svc.edit(&admin(), payment.id, details(900)).await.unwrap_err();
        assert!(matches!(err, TempleError::InvalidState(_)));
    }

    #[tokio::test]
    async fn non_admin_callers_are_unauthorized() {
        let svc = service(0);
        let payment = svc.submit(&Caller::guest(), details(100)).await.unwrap();
        let user = Caller::new("devotee", UserRole::User);

        assert!(matches!(
            svc.approve(&user, payment.id).await,
            Err(TempleError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.list_pending(&Caller::guest()).await,
            Err(TempleError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.adjust_balance(&user, 99).await,
            Err(TempleError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.donor_list(&user).await,
            Err(TempleError::Unauthorized(_))
        ));

        let pending = svc.list_pending(&admin()).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(svc.get_account(&admin()).await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn regenerate_returns_stored_receipt_even_when_cancelled() {
        let svc = service(0);
        let payment = svc.submit(&Caller::guest(), details(700)).await.unwrap();
        let issued = svc.approve(&admin(), payment.id).await.unwrap();
        svc.cancel(&admin(), issued.receipt_number).await.unwrap();

        let again = svc.regenerate(&admin(), issued.receipt_number).await.unwrap();
        assert_eq!(again.receipt_number, issued.receipt_number);
        assert_eq!(again.amount, issued.amount);
        assert!(again.is_cancelled);

        let err = svc.cancel(&admin(), issued.receipt_number).await.unwrap_err();
        assert!(matches!(err, TempleError::InvalidState(_)));
    }

    #[tokio::test]
    async fn missing_receipt_on_regenerate_is_counted_as_regenerate() {
        let svc = service(0);
        let counter = ERRORS_TOTAL.with_label_values(&["regenerate_receipt", "not_found"]);
        let before = counter.get();

        let err = svc.regenerate(&admin(), 404).await.unwrap_err();
        assert!(matches!(err, TempleError::NotFound(_)));
        assert!(counter.get() >= before + 1.0);
    }

    #[tokio::test]
    async fn adjust_balance_overrides_unconditionally() {
        let svc = service(100);
        let before = svc.get_account(&admin()).await.unwrap();

        let account = svc.adjust_balance(&admin(), -40).await.unwrap();
        assert_eq!(account.balance, -40);
        assert!(account.last_updated >= before.last_updated);
    }
}
