//! Read-only projections over the receipt registry.
//!
//! Cancelled receipts are excluded here even though their amounts stay in
//! the account balance.

use crate::models::{DonationReport, DonorDetail, Receipt};

/// Totals over receipts that are not cancelled.
pub fn donation_report(receipts: &[Receipt]) -> DonationReport {
    receipts
        .iter()
        .filter(|r| !r.is_cancelled)
        .fold(DonationReport::default(), |mut report, receipt| {
            report.total_amount += i128::from(receipt.amount);
            report.total_collections += 1;
            report
        })
}

/// One row per non-cancelled receipt, in the order given.
pub fn donor_list(receipts: &[Receipt]) -> Vec<DonorDetail> {
    receipts
        .iter()
        .filter(|r| !r.is_cancelled)
        .map(Receipt::donor_detail)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentConfirmation, PaymentDetails, PaymentMode, ReceiptIssuer};
    use chrono::Utc;

    fn receipt(number: i64, amount: i64, cancelled: bool) -> Receipt {
        let payment = PaymentConfirmation::pending(
            number,
            PaymentDetails {
                donor_name: format!("Donor {}", number),
                mobile_number: "9999999999".to_string(),
                amount_paid: amount,
                payment_mode: PaymentMode::Cash,
                transaction_id: format!("T{}", number),
                date: Utc::now(),
            },
        );
        let issuer = ReceiptIssuer {
            temple_name: "Temple".to_string(),
            location: "Village".to_string(),
            receiver: "Committee".to_string(),
        };
        let mut receipt = Receipt::issue(number, &payment, &issuer, Utc::now());
        receipt.is_cancelled = cancelled;
        receipt
    }

    #[test]
    fn empty_registry_reports_zero() {
        assert_eq!(donation_report(&[]), DonationReport::default());
        assert!(donor_list(&[]).is_empty());
    }

    #[test]
    fn cancelled_receipts_are_left_out() {
        let receipts = vec![
            receipt(1, 500, false),
            receipt(2, 300, true),
            receipt(3, 200, false),
        ];

        let report = donation_report(&receipts);
        assert_eq!(report.total_amount, 700);
        assert_eq!(report.total_collections, 2);

        let donors = donor_list(&receipts);
        let names: Vec<_> = donors.iter().map(|d| d.donor_name.as_str()).collect();
        assert_eq!(names, vec!["Donor 1", "Donor 3"]);
        assert_eq!(donors[1].transaction_id, "T3");
    }

    #[test]
    fn total_does_not_overflow_on_large_amounts() {
        let receipts = vec![receipt(1, i64::MAX, false), receipt(2, i64::MAX, false)];
        let report = donation_report(&receipts);
        assert_eq!(report.total_amount, 2 * i128::from(i64::MAX));
    }
}
