mod common;

use common::TestApp;
use reqwest::Method;
use serde_json::Value;

#[tokio::test]
async fn cancellation_leaves_balance_but_drops_from_report() {
    let app = TestApp::spawn().await;
    let start = app.balance().await;

    let id = app.submit_payment("A", 500, "T1").await;
    assert_eq!(id, 1);

    let receipt: Value = app.approve(id).await.json().await.unwrap();
    assert_eq!(receipt["receiptNumber"], 1);
    assert_eq!(receipt["amount"], 500);
    assert_eq!(receipt["isCancelled"], false);
    assert_eq!(app.balance().await, start + 500);
    assert_eq!(app.report().await, (500, 1));

    let response = app
        .admin(Method::POST, "/receipts/1/cancel")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let cancelled: Value = response.json().await.unwrap();
    assert_eq!(cancelled["isCancelled"], true);

    assert_eq!(app.report().await, (0, 0));
    assert_eq!(app.balance().await, start + 500);
}

#[tokio::test]
async fn cancelling_twice_conflicts() {
    let app = TestApp::spawn().await;
    let id = app.submit_payment("A", 500, "T1").await;
    app.approve(id).await;

    let first = app
        .admin(Method::POST, "/receipts/1/cancel")
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = app
        .admin(Method::POST, "/receipts/1/cancel")
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    let unknown = app
        .admin(Method::POST, "/receipts/9/cancel")
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
async fn regenerate_returns_the_same_receipt() {
    let app = TestApp::spawn().await;
    let id = app.submit_payment("A", 300, "T1").await;
    let issued: Value = app.approve(id).await.json().await.unwrap();

    let again: Value = app
        .admin(Method::POST, "/receipts/1/regenerate")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again, issued);

    app.admin(Method::POST, "/receipts/1/cancel")
        .send()
        .await
        .unwrap();
    let response = app
        .admin(Method::POST, "/receipts/1/regenerate")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let regenerated: Value = response.json().await.unwrap();
    assert_eq!(regenerated["receiptNumber"], 1);
    assert_eq!(regenerated["isCancelled"], true);

    let missing = app
        .admin(Method::POST, "/receipts/5/regenerate")
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn receipt_numbers_are_not_reused_after_cancellation() {
    let app = TestApp::spawn().await;
    let first = app.submit_payment("A", 100, "T1").await;
    app.approve(first).await;
    app.admin(Method::POST, "/receipts/1/cancel")
        .send()
        .await
        .unwrap();

    let second = app.submit_payment("B", 200, "T2").await;
    let receipt: Value = app.approve(second).await.json().await.unwrap();
    assert_eq!(receipt["receiptNumber"], 2);
}

#[tokio::test]
async fn donor_list_shows_valid_receipts_in_order() {
    let app = TestApp::spawn().await;
    for (donor, amount, txn) in [("A", 100, "T1"), ("B", 200, "T2"), ("C", 300, "T3")] {
        let id = app.submit_payment(donor, amount, txn).await;
        app.approve(id).await;
    }
    app.admin(Method::POST, "/receipts/2/cancel")
        .send()
        .await
        .unwrap();

    let donors: Vec<Value> = app
        .admin(Method::GET, "/reports/donors")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = donors
        .iter()
        .map(|d| d["donorName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(donors[1]["amount"], 300);
    assert_eq!(donors[1]["paymentMode"], "upi");
    assert_eq!(donors[1]["transactionId"], "T3");
    assert_eq!(donors[0]["date"], common::TEST_DATE_NANOS);

    assert_eq!(app.report().await, (400, 2));
}

#[tokio::test]
async fn admin_balance_adjustment_overrides_ledger() {
    let app = TestApp::spawn_with_balance(100).await;
    let id = app.submit_payment("A", 50, "T1").await;
    app.approve(id).await;

    let response = app
        .admin(Method::PUT, "/account/balance")
        .json(&serde_json::json!({ "newBalance": 20 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let account: Value = response.json().await.unwrap();
    assert_eq!(account["balance"], 20);
    assert!(account["lastUpdated"].is_i64());

    assert_eq!(app.balance().await, 20);
    assert_eq!(app.report().await, (50, 1));
}
