mod common;

use common::{payment_body, TestApp, TEST_USER};
use reqwest::Method;
use serde_json::{json, Value};

#[tokio::test]
async fn roles_resolve_from_principal_header() {
    let app = TestApp::spawn().await;

    let guest: Value = app
        .guest(Method::GET, "/me/role")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(guest["role"], "guest");

    let user: Value = app
        .as_principal(TEST_USER, Method::GET, "/me/role")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["role"], "user");

    let admin: Value = app
        .admin(Method::GET, "/me/is-admin")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(admin["isAdmin"], true);
}

#[tokio::test]
async fn admin_operations_reject_other_callers() {
    let app = TestApp::spawn().await;
    let id = app.submit_payment("A", 500, "T1").await;
    app.approve(id).await;
    let pending = app.submit_payment("B", 100, "T2").await;

    let admin_only = [
        (Method::GET, "/payments/pending".to_string()),
        (Method::POST, format!("/payments/{}/approve", pending)),
        (Method::POST, format!("/payments/{}/reject", pending)),
        (Method::GET, "/account".to_string()),
        (Method::POST, "/receipts/1/regenerate".to_string()),
        (Method::POST, "/receipts/1/cancel".to_string()),
        (Method::GET, "/reports/donors".to_string()),
    ];

    for (method, path) in admin_only {
        let as_guest = app.guest(method.clone(), &path).send().await.unwrap();
        assert_eq!(as_guest.status(), 401, "guest {} {}", method, path);

        let as_user = app
            .as_principal(TEST_USER, method.clone(), &path)
            .send()
            .await
            .unwrap();
        assert_eq!(as_user.status(), 401, "user {} {}", method, path);
    }

    let edit = app
        .as_principal(TEST_USER, Method::PUT, &format!("/payments/{}", pending))
        .json(&payment_body("B", 999, "T2"))
        .send()
        .await
        .unwrap();
    assert_eq!(edit.status(), 401);

    let adjust = app
        .as_principal(TEST_USER, Method::PUT, "/account/balance")
        .json(&json!({ "newBalance": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(adjust.status(), 401);

    assert_eq!(app.balance().await, 500);
    assert_eq!(app.report().await, (500, 1));
}

#[tokio::test]
async fn public_operations_allow_guests() {
    let app = TestApp::spawn().await;
    let id = app.submit_payment("A", 500, "T1").await;
    app.approve(id).await;

    let receipt = app.guest(Method::GET, "/receipts/1").send().await.unwrap();
    assert_eq!(receipt.status(), 200);

    let report = app
        .guest(Method::GET, "/reports/donations")
        .send()
        .await
        .unwrap();
    assert_eq!(report.status(), 200);
}

#[tokio::test]
async fn admin_can_promote_a_user() {
    let app = TestApp::spawn().await;

    let denied = app
        .as_principal(TEST_USER, Method::PUT, &format!("/roles/{}", TEST_USER))
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 401);

    let granted = app
        .admin(Method::PUT, &format!("/roles/{}", TEST_USER))
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(granted.status(), 204);

    let response = app
        .as_principal(TEST_USER, Method::GET, "/payments/pending")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let me: Value = app
        .admin(Method::GET, "/me/role")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
async fn non_admin_is_rejected_before_the_body_is_read() {
    let app = TestApp::spawn().await;
    let id = app.submit_payment("Ravi", 500, "TXN-BODY-1").await;
    let long_name = "x".repeat(300);

    let mut too_long = payment_body("Ravi", 500, "TXN-BODY-1");
    too_long["donorName"] = json!(&long_name);

    let cases = vec![
        (Method::PUT, format!("/payments/{}", id), too_long),
        (Method::PUT, format!("/payments/{}", id), json!({ "donorName": "A" })),
        (Method::POST, "/committee".to_string(), json!({ "name": &long_name })),
        (Method::PUT, "/account/balance".to_string(), json!({ "newBalance": "lots" })),
        (Method::POST, "/gallery".to_string(), json!({ "blobUrl": "not a url" })),
        (Method::PUT, format!("/roles/{}", TEST_USER), json!({ "role": "emperor" })),
    ];

    for (method, path, body) in cases {
        let as_guest = app
            .guest(method.clone(), &path)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(as_guest.status(), 401, "guest {} {}", method, path);

        let as_user = app
            .as_principal(TEST_USER, method.clone(), &path)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(as_user.status(), 401, "user {} {}", method, path);
    }

    // Nothing was changed by the rejected edits.
    let pending: Value = app
        .admin(Method::GET, "/payments/pending")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending[0]["donorName"], "Ravi");
}
