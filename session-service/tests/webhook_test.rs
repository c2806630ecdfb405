mod common;

use common::{api_key, bearer, register, setup, POLKA_KEY};
use session_service::{
    dtos::WebhookOutcome,
    services::{ServiceError, UserStore},
};
use uuid::Uuid;

fn upgrade_body(user_id: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": "user.upgraded",
        "data": { "user_id": user_id }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_upgrade_event_marks_user_privileged() {
    let ctx = setup();
    let user = register(&ctx, "walt@breakingbad.com").await;

    let outcome = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), &upgrade_body(&user.id.to_string()))
        .await
        .expect("Webhook failed");

    assert_eq!(outcome, WebhookOutcome::Upgraded(user.id));
    let stored = ctx.store.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.privileged);
    assert_eq!(ctx.metrics.snapshot().upgrades, 1);
}

#[tokio::test]
async fn test_other_events_are_ignored() {
    let ctx = setup();
    let user = register(&ctx, "walt@breakingbad.com").await;
    let body = serde_json::to_vec(&serde_json::json!({
        "event": "user.payment_failed",
        "data": { "user_id": user.id.to_string() }
    }))
    .unwrap();

    let outcome = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), &body)
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Ignored);
    let stored = ctx.store.find_by_id(user.id).await.unwrap().unwrap();
    assert!(!stored.privileged);
}

#[tokio::test]
async fn test_non_upgrade_event_without_data_is_ignored() {
    let ctx = setup();

    let outcome = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), br#"{"event":"user.downgraded"}"#)
        .await
        .expect("Event without data should be acknowledged");

    assert_eq!(outcome, WebhookOutcome::Ignored);
    assert_eq!(ctx.metrics.snapshot().upgrades, 0);
}

#[tokio::test]
async fn test_upgrade_without_user_id_is_a_validation_error() {
    let ctx = setup();

    let err = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), br#"{"event":"user.upgraded"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_wrong_key_is_unauthorized() {
    let ctx = setup();
    let user = register(&ctx, "walt@breakingbad.com").await;

    let err = ctx
        .service
        .handle_billing_webhook(&api_key("not-the-key"), &upgrade_body(&user.id.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Unauthorized));
    let stored = ctx.store.find_by_id(user.id).await.unwrap().unwrap();
    assert!(!stored.privileged);
}

#[tokio::test]
async fn test_missing_or_misformatted_key() {
    let ctx = setup();
    let body = upgrade_body(&Uuid::new_v4().to_string());

    let missing = ctx
        .service
        .handle_billing_webhook(&http::HeaderMap::new(), &body)
        .await
        .unwrap_err();
    let wrong_scheme = ctx
        .service
        .handle_billing_webhook(&bearer(POLKA_KEY), &body)
        .await
        .unwrap_err();

    assert!(matches!(missing, ServiceError::CredentialMissing));
    assert!(matches!(wrong_scheme, ServiceError::CredentialMalformed));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let ctx = setup();

    let err = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), &upgrade_body(&Uuid::new_v4().to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound));
}

#[tokio::test]
async fn test_bad_bodies_are_validation_errors() {
    let ctx = setup();

    let not_json = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), b"{not json")
        .await
        .unwrap_err();
    let bad_id = ctx
        .service
        .handle_billing_webhook(&api_key(POLKA_KEY), &upgrade_body("not-a-uuid"))
        .await
        .unwrap_err();

    assert!(matches!(not_json, ServiceError::Validation(_)));
    assert!(matches!(bad_id, ServiceError::Validation(_)));
}

#[test]
fn test_validate_api_key_on_service() {
    let ctx = setup();

    assert!(ctx.service.validate_api_key(POLKA_KEY).is_ok());
    assert!(matches!(
        ctx.service.validate_api_key(""),
        Err(ServiceError::Unauthorized)
    ));
}
