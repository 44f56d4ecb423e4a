mod common;

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Extension, extract::Query};
use common::*;
use spotauth::{
    api::{CallbackState, callback, health},
    error::AuthError,
    spotify::auth::wait_for_sign_in,
    types::SignInOutcome,
};
use tokio::sync::Mutex;

fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn callback_exchanges_code_and_reports_success() {
    let h = harness(ScriptedEndpoint::open(), None).await;
    h.endpoint.push(Ok(token_response("access-1", Some("refresh-1"))));
    let outcome = Arc::new(Mutex::new(None));
    let state = CallbackState::new(h.authority.clone(), outcome.clone());

    let page = callback(query(&[("code", "code-1")]), Extension(state)).await;

    assert!(page.0.contains("successful"));
    assert_eq!(*outcome.lock().await, Some(SignInOutcome::Succeeded));
    assert!(h.authority.is_signed_in().await);
}

#[tokio::test]
async fn callback_reports_failed_exchange() {
    let h = harness(ScriptedEndpoint::open(), None).await;
    h.endpoint.push(Err(AuthError::Rejected {
        status: 400,
        body: "invalid_grant".to_string(),
    }));
    let outcome = Arc::new(Mutex::new(None));
    let state = CallbackState::new(h.authority.clone(), outcome.clone());

    let page = callback(query(&[("code", "expired")]), Extension(state)).await;

    assert!(page.0.contains("failed"));
    assert!(matches!(*outcome.lock().await, Some(SignInOutcome::Failed(_))));
    assert!(!h.authority.is_signed_in().await);
}

#[tokio::test]
async fn callback_reports_denied_authorization() {
    let h = harness(ScriptedEndpoint::open(), None).await;
    let outcome = Arc::new(Mutex::new(None));
    let state = CallbackState::new(h.authority.clone(), outcome.clone());

    callback(query(&[("error", "access_denied")]), Extension(state)).await;

    assert_eq!(
        *outcome.lock().await,
        Some(SignInOutcome::Failed(
            "authorization denied: access_denied".to_string()
        ))
    );
    assert_eq!(h.endpoint.calls(), 0);
}

#[tokio::test]
async fn callback_without_code_leaves_outcome_open() {
    let h = harness(ScriptedEndpoint::open(), None).await;
    let outcome = Arc::new(Mutex::new(None));
    let state = CallbackState::new(h.authority.clone(), outcome.clone());

    callback(query(&[]), Extension(state)).await;

    assert_eq!(*outcome.lock().await, None);
}

#[tokio::test]
async fn wait_for_sign_in_returns_recorded_outcome() {
    let outcome = Arc::new(Mutex::new(Some(SignInOutcome::Succeeded)));

    let result = wait_for_sign_in(outcome, Duration::from_secs(5)).await;
    assert_eq!(result, Some(SignInOutcome::Succeeded));
}

#[tokio::test]
async fn wait_for_sign_in_gives_up() {
    let outcome = Arc::new(Mutex::new(None));

    let result = wait_for_sign_in(outcome, Duration::from_millis(300)).await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn health_reports_ok() {
    let body = health().await.0;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "spotauth");
    assert_eq!(body["service"], "spotauth-callback");
}
