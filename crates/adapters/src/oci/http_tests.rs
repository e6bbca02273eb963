// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::oci::test_util::{endpoints, http, signature_header};
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn get_is_signed_and_decoded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/20160918/things/1")
        .match_header("authorization", signature_header())
        .match_header("date", Matcher::Regex(r"GMT$".into()))
        .with_status(200)
        .with_body(json!({ "id": "1" }).to_string())
        .create_async()
        .await;

    let url = endpoints(&server).core_url(&["things", "1"]).unwrap();
    let value: serde_json::Value = http().get(url).await.unwrap();

    assert_eq!(value["id"], "1");
    mock.assert_async().await;
}

#[tokio::test]
async fn post_carries_body_digest_and_retry_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/20160918/things")
        .match_header("x-content-sha256", Matcher::Any)
        .match_header("opc-retry-token", Matcher::Regex(r"^.{32}$".into()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({ "name": "a" })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let url = endpoints(&server).core_url(&["things"]).unwrap();
    let _: serde_json::Value =
        http().send_json(Method::POST, url, &json!({ "name": "a" })).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn transient_errors_are_retried_up_to_max_attempts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/20160918/busy")
        .with_status(503)
        .with_body(json!({ "code": "ServiceUnavailable", "message": "try later" }).to_string())
        .expect(3)
        .create_async()
        .await;

    let url = endpoints(&server).core_url(&["busy"]).unwrap();
    let err = http().get::<serde_json::Value>(url).await.unwrap_err();

    assert_eq!(
        err,
        AdapterError::Service {
            status: 503,
            code: "ServiceUnavailable".into(),
            message: "try later".into()
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/20160918/gone")
        .with_status(404)
        .with_body(json!({ "code": "NotAuthorizedOrNotFound", "message": "" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let url = endpoints(&server).core_url(&["gone"]).unwrap();
    let err = http().get::<serde_json::Value>(url).await.unwrap_err();

    assert_eq!(err, AdapterError::NotFound("NotAuthorizedOrNotFound".into()));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_json_error_body_still_maps_status() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/20160918/x").with_status(409).with_body("<html>").create_async().await;

    let url = endpoints(&server).core_url(&["x"]).unwrap();
    let err = http().get::<serde_json::Value>(url).await.unwrap_err();
    assert!(matches!(err, AdapterError::Conflict(_)));
}

#[tokio::test]
async fn list_all_follows_next_page() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/20160918/items")
        .match_query(Matcher::Exact("compartmentId=c".into()))
        .with_status(200)
        .with_header("opc-next-page", "p2")
        .with_body(json!([{ "id": "a" }, { "id": "b" }]).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/20160918/items")
        .match_query(Matcher::Exact("compartmentId=c&page=p2".into()))
        .with_status(200)
        .with_body(json!([{ "id": "c" }]).to_string())
        .create_async()
        .await;

    let mut url = endpoints(&server).core_url(&["items"]).unwrap();
    url.query_pairs_mut().append_pair("compartmentId", "c");
    let items: Vec<serde_json::Value> = http().list_all(url).await.unwrap();

    let ids: Vec<_> = items.iter().map(|i| i["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let url = Url::parse("http://127.0.0.1:1/20160918/x").unwrap();
    let err = http().get::<serde_json::Value>(url).await.unwrap_err();
    assert!(matches!(err, AdapterError::Transport(_)), "{err:?}");
}
