//! End-to-end method semantics and the HTTP status contract.

mod common;

use std::time::Duration;

use serde_json::{Value, json};
use uuid::Uuid;

use common::{http_call, start, start_with_http_limit};

async fn ok_result(gateway: &common::Gateway, body: Value) -> Value {
    let (status, body) = http_call(gateway, &body).await;
    assert_eq!(status, 200, "unexpected failure: {body}");
    body["result"].clone()
}

#[tokio::test(flavor = "multi_thread")]
async fn full_graph_lifecycle_over_http() {
    let gateway = start().await;

    let tenant = ok_result(
        &gateway,
        json!({"method": "tenant/create", "args": {"name": "acme"}}),
    )
    .await;
    let graph = ok_result(
        &gateway,
        json!({"method": "graph/create", "args": {"tenant_id": tenant["id"], "name": "social"}}),
    )
    .await;

    let alice = ok_result(
        &gateway,
        json!({"method": "node/create", "args": {
            "graph_id": graph["id"], "name": "alice",
            "labels": ["person"], "data": {"age": 34}
        }}),
    )
    .await;
    let bob = ok_result(
        &gateway,
        json!({"method": "node/create", "args": {"graph_id": graph["id"], "name": "bob"}}),
    )
    .await;
    ok_result(
        &gateway,
        json!({"method": "edge/create", "args": {
            "from": alice["id"], "to": bob["id"], "label": "knows"
        }}),
    )
    .await;

    let neighbors = ok_result(
        &gateway,
        json!({"method": "node/traverse", "args": {"id": alice["id"], "direction": "out"}}),
    )
    .await;
    assert_eq!(neighbors.as_array().unwrap().len(), 1);
    assert_eq!(neighbors[0]["name"], "bob");

    let edges = ok_result(
        &gateway,
        json!({"method": "edge/search", "args": {"graph_id": graph["id"], "label": "knows"}}),
    )
    .await;
    assert_eq!(edges.as_array().unwrap().len(), 1);

    let stats = ok_result(&gateway, json!({"method": "admin/stats", "args": {}})).await;
    assert_eq!(stats["nodes"], 2);
    assert_eq!(stats["edges"], 1);

    // Deleting the tenant cascades everything.
    ok_result(
        &gateway,
        json!({"method": "tenant/delete", "args": {"id": tenant["id"]}}),
    )
    .await;
    let stats = ok_result(&gateway, json!({"method": "admin/stats", "args": {}})).await;
    assert_eq!(stats["nodes"], 0);
    assert_eq!(stats["tenants"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn vector_search_over_http() {
    let gateway = start().await;

    let tenant = ok_result(
        &gateway,
        json!({"method": "tenant/create", "args": {"name": "t"}}),
    )
    .await;
    let graph = ok_result(
        &gateway,
        json!({"method": "graph/create", "args": {"tenant_id": tenant["id"], "name": "g"}}),
    )
    .await;
    let node = ok_result(
        &gateway,
        json!({"method": "node/create", "args": {"graph_id": graph["id"], "name": "doc"}}),
    )
    .await;
    ok_result(
        &gateway,
        json!({"method": "vector/upsert", "args": {
            "node_id": node["id"], "embedding": [0.9, 0.1, 0.0]
        }}),
    )
    .await;

    let hits = ok_result(
        &gateway,
        json!({"method": "vector/search", "args": {
            "graph_id": graph["id"], "query": [1.0, 0.0, 0.0], "top_k": 3
        }}),
    )
    .await;
    assert_eq!(hits[0]["node_id"], node["id"]);
    assert!(hits[0]["score"].as_f64().unwrap() > 0.9);
}

#[tokio::test(flavor = "multi_thread")]
async fn status_mapping_matches_error_kinds() {
    let gateway = start().await;

    // 400: handler-level argument validation.
    let (status, body) = http_call(
        &gateway,
        &json!({"method": "tenant/create", "args": {}}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["kind"], "invalid_arguments");

    // 400: envelope-level validation.
    let (status, body) = http_call(&gateway, &json!({"args": {}})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["kind"], "invalid_request");

    // 404: missing downstream entity.
    let (status, body) = http_call(
        &gateway,
        &json!({"method": "tenant/read", "args": {"id": Uuid::new_v4().to_string()}}),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["kind"], "not_found");

    // 409: duplicate create.
    http_call(
        &gateway,
        &json!({"method": "tenant/create", "args": {"name": "dup"}}),
    )
    .await;
    let (status, body) = http_call(
        &gateway,
        &json!({"method": "tenant/create", "args": {"name": "dup"}}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["kind"], "conflict");
}

#[tokio::test(flavor = "multi_thread")]
async fn saturated_pool_sheds_with_unavailable() {
    let gateway = start_with_http_limit(1, |registry| {
        registry
            .register("slow/sleep", |_args| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(800)).await;
                    Ok(Value::String("done".to_string()))
                })
            })
            .unwrap();
    })
    .await;

    // Occupy the single permit with a slow call.
    let url = gateway.http_url("/rpc/v1");
    let slow = tokio::spawn(async move {
        reqwest::Client::new()
            .post(url)
            .json(&json!({"method": "slow/sleep"}))
            .send()
            .await
            .unwrap()
            .status()
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    // A concurrent call is shed, not queued.
    let (status, body) = http_call(&gateway, &json!({"method": "echo/ping"})).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["kind"], "unavailable");

    // The occupant itself completes normally and releases the permit.
    assert_eq!(slow.await.unwrap(), 200);
    let (status, _) = http_call(&gateway, &json!({"method": "echo/ping"})).await;
    assert_eq!(status, 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn exists_is_boolean_and_idempotent() {
    let gateway = start().await;
    let missing = Uuid::new_v4().to_string();
    let request = json!({"method": "node/exists", "args": {"id": missing}});

    let (status, first) = http_call(&gateway, &request).await;
    assert_eq!(status, 200);
    assert_eq!(first["result"], false);

    let (_, second) = http_call(&gateway, &request).await;
    assert_eq!(first["result"], second["result"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_guid_names_the_offending_key() {
    let gateway = start().await;
    let (status, body) = http_call(
        &gateway,
        &json!({"method": "graph/create", "args": {"tenant_id": "not-a-guid", "name": "g"}}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["kind"], "invalid_arguments");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("'tenant_id'")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn backup_reflects_engine_contents() {
    let gateway = start().await;
    ok_result(
        &gateway,
        json!({"method": "tenant/create", "args": {"name": "t"}}),
    )
    .await;

    let dump = ok_result(&gateway, json!({"method": "admin/backup", "args": {}})).await;
    assert_eq!(dump["tenants"].as_array().unwrap().len(), 1);
    assert_eq!(dump["tenants"][0]["name"], "t");
}
