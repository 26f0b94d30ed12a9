//! HTTP surface: routes served on an ephemeral port.

use async_trait::async_trait;
use pharm_module_matching::api;
use pharm_module_matching::db::MatchingSource;
use pharm_module_matching::models::{BonusSku, MatchResult, Nomenclature};
use pharm_module_matching::service::{DictionaryModel, ModuleMatchingService, TrailMatcher};
use pharm_module_matching::storage::ResultSink;
use pharm_module_matching::{MatchingError, MatchingResult};
use serde_json::{json, Value};
use std::sync::Arc;

struct NoBonusSource;

#[async_trait]
impl MatchingSource for NoBonusSource {
    async fn fetch(&self, _: &str, _: f64) -> MatchingResult<(Vec<BonusSku>, Vec<Nomenclature>)> {
        Err(MatchingError::NoBonus)
    }
}

struct NullSink;

#[async_trait]
impl ResultSink for NullSink {
    async fn upload(&self, endpoint: &str, _: &[MatchResult]) -> MatchingResult<String> {
        Ok(format!("mem://{}", endpoint))
    }
}

async fn serve() -> String {
    let service = Arc::new(ModuleMatchingService::new(
        Arc::new(NoBonusSource),
        Arc::new(NullSink),
        Arc::new(TrailMatcher),
        DictionaryModel::factory(None),
        0.3,
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(service)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_returns_ok() {
    let base = serve().await;
    let body = reqwest::get(format!("{}/health", base)).await.unwrap().text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn matching_sentinels_are_reported_in_body() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/module-matching", base))
        .json(&json!({"endpoint": "not-a-uuid"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["url"], "error: endpoint must be uuid");
    assert_eq!(body["message"], "error: endpoint must be uuid");

    let body: Value = client
        .post(format!("{}/api/module-matching", base))
        .json(&json!({"endpoint": "5834b933-fd63-4682-b68a-fdda63fd68b8", "bonus_percent": 0.4}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["url"], "error: no bonus");
    assert!(body["stats"].is_null());
}

#[tokio::test]
async fn statistics_endpoint_computes_report() {
    let base = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/module-matching/statistics", base))
        .json(&json!({
            "endpoint": "test",
            "results": [
                {"id": "0", "m_group": "90000", "ph_group": "0", "y": "000", "bonus": "100.5"},
                {"id": "1", "m_group": "90000", "ph_group": "1", "y": null, "bonus": null},
                {"id": "2", "m_group": "1", "ph_group": "2", "y": null, "bonus": null},
                {"id": "3", "m_group": "1", "ph_group": "3", "y": null, "bonus": null},
                {"id": "4", "m_group": "2", "ph_group": null, "y": "001", "bonus": "50.4"}
            ],
            "catalog": [
                {"id": "000", "bonus": "100.5"},
                {"id": "001", "bonus": "50.4"},
                {"id": "002", "bonus": "20.3"}
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["endpoint"], "test");
    assert_eq!(body["n_nom"], 5);
    assert_eq!(body["n_bon"], 3);
    assert_eq!(body["n_mg_nom"], 2);
    assert_eq!(body["n_phg_nom"], 4);
    assert_eq!(body["n_bon+"], 1);
    assert_eq!(body["n_bon-"], 1);
    assert_eq!(body["n_bon-gr"], 1);
    assert_eq!(body["s_bon"], json!(171.2));
    assert_eq!(body["s_bon+"], json!(100.5));
    assert_eq!(body["s_bon-"], json!(20.3));
    assert_eq!(body["s_bon-gr"], json!(50.4));
}

#[tokio::test]
async fn statistics_without_bonus_is_unprocessable() {
    let base = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/module-matching/statistics", base))
        .json(&json!({"endpoint": "test", "results": [], "catalog": [{"id": "000"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn statistics_with_duplicate_catalog_ids_is_unprocessable() {
    let base = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/module-matching/statistics", base))
        .json(&json!({
            "endpoint": "test",
            "results": [{"id": "0", "m_group": "1", "ph_group": null, "y": "000", "bonus": "1"}],
            "catalog": [{"id": "000", "bonus": "1"}, {"id": "000", "bonus": "1"}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("duplicate id"));
}
