#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use courtqueue::CourtId;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Sends a request through the full router and returns status and JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn join(&self, court_id: CourtId, name: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/courts/{}/queue", court_id),
            Some(serde_json::json!({ "name": name })),
        )
        .await
    }

    pub async fn start(&self, court_id: CourtId) -> (StatusCode, Value) {
        self.send("POST", &format!("/courts/{}/match/start", court_id), None)
            .await
    }

    pub async fn end(&self, court_id: CourtId, winner: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/courts/{}/match/end", court_id),
            Some(serde_json::json!({ "winner": winner })),
        )
        .await
    }

    pub async fn undo(&self, court_id: CourtId) -> (StatusCode, Value) {
        self.send("POST", &format!("/courts/{}/undo", court_id), None)
            .await
    }

    pub async fn court_state(&self, court_id: CourtId) -> Value {
        let (status, json) = self.send("GET", &format!("/courts/{}", court_id), None).await;
        assert_eq!(status, StatusCode::OK, "court {} should exist", court_id);
        json
    }
}
