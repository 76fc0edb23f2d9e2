//! 생존 확인 endpoint.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub response: String,
}

/// GET /api/v1/ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        response: "pong".to_string(),
    })
}

/// 생존 확인 라우터 생성.
pub fn ping_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(ping))
}
