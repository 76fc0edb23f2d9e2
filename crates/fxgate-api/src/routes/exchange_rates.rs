//! 환율 수집 endpoint.
//!
//! `POST /api/v1/exchange-rates/refresh`: 인증된 사용자를 수집 주체로 1회 수집합니다.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use fxgate_core::ExchangeRatesRecord;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// 환율 즉시 수집.
///
/// POST /api/v1/exchange-rates/refresh
pub async fn refresh_rates(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ExchangeRatesRecord>> {
    let record = state.exchange_rates.run(user.id).await?;
    Ok(Json(record))
}

/// 환율 라우터 생성.
pub fn exchange_rates_router() -> Router<Arc<AppState>> {
    Router::new().route("/refresh", post(refresh_rates))
}
