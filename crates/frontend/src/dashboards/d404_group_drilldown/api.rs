use contracts::dashboards::d404_group_drilldown::{DrilldownResponse, LevelRequest, RootRequest};
use gloo_net::http::Request;
use serde::Serialize;

use crate::shared::api_utils::api_url;

const API_BASE: &str = "/api/d404";

/// Корневой уровень: группы клиентов
pub async fn fetch_root(request: &RootRequest) -> Result<DrilldownResponse, String> {
    post_json(&format!("{}/root", API_BASE), request).await
}

/// Дочерний уровень по пути выбранных ключей
pub async fn fetch_level(request: &LevelRequest) -> Result<DrilldownResponse, String> {
    post_json(&format!("{}/level", API_BASE), request).await
}

async fn post_json<B: Serialize>(path: &str, body: &B) -> Result<DrilldownResponse, String> {
    let response = Request::post(&api_url(path))
        .json(body)
        .map_err(|e| format!("Failed to encode request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json::<DrilldownResponse>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
