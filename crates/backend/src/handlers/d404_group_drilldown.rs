use axum::Json;
use contracts::dashboards::d404_group_drilldown::{DrilldownResponse, LevelRequest, RootRequest};

use crate::dashboards::d404_group_drilldown::resolver;

/// POST /api/d404/root
pub async fn get_root(Json(request): Json<RootRequest>) -> Json<DrilldownResponse> {
    tracing::info!(
        "D404 Drilldown: root request (predefined groups only: {}, active filters: {})",
        request.predefined_groups_only,
        request.filters.active_count()
    );

    let Some(resolver) = resolver::get_resolver() else {
        tracing::error!("D404 Drilldown: level resolver is not initialized");
        return Json(DrilldownResponse::transport_error(
            "Aggregation resolver is not initialized",
        ));
    };

    let response = resolver.resolve_root(&request).await;
    log_outcome("root", &response);
    Json(response)
}

/// POST /api/d404/level
pub async fn get_level(Json(request): Json<LevelRequest>) -> Json<DrilldownResponse> {
    tracing::info!(
        "D404 Drilldown: level {} request, parent path {:?}",
        request.level,
        request.parent_keys
    );

    let Some(resolver) = resolver::get_resolver() else {
        tracing::error!("D404 Drilldown: level resolver is not initialized");
        return Json(DrilldownResponse::transport_error(
            "Aggregation resolver is not initialized",
        ));
    };

    let response = resolver.resolve_level(&request).await;
    log_outcome(&format!("level {}", request.level), &response);
    Json(response)
}

fn log_outcome(target: &str, response: &DrilldownResponse) {
    match response {
        DrilldownResponse::Ok { rows } => {
            tracing::info!("D404 Drilldown: {} -> {} rows", target, rows.len())
        }
        DrilldownResponse::Empty => tracing::info!("D404 Drilldown: {} -> empty", target),
        DrilldownResponse::Error { kind, message } => {
            tracing::warn!("D404 Drilldown: {} -> {:?} error: {}", target, kind, message)
        }
    }
}
