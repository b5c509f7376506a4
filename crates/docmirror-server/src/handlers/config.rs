//! Configuration API endpoint.
//!
//! Returns client-side configuration for the built-in page.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// URL path of the mirrored document.
    document_route: String,
    /// Whether live reload is enabled.
    live_reload_enabled: bool,
    /// Event name announcing a document change.
    event: String,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        document_route: state.document_route.clone(),
        live_reload_enabled: state.live_reload_enabled(),
        event: state.event.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_response_serialization() {
        let response = ConfigResponse {
            document_route: "/README.md".to_owned(),
            live_reload_enabled: true,
            event: "readme-update".to_owned(),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["documentRoute"], "/README.md");
        assert_eq!(json["liveReloadEnabled"], true);
        assert_eq!(json["event"], "readme-update");
    }
}
