use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;

/// Health payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthInfo {
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> ApiResponse<HealthInfo> {
    ApiResponse::ok(
        "OK",
        HealthInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}
