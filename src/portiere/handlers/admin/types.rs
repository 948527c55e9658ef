//! Request/response types for admin endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub ok: bool,
    pub role: Option<String>,
    pub claims_updated: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SetupResponse {
    pub ok: bool,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct WhoamiResponse {
    pub uid: String,
    pub email: Option<String>,
    pub role: Option<String>,
}
