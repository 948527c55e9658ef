//! OpenAPI document for the admin gate API.

use utoipa::OpenApi;

use super::handlers::admin::types::{LogoutResponse, SetupResponse, SyncResponse, WhoamiResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "portiere",
        description = "Admin identity verification and privilege synchronization"
    ),
    paths(
        crate::portiere::handlers::health::health,
        crate::portiere::handlers::admin::session::sync_session,
        crate::portiere::handlers::admin::session::logout,
        crate::portiere::handlers::admin::setup::setup,
        crate::portiere::handlers::admin::whoami::whoami,
    ),
    components(schemas(LogoutResponse, SetupResponse, SyncResponse, WhoamiResponse)),
    tags(
        (name = "admin", description = "Admin session and claim synchronization"),
        (name = "portiere", description = "Service endpoints")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
