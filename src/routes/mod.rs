pub mod admin; // Public for OpenAPI annotations
mod api_error;
pub mod auth; // Public for OpenAPI annotations
pub mod constants;
pub mod health_check; // Public for OpenAPI annotations
pub mod newsletters; // Public for OpenAPI annotations
pub mod subscribers; // Public for OpenAPI annotations
pub mod uploads; // Public for OpenAPI annotations

pub use admin::*;
pub use api_error::{ApiError, AppJson};
pub use auth::*;
pub use health_check::*;
pub use newsletters::*;
pub use subscribers::*;
pub use uploads::*;

use serde::Serialize;
use uuid::Uuid;

/// Body returned by every delete-by-id endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: Uuid,
}

impl DeleteResponse {
    pub fn new(id: Uuid) -> Self {
        Self { success: true, id }
    }
}
