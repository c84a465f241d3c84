pub mod newsletters; // Public for OpenAPI annotations
pub mod users; // Public for OpenAPI annotations

pub use newsletters::*;
pub use users::*;
