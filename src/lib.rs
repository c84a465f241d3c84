pub mod adapters;
pub mod api_doc;
pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod image_host;
pub mod repositories;
pub mod retry;
pub mod routes;
pub mod startup;
pub mod telemetry;
