pub mod health;
pub mod link;

pub use health::{health_check, service_status, HealthResponse, StatusResponse};
pub use link::{generate_short_code, redirect, GenerateRequest, GenerateResponse};
