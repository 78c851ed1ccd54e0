//! Use cases spanning several collaborators

pub mod health_check;

pub use health_check::HealthCheckUseCase;
