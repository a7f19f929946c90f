#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod portal_service;
pub mod telemetry;

pub use lms_core::Clock;

pub use app_services::AppServices;
pub use config::PortalConfig;
pub use error::{AppServicesError, PortalError};
pub use portal_service::{FileSelection, PortalService};
pub use telemetry::init_tracing;
