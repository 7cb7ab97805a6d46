//! # BullyGuard Core
//!
//! Service plumbing for the BullyGuard model-comparison service.
//! Provides layered configuration and the HTTP gateway that exposes the
//! comparison orchestrator from `bullyguard-ml`.

pub mod config;
pub mod gateway;

// Re-export commonly used types at the crate root.
pub use config::{AppConfig, ConfigOverrides, config_exists, load_config};
pub use gateway::{ApiError, AppState, GatewayConfig, gateway_router, run_gateway};
