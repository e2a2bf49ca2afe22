//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/YAML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into a frozen routing table by the HTTP server
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server builds a new table and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, AuthSourceConfig, AuthSourceKind, CredentialConfig, GatewayConfig, HeaderConfig,
    ListenerConfig, LogFormat, ObservabilityConfig, RouteConfig, SecurityConfig, TargetConfig,
    TargetKind, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError, MAX_WEIGHT};
pub use watcher::ConfigWatcher;
