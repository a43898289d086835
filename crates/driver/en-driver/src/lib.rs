//! Enclave engine driver
//!
//! Ties namespace construction and the search path together behind one
//! [`Engine`], loads [`EngineConfig`] from TOML, and installs logging.
//!
//! # Usage
//!
//! ```rust,ignore
//! use en_driver::{Engine, EngineConfig};
//! use en_namespace::Directive;
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let stats = engine.build_labeled("stats", [Directive::bind("mean", 0_i64)])?;
//! engine.use_global("stats", stats);
//! let mean = engine.resolve_global("mean")?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

pub use config::{EngineConfig, LoggingConfig, SearchPathConfig, VisibilityConfig};
pub use engine::Engine;
pub use error::{ConfigError, EngineError};
pub use logging::init_logging;
