//! Kernel utilities shared across feature slices: layered config loading, the
//! application state handed to every handler, and the system routes.
//!
//! ```rust,no_run
//! use fare_kernel::config::load_config;
//! use fare_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! assert_eq!(cfg.server.port, 8000);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use fare_domain as domain;
