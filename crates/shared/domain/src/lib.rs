//! # Domain
//!
//! Plain data shared by every crate: the configuration schema and a few
//! constants. Only `serde` is allowed here; no I/O and no logic beyond defaults.

pub mod config;
pub mod constants;
