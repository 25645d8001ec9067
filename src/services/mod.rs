//! HTTP front end for the rig.
//!
//! All handlers share one [`Rig`](crate::Rig) through `Arc`. Requests are
//! decoded and range-checked here; only validated commands reach the core.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rigctl::services::{run_server, WebServerConfig};
//!
//! let rig = Arc::new(Rig::from_config(&config.hardware));
//! run_server(rig, WebServerConfig::from_config(&config.web)).await?;
//! ```

pub mod api;
pub mod system;
pub mod web;

pub use api::*;
pub use system::{commit_hash, parse_commit_hash, update, GitError};
pub use web::*;
