//! The download engine.
//!
//! This module ties the other parts of the crate together:
//!
//! - [`config`] - [`TransferConfig`] and the [`Retries`] budget
//! - [`builder`] - [`TransferBuilder`] for configuring a transfer
//! - [`transfer`] - [`Transfer`] and its retry loop
//! - [`status`] - classification of response status codes
//! - [`guard`] - removal of incomplete files on failure
//!
//! A call to [`Transfer::download`] repeats attempts until the file is
//! complete, a failure is final or the retry budget runs out. Between
//! attempts it sleeps one second per failed attempt so far. Partial files
//! are resumed with `Range` requests.

pub mod builder;
pub mod config;
pub mod guard;
pub mod status;
#[allow(clippy::module_inception)]
pub mod transfer;

pub use builder::TransferBuilder;
pub use config::{Retries, TransferConfig, DEFAULT_CHUNK_SIZE};
pub use guard::IncompleteGuard;
pub use status::ResponseClass;
pub use transfer::Transfer;
