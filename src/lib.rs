//! warden: session and request-authorization layer for an administrator-only client.
//!
//! - `identity`: credential decoding, persisted slots, and the session state machine.
//! - `transport`: credential-injecting HTTP pipeline and the pre-login client.
//! - `routing`: navigation, route table, and the guard for privileged views.
//! - `workflows`: login and logout orchestration.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod routing;
pub mod transport;
pub mod workflows;

pub use app::AdminApp;
pub use config::ClientConfig;
pub use error::{AuthError, AuthResult};
