//! User-initiated login and logout.

mod login;
mod logout;

pub use login::{LoginData, LoginEnvelope, LoginRequest, LoginWorkflow};
pub use logout::LogoutWorkflow;
