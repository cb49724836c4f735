//! Email verification HTTP handlers.

pub mod send;
pub mod verify;

pub use send::{EMAIL_VERIFY_SEND_PATH, EmailVerifySendResponse, email_verify_send_routes};
pub use verify::{EMAIL_VERIFY_PATH, email_verify_routes};
