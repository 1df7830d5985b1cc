pub mod auth;

pub use auth::{Session, SessionToken, session_auth, session_key};
