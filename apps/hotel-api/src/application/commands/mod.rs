pub mod entities;
pub mod sessions;

pub use entities::{create_entity, delete_entity, invalidate_stats, update_entity};
pub use sessions::{
    LoginRequest, LoginResponse, PasswordRequest, handle_login, handle_logout, handle_set_password,
};
