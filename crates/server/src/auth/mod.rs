#![forbid(unsafe_code)]

mod jwt;
mod password;

pub use jwt::{AuthUser, Claims, TokenKeys, bearer_token, require_user};
pub use password::{PasswordError, hash_password, verify_password};
