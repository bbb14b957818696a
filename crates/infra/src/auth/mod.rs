pub mod jwt;
pub mod password;

pub use jwt::{issue_token, verify_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
