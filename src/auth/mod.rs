pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::SessionContext;
pub use password::Argon2Hasher;
pub use token::{generate_session_token, verify_session_token};
