mod helpers;
mod middleware;
mod password;
mod token;

pub use helpers::extract_bearer_token;
pub use middleware::{AuthError, RequireAdmin, RequireOwner, RequireUser, authorize};
pub use password::{PasswordService, RawPassword};
pub use token::{Claims, TOKEN_TTL, TokenService, generate_secret};
