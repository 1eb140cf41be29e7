pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::User;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

lazy_static! {
    // Display names: 4-11 alphanumeric characters, no separators
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9]{4,11}$").unwrap();
}

/// Registration passwords need a lowercase letter, an uppercase letter, a
/// digit, and a symbol. The minimum length is enforced separately.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| c.is_ascii_punctuation());

    if has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one digit, and one symbol"
                .into(),
        );
        Err(err)
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account, 4-11 alphanumeric characters.
    #[validate(regex(
        path = "NAME_REGEX",
        message = "Name must be 4-11 alphanumeric characters"
    ))]
    pub name: String,
    /// Email address for the new account. Must be a valid email format and
    /// unique across users.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. At least 8 characters with one
    /// lowercase letter, one uppercase letter, one digit, and one symbol.
    #[validate(length(min = 8), custom = "validate_password_strength")]
    pub password: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
/// Contains the caller's profile and the signed access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    /// The JWT (JSON Web Token) proving the user's identity on later calls.
    pub token: String,
}
