//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Credentials
    // ==================
    /// Login request missing email or password
    #[error("Please provide email and password")]
    MissingCredentials,

    /// Wrong email or password (generic, to avoid leaking which)
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Email already registered
    #[error("Email already registered. Please use another value!")]
    EmailAlreadyExists,

    /// Signup/profile field failed validation
    #[error("{0}")]
    Validation(String),

    // ==================
    // Tokens
    // ==================
    /// No bearer token on a protected route
    #[error("You are not logged in. Please login to get access")]
    NotLoggedIn,

    /// JWT is malformed or its signature is wrong
    #[error("Invalid token. Please login again")]
    InvalidToken,

    /// JWT has expired
    #[error("Your token has expired. Please login again")]
    TokenExpired,

    /// The user the token refers to no longer exists
    #[error("The user belonging to this token no longer exists")]
    TokenUserGone,

    /// Password changed after the token was issued
    #[error("User recently changed password! Please login again")]
    PasswordChanged,

    // ==================
    // Authorization
    // ==================
    /// User's role is not allowed to perform this operation
    #[error("You're not allowed to perform this operation")]
    Forbidden,

    // ==================
    // Password reset
    // ==================
    /// No account for the given email
    #[error("There is no user with {0} address")]
    EmailNotFound(String),

    /// Reset token unknown or past its expiry
    #[error("Token is invalid or has expired")]
    InvalidResetToken,

    /// Current password check failed on password update
    #[error("Your current password is invalid. Try again")]
    WrongCurrentPassword,

    /// Profile-update route used for password fields
    #[error("This route is not for password update. Please use /updateMyPassword")]
    PasswordUpdateNotAllowed,

    // ==================
    // Internal
    // ==================
    /// Reset email could not be delivered
    #[error("There was an error sending the email. Try again later")]
    EmailSendFailed,

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AuthError::MissingCredentials => 400,
            AuthError::EmailAlreadyExists => 400,
            AuthError::Validation(_) => 400,
            AuthError::InvalidResetToken => 400,
            AuthError::PasswordUpdateNotAllowed => 400,

            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::NotLoggedIn => 401,
            AuthError::InvalidToken => 401,
            AuthError::TokenExpired => 401,
            AuthError::TokenUserGone => 401,
            AuthError::PasswordChanged => 401,
            AuthError::WrongCurrentPassword => 401,

            // 403 Forbidden
            AuthError::Forbidden => 403,

            // 404 Not Found
            AuthError::EmailNotFound(_) => 404,

            // 500 Internal Server Error
            AuthError::EmailSendFailed => 500,
            AuthError::HashingFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
