//! # Authentication
//!
//! User accounts, password hashing, JWT issuance and verification,
//! role-based authorization and the hashed-token-with-expiry password
//! reset flow.

pub mod crypto;
pub mod email;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod user;

pub use email::{EmailConfig, EmailSender, EmailTemplate, MockEmailSender, SmtpEmailSender};
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtConfig, JwtManager};
pub use service::{AuthService, LoginRequest, SignupRequest};
pub use user::{InMemoryUserRepository, Role, User, UserRepository};
