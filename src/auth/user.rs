//! # User Accounts
//!
//! User model and repository. Secrets (password hash, reset token,
//! timestamps used for token invalidation) never serialize. Deleting
//! an account only flips the `active` flag; inactive users are
//! invisible to every lookup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{
    constant_time_str_eq, generate_reset_token, hash_password, hash_reset_token,
    validate_password, verify_password,
};
use super::errors::{AuthError, AuthResult};

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,

    #[serde(rename = "guide")]
    Guide,

    #[serde(rename = "lead-guide")]
    LeadGuide,

    #[serde(rename = "admin")]
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// User model
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Unique, lowercased email address
    pub email: String,

    pub role: Role,

    /// Uploaded profile photo filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Argon2id hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Set whenever the password changes; tokens issued earlier are
    /// rejected
    #[serde(skip_serializing)]
    pub password_changed_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    pub password_reset_token_hash: Option<String>,

    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,

    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub active: bool,
}

impl User {
    /// Create a user, validating name, email shape and password.
    pub fn new(name: &str, email: &str, password: &str, role: Role) -> AuthResult<Self> {
        if name.trim().is_empty() {
            return Err(AuthError::Validation(
                "A user must have a name".to_string(),
            ));
        }
        validate_email(email)?;
        validate_password(password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            role,
            photo: None,
            created_at: Utc::now(),
            password_hash: hash_password(password)?,
            password_changed_at: None,
            password_reset_token_hash: None,
            password_reset_expires: None,
            active: true,
        })
    }

    pub fn verify_password(&self, candidate: &str) -> AuthResult<bool> {
        verify_password(candidate, &self.password_hash)
    }

    /// Replace the password and stamp the change time.
    pub fn set_password(&mut self, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;
        self.password_hash = hash_password(new_password)?;
        self.password_changed_at = Some(Utc::now());
        Ok(())
    }

    /// Whether the password changed after a token issued at `issued_at`.
    ///
    /// JWT `iat` carries whole seconds, so the change timestamp is
    /// truncated the same way before comparing. A token from the same
    /// second as the change stays valid; the service signs replacement
    /// tokens after the change, so those always pass.
    pub fn changed_password_after(&self, issued_at: DateTime<Utc>) -> bool {
        match self.password_changed_at {
            Some(changed_at) => issued_at.timestamp() < changed_at.timestamp(),
            None => false,
        }
    }

    /// Create a reset token: the hash and expiry are stored on the
    /// user, the raw token is returned for the email.
    pub fn create_password_reset_token(&mut self) -> String {
        let raw = generate_reset_token();
        self.password_reset_token_hash = Some(hash_reset_token(&raw));
        self.password_reset_expires =
            Some(Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        raw
    }

    /// Whether `raw` matches the stored, unexpired reset token.
    pub fn reset_token_matches(&self, raw: &str) -> bool {
        let (Some(stored), Some(expires)) = (
            self.password_reset_token_hash.as_deref(),
            self.password_reset_expires,
        ) else {
            return false;
        };

        expires > Utc::now() && constant_time_str_eq(stored, &hash_reset_token(raw))
    }

    pub fn clear_password_reset_token(&mut self) {
        self.password_reset_token_hash = None;
        self.password_reset_expires = None;
    }
}

/// Minimal email shape check: something before and after one `@`,
/// with a dot in the domain part.
pub fn validate_email(email: &str) -> AuthResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "Please provide a valid email".to_string(),
        ))
    }
}

/// Storage abstraction for user accounts.
///
/// Every lookup skips inactive users, mirroring the soft-delete query
/// hook on the original collection.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    fn find_by_reset_token_hash(&self, token_hash: &str) -> AuthResult<Option<User>>;

    fn email_exists(&self, email: &str) -> AuthResult<bool>;

    fn list(&self) -> AuthResult<Vec<User>>;

    fn create(&self, user: &User) -> AuthResult<()>;

    fn update(&self, user: &User) -> AuthResult<()>;

    /// Hard delete (admin only); soft delete goes through `update`.
    fn delete(&self, id: Uuid) -> AuthResult<()>;
}

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: std::sync::RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AuthResult<std::sync::RwLockReadGuard<'_, Vec<User>>> {
        self.users
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))
    }

    fn write(&self) -> AuthResult<std::sync::RwLockWriteGuard<'_, Vec<User>>> {
        self.users
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self
            .read()?
            .iter()
            .find(|u| u.active && u.id == id)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .read()?
            .iter()
            .find(|u| u.active && u.email == email)
            .cloned())
    }

    fn find_by_reset_token_hash(&self, token_hash: &str) -> AuthResult<Option<User>> {
        Ok(self
            .read()?
            .iter()
            .find(|u| u.active && u.password_reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    fn email_exists(&self, email: &str) -> AuthResult<bool> {
        let email = email.trim().to_lowercase();
        Ok(self.read()?.iter().any(|u| u.active && u.email == email))
    }

    fn list(&self) -> AuthResult<Vec<User>> {
        Ok(self.read()?.iter().filter(|u| u.active).cloned().collect())
    }

    fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.write()?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        users.push(user.clone());
        Ok(())
    }

    fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.write()?;

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AuthError::StorageError("User not found".to_string())),
        }
    }

    fn delete(&self, id: Uuid) -> AuthResult<()> {
        let mut users = self.write()?;
        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() == before {
            Err(AuthError::StorageError("User not found".to_string()))
        } else {
            Ok(())
        }
    }
}
