//! # Auth Service
//!
//! Signup, login, bearer-token authentication, role checks and the
//! password reset flow, combined over a user repository, a JWT
//! manager and an email sender.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::crypto::hash_reset_token;
use super::email::{EmailSender, EmailTemplate};
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use super::user::{validate_email, Role, User, UserRepository};

/// Signup request body
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Auth service combining all auth components
pub struct AuthService<R: UserRepository> {
    users: Arc<R>,
    jwt: JwtManager,
    email_sender: Arc<dyn EmailSender>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(users: R, jwt_config: JwtConfig, email_sender: Arc<dyn EmailSender>) -> Self {
        Self {
            users: Arc::new(users),
            jwt: JwtManager::new(jwt_config),
            email_sender,
        }
    }

    /// Register a new user and log them in.
    pub fn signup(&self, request: SignupRequest) -> AuthResult<(User, String)> {
        if request.password != request.confirm_password {
            return Err(AuthError::Validation("Passwords don't match".to_string()));
        }
        if self.users.email_exists(&request.email)? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let user = User::new(
            &request.name,
            &request.email,
            &request.password,
            request.role.unwrap_or_default(),
        )?;
        self.users.create(&user)?;

        let token = self.jwt.sign(user.id)?;
        Ok((user, token))
    }

    /// Authenticate email/password credentials.
    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .users
            .find_by_email(&request.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(&request.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.sign(user.id)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to its user.
    ///
    /// Rejects tokens whose user no longer exists and tokens issued
    /// before the user's last password change.
    pub fn authenticate(&self, token: &str) -> AuthResult<User> {
        let claims = self.jwt.verify(token)?;
        let user_id = JwtManager::user_id(&claims)?;

        let user = self
            .users
            .find_by_id(user_id)?
            .ok_or(AuthError::TokenUserGone)?;

        if user.changed_password_after(claims.issued_at()) {
            return Err(AuthError::PasswordChanged);
        }

        Ok(user)
    }

    /// Role gate for restricted operations.
    pub fn require_role(user: &User, allowed: &[Role]) -> AuthResult<()> {
        if allowed.contains(&user.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// Start a password reset: store a hashed token on the account and
    /// email the raw token. If the email cannot be delivered the token
    /// is cleared again so a half-initiated reset leaves no trace.
    pub fn forgot_password(&self, email: &str, base_url: &str) -> AuthResult<()> {
        let mut user = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| AuthError::EmailNotFound(email.to_string()))?;

        let raw_token = user.create_password_reset_token();
        self.users.update(&user)?;

        let reset_url = format!("{}/api/v1/users/resetPassword/{}", base_url, raw_token);
        let result = self.email_sender.send(EmailTemplate::PasswordReset {
            user_email: user.email.clone(),
            reset_url,
        });

        if result.is_err() {
            user.clear_password_reset_token();
            self.users.update(&user)?;
            return Err(AuthError::EmailSendFailed);
        }

        Ok(())
    }

    /// Complete a password reset with the emailed token and log the
    /// user in.
    pub fn reset_password(
        &self,
        raw_token: &str,
        password: &str,
        confirm_password: &str,
    ) -> AuthResult<(User, String)> {
        let mut user = self
            .users
            .find_by_reset_token_hash(&hash_reset_token(raw_token))?
            .ok_or(AuthError::InvalidResetToken)?;

        if !user.reset_token_matches(raw_token) {
            return Err(AuthError::InvalidResetToken);
        }
        if password != confirm_password {
            return Err(AuthError::Validation("Passwords don't match".to_string()));
        }

        user.set_password(password)?;
        user.clear_password_reset_token();
        self.users.update(&user)?;

        let token = self.jwt.sign(user.id)?;
        Ok((user, token))
    }

    /// Change the password of a logged-in user and re-issue a token.
    pub fn update_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AuthResult<(User, String)> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(AuthError::TokenUserGone)?;

        if !user.verify_password(current_password)? {
            return Err(AuthError::WrongCurrentPassword);
        }
        if new_password != confirm_password {
            return Err(AuthError::Validation("Passwords don't match".to_string()));
        }

        user.set_password(new_password)?;
        self.users.update(&user)?;

        let token = self.jwt.sign(user.id)?;
        Ok((user, token))
    }

    /// Update name/email of the logged-in user. Password fields in the
    /// body are rejected outright; that traffic belongs to
    /// `update_password`.
    pub fn update_me(&self, user_id: Uuid, body: &Value) -> AuthResult<User> {
        if body.get("password").is_some() || body.get("confirm_password").is_some() {
            return Err(AuthError::PasswordUpdateNotAllowed);
        }

        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(AuthError::TokenUserGone)?;

        if let Some(name) = body.get("name").and_then(Value::as_str) {
            if name.trim().is_empty() {
                return Err(AuthError::Validation(
                    "A user must have a name".to_string(),
                ));
            }
            user.name = name.trim().to_string();
        }
        if let Some(email) = body.get("email").and_then(Value::as_str) {
            validate_email(email)?;
            let normalized = email.trim().to_lowercase();
            if normalized != user.email && self.users.email_exists(&normalized)? {
                return Err(AuthError::EmailAlreadyExists);
            }
            user.email = normalized;
        }

        self.users.update(&user)?;
        Ok(user)
    }

    /// Record an uploaded profile photo filename.
    pub fn set_photo(&self, user_id: Uuid, filename: &str) -> AuthResult<User> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(AuthError::TokenUserGone)?;

        user.photo = Some(filename.to_string());
        self.users.update(&user)?;
        Ok(user)
    }

    /// Soft-delete the logged-in user's account.
    pub fn deactivate(&self, user_id: Uuid) -> AuthResult<()> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(AuthError::TokenUserGone)?;

        user.active = false;
        self.users.update(&user)
    }

    pub fn list_users(&self) -> AuthResult<Vec<User>> {
        self.users.list()
    }

    pub fn get_user(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        self.users.find_by_id(user_id)
    }

    /// Hard delete (admin operation).
    pub fn delete_user(&self, user_id: Uuid) -> AuthResult<()> {
        self.users.delete(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::email::MockEmailSender;
    use crate::auth::jwt::Claims;
    use crate::auth::user::InMemoryUserRepository;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    /// Sign a token with an explicit issue time, using the test secret.
    fn token_issued_at(user_id: Uuid, issued_at: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(1)).timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret("test_secret_key_for_testing_only".as_bytes()),
        )
        .unwrap()
    }

    fn test_service() -> (AuthService<InMemoryUserRepository>, Arc<MockEmailSender>) {
        let sender = Arc::new(MockEmailSender::new());
        let service = AuthService::new(
            InMemoryUserRepository::new(),
            JwtConfig {
                secret: "test_secret_key_for_testing_only".to_string(),
                ttl: Duration::minutes(15),
            },
            sender.clone(),
        );
        (service, sender)
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            role: None,
        }
    }

    #[test]
    fn signup_then_login() {
        let (service, _) = test_service();

        let (user, token) = service.signup(signup_request()).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!token.is_empty());

        let (logged_in, _) = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let (service, _) = test_service();
        let mut request = signup_request();
        request.confirm_password = "different".to_string();

        assert!(matches!(
            service.signup(request),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn login_failures() {
        let (service, _) = test_service();
        service.signup(signup_request()).unwrap();

        assert!(matches!(
            service.login(LoginRequest {
                email: String::new(),
                password: String::new(),
            }),
            Err(AuthError::MissingCredentials)
        ));

        assert!(matches!(
            service.login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "wrong-password".to_string(),
            }),
            Err(AuthError::InvalidCredentials)
        ));

        assert!(matches!(
            service.login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "password123".to_string(),
            }),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn authenticate_resolves_token_to_user() {
        let (service, _) = test_service();
        let (user, token) = service.signup(signup_request()).unwrap();

        let resolved = service.authenticate(&token).unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(matches!(
            service.authenticate("garbage"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn authenticate_rejects_token_after_password_change() {
        let (service, _) = test_service();
        let (user, _) = service.signup(signup_request()).unwrap();

        // Pin the issue time in the past instead of racing the clock
        // against the password change below
        let old_token = token_issued_at(user.id, Utc::now() - Duration::minutes(5));
        assert!(service.authenticate(&old_token).is_ok());

        service
            .update_password(user.id, "password123", "new-password-1", "new-password-1")
            .unwrap();

        assert!(matches!(
            service.authenticate(&old_token),
            Err(AuthError::PasswordChanged)
        ));
    }

    #[test]
    fn authenticate_rejects_deactivated_user() {
        let (service, _) = test_service();
        let (user, token) = service.signup(signup_request()).unwrap();

        service.deactivate(user.id).unwrap();
        assert!(matches!(
            service.authenticate(&token),
            Err(AuthError::TokenUserGone)
        ));
    }

    #[test]
    fn role_gate() {
        let user = User::new("G", "g@tours.example.com", "password123", Role::Guide).unwrap();

        assert!(AuthService::<InMemoryUserRepository>::require_role(
            &user,
            &[Role::Guide, Role::Admin]
        )
        .is_ok());
        assert!(matches!(
            AuthService::<InMemoryUserRepository>::require_role(&user, &[Role::Admin]),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn password_reset_round_trip() {
        let (service, sender) = test_service();
        service.signup(signup_request()).unwrap();

        service
            .forgot_password("alice@example.com", "http://localhost:3000")
            .unwrap();
        assert_eq!(sender.sent_count(), 1);

        // Pull the raw token back out of the emailed URL
        let url = sender.last_reset_url().unwrap();
        let raw_token = url.rsplit('/').next().unwrap();

        let (user, token) = service
            .reset_password(raw_token, "brand-new-pass", "brand-new-pass")
            .unwrap();
        assert!(!token.is_empty());
        assert!(user.password_reset_token_hash.is_none());

        // Token is single-use
        assert!(matches!(
            service.reset_password(raw_token, "another-pass-1", "another-pass-1"),
            Err(AuthError::InvalidResetToken)
        ));

        // New password works
        assert!(service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "brand-new-pass".to_string(),
            })
            .is_ok());
    }

    #[test]
    fn forgot_password_unknown_email_is_404() {
        let (service, _) = test_service();
        assert!(matches!(
            service.forgot_password("nobody@example.com", "http://localhost"),
            Err(AuthError::EmailNotFound(_))
        ));
    }

    #[test]
    fn failed_email_clears_the_reset_token() {
        let (service, sender) = test_service();
        let (user, _) = service.signup(signup_request()).unwrap();

        sender.set_failing(true);
        assert!(matches!(
            service.forgot_password("alice@example.com", "http://localhost"),
            Err(AuthError::EmailSendFailed)
        ));

        let stored = service.get_user(user.id).unwrap().unwrap();
        assert!(stored.password_reset_token_hash.is_none());
        assert!(stored.password_reset_expires.is_none());
    }

    #[test]
    fn update_me_rejects_password_fields() {
        let (service, _) = test_service();
        let (user, _) = service.signup(signup_request()).unwrap();

        assert!(matches!(
            service.update_me(user.id, &json!({"password": "sneaky-update"})),
            Err(AuthError::PasswordUpdateNotAllowed)
        ));

        let updated = service
            .update_me(user.id, &json!({"name": "Alice B", "email": "aliceb@example.com"}))
            .unwrap();
        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.email, "aliceb@example.com");
    }

    #[test]
    fn update_password_requires_current_password() {
        let (service, _) = test_service();
        let (user, _) = service.signup(signup_request()).unwrap();

        assert!(matches!(
            service.update_password(user.id, "wrong", "new-password-1", "new-password-1"),
            Err(AuthError::WrongCurrentPassword)
        ));
    }
}
