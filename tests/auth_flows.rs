//! Auth Flow Integration Tests
//!
//! Full flows through the auth service: signup, login, token
//! lifecycle, password reset over email and the soft-delete behavior.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use trailhead::auth::jwt::Claims;
use trailhead::auth::{
    AuthError, AuthService, InMemoryUserRepository, JwtConfig, LoginRequest, MockEmailSender,
    Role, SignupRequest,
};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn service() -> (AuthService<InMemoryUserRepository>, Arc<MockEmailSender>) {
    let sender = Arc::new(MockEmailSender::new());
    let service = AuthService::new(
        InMemoryUserRepository::new(),
        JwtConfig {
            secret: "integration_test_secret".to_string(),
            ttl: Duration::minutes(30),
        },
        sender.clone(),
    );
    (service, sender)
}

fn signup(name: &str, email: &str, role: Option<Role>) -> SignupRequest {
    SignupRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "test-password-1".to_string(),
        confirm_password: "test-password-1".to_string(),
        role,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Sign a token for `user_id` with an issue time pinned in the past,
/// so password-change tests never race the wall clock.
fn stale_token(user_id: Uuid) -> String {
    let issued_at = Utc::now() - Duration::minutes(5);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued_at.timestamp(),
        exp: (issued_at + Duration::hours(1)).timestamp(),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret("integration_test_secret".as_bytes()),
    )
    .unwrap()
}

// =============================================================================
// Token Lifecycle
// =============================================================================

#[test]
fn signup_token_authenticates_until_password_changes() {
    let (service, _) = service();

    let (user, _) = service.signup(signup("Alice", "alice@example.com", None)).unwrap();
    let token = stale_token(user.id);
    assert_eq!(service.authenticate(&token).unwrap().id, user.id);

    service
        .update_password(user.id, "test-password-1", "test-password-2", "test-password-2")
        .unwrap();

    assert!(matches!(
        service.authenticate(&token),
        Err(AuthError::PasswordChanged)
    ));

    // A fresh login works with the new password only
    assert!(service.login(login("alice@example.com", "test-password-1")).is_err());
    let (_, new_token) = service.login(login("alice@example.com", "test-password-2")).unwrap();
    assert!(service.authenticate(&new_token).is_ok());
}

#[test]
fn duplicate_signup_is_rejected() {
    let (service, _) = service();
    service.signup(signup("Alice", "alice@example.com", None)).unwrap();

    assert!(matches!(
        service.signup(signup("Imposter", "alice@example.com", None)),
        Err(AuthError::EmailAlreadyExists)
    ));
}

// =============================================================================
// Password Reset
// =============================================================================

#[test]
fn reset_flow_end_to_end() {
    let (service, sender) = service();
    service.signup(signup("Bob", "bob@example.com", None)).unwrap();

    service
        .forgot_password("bob@example.com", "https://tours.example.com")
        .unwrap();

    let url = sender.last_reset_url().unwrap();
    assert!(url.starts_with("https://tours.example.com/api/v1/users/resetPassword/"));
    let raw_token = url.rsplit('/').next().unwrap();

    let (_, token) = service
        .reset_password(raw_token, "after-reset-pw", "after-reset-pw")
        .unwrap();
    assert!(service.authenticate(&token).is_ok());

    // Old password no longer works, token is spent
    assert!(service.login(login("bob@example.com", "test-password-1")).is_err());
    assert!(matches!(
        service.reset_password(raw_token, "again-pw-12345", "again-pw-12345"),
        Err(AuthError::InvalidResetToken)
    ));
}

#[test]
fn reset_with_wrong_token_fails() {
    let (service, _) = service();
    service.signup(signup("Bob", "bob@example.com", None)).unwrap();
    service
        .forgot_password("bob@example.com", "http://localhost")
        .unwrap();

    assert!(matches!(
        service.reset_password("not-the-token", "whatever-pw-1", "whatever-pw-1"),
        Err(AuthError::InvalidResetToken)
    ));
}

// =============================================================================
// Roles and Soft Delete
// =============================================================================

#[test]
fn roles_gate_restricted_operations() {
    let (service, _) = service();
    let (guide, _) = service
        .signup(signup("Gary", "gary@example.com", Some(Role::Guide)))
        .unwrap();
    let (admin, _) = service
        .signup(signup("Ada", "ada@example.com", Some(Role::Admin)))
        .unwrap();

    type Svc = AuthService<InMemoryUserRepository>;
    assert!(Svc::require_role(&admin, &[Role::Admin]).is_ok());
    assert!(Svc::require_role(&guide, &[Role::Guide, Role::LeadGuide]).is_ok());
    assert!(matches!(
        Svc::require_role(&guide, &[Role::Admin]),
        Err(AuthError::Forbidden)
    ));
}

#[test]
fn deactivated_account_disappears_everywhere() {
    let (service, _) = service();
    let (user, token) = service.signup(signup("Carol", "carol@example.com", None)).unwrap();

    service.deactivate(user.id).unwrap();

    assert!(service.get_user(user.id).unwrap().is_none());
    assert!(matches!(
        service.authenticate(&token),
        Err(AuthError::TokenUserGone)
    ));
    assert!(matches!(
        service.login(login("carol@example.com", "test-password-1")),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(service
        .list_users()
        .unwrap()
        .iter()
        .all(|u| u.id != user.id));
}

#[test]
fn profile_update_cannot_touch_passwords() {
    let (service, _) = service();
    let (user, _) = service.signup(signup("Dan", "dan@example.com", None)).unwrap();

    assert!(matches!(
        service.update_me(user.id, &json!({"password": "sneaky"})),
        Err(AuthError::PasswordUpdateNotAllowed)
    ));

    let updated = service.update_me(user.id, &json!({"name": "Daniel"})).unwrap();
    assert_eq!(updated.name, "Daniel");
}
