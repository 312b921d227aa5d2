use std::sync::{Arc, LazyLock};

use anyhow::Result;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    AuthResponse, CreateUserInput, LoginInput, PasswordResetToken, User,
};
use crate::database::repositories::{PasswordResetStore, UserStore};
use crate::error::AppError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Clone)]
pub struct AuthService {
    user_store: Arc<dyn UserStore>,
    password_reset_store: Arc<dyn PasswordResetStore>,
    config: Config,
}

impl AuthService {
    pub fn new(
        config: Config,
        user_store: Arc<dyn UserStore>,
        password_reset_store: Arc<dyn PasswordResetStore>,
    ) -> Self {
        Self {
            user_store,
            password_reset_store,
            config,
        }
    }

    pub async fn register(&self, request: CreateUserInput) -> Result<AuthResponse> {
        let email = request.email.trim().to_string();
        let display_name = request.display_name.trim().to_string();

        if !is_valid_email(&email) {
            return Err(AppError::BadRequest("Please enter a valid email address".into()).into());
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }
        if display_name.is_empty() {
            return Err(AppError::BadRequest("Please enter your name".into()).into());
        }

        if self.user_store.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".into()).into());
        }

        let password_hash = hash(&request.password, DEFAULT_COST)?;
        let user = User::new(email, password_hash, display_name);
        let user = self.user_store.create(&user).await?;

        log::info!("Registered user {}", user.id);

        let token = self.generate_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(&self, request: LoginInput) -> Result<AuthResponse> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest("Enter email and password".into()).into());
        }

        let user = self
            .user_store
            .find_by_email(request.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized.into());
        }

        let token = self.generate_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Resolves a bearer token to a user that still exists.
    pub async fn get_user_from_token(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        let user = self
            .user_store
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(user)
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(self.config.jwt_expiration_days))
            .ok_or_else(|| anyhow::anyhow!("token expiration overflow"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expiration,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }

    /// Issues a reset token. Unknown emails are a 404.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetToken> {
        let user = self
            .user_store
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let reset_token = self.password_reset_store.create_token(user.id).await?;
        log::info!("Password reset token issued for user {}", user.id);

        Ok(reset_token)
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }

        let reset_token = self
            .password_reset_store
            .find_valid_token(token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".into()))?;

        let password_hash = hash(new_password, DEFAULT_COST)?;
        self.user_store
            .update_password(reset_token.user_id, &password_hash)
            .await?;

        self.password_reset_store.mark_used(reset_token.id).await?;
        self.password_reset_store
            .invalidate_user_tokens(reset_token.user_id)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::Stores;
    use pretty_assertions::assert_eq;

    fn service() -> AuthService {
        let stores = Stores::in_memory();
        AuthService::new(Config::test_config(), stores.users, stores.password_resets)
    }

    fn input(email: &str, password: &str, name: &str) -> CreateUserInput {
        CreateUserInput {
            email: email.to_string(),
            password: password.to_string(),
            display_name: name.to_string(),
        }
    }

    fn status_of(error: anyhow::Error) -> actix_web::http::StatusCode {
        use actix_web::ResponseError;
        AppError::from(error).status_code()
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn test_register_then_token_round_trip() {
        let service = service();
        let response = service
            .register(input(" ada@example.com ", "secret1", " Ada "))
            .await
            .unwrap();

        assert_eq!(response.user.email, "ada@example.com");
        assert_eq!(response.user.display_name, "Ada");
        assert!(response.user.organizations.is_empty());

        let user = service.get_user_from_token(&response.token).await.unwrap();
        assert_eq!(user.id, response.user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let service = service();

        let short = service
            .register(input("ada@example.com", "12345", "Ada"))
            .await
            .unwrap_err();
        assert_eq!(status_of(short).as_u16(), 400);

        let nameless = service
            .register(input("ada@example.com", "secret1", "   "))
            .await
            .unwrap_err();
        assert_eq!(status_of(nameless).as_u16(), 400);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let service = service();
        service
            .register(input("ada@example.com", "secret1", "Ada"))
            .await
            .unwrap();

        let error = service
            .register(input("ada@example.com", "secret2", "Other"))
            .await
            .unwrap_err();
        assert_eq!(status_of(error).as_u16(), 409);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let service = service();
        let error = service
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap_err();
        let error = AppError::from(error);
        assert!(matches!(error, AppError::BadRequest(ref m) if m == "Enter email and password"));
    }

    #[tokio::test]
    async fn test_reset_password_consumes_token() {
        let service = service();
        service
            .register(input("ada@example.com", "secret1", "Ada"))
            .await
            .unwrap();

        let token = service.forgot_password("ada@example.com").await.unwrap();
        service
            .reset_password(&token.token, "newsecret")
            .await
            .unwrap();

        assert!(
            service
                .reset_password(&token.token, "another1")
                .await
                .is_err()
        );
        let response = service
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "newsecret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.email, "ada@example.com");
    }
}
