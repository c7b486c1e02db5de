use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{JwtError, JwtService, PasswordEncoder, TokenPair, TokenType},
    models::{Role, User, UserEntity},
    params::{FieldErrors, LoginParams, RefreshTokenParams, UserParams, ValidateParams},
    repositories::{StoreError, USER_EMAIL_UNIQUE, UsersRepository},
};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid request")]
    Validation(FieldErrors),

    #[error("user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("no user found with given email: {0}")]
    UnknownEmail(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct UsersService {
    users: Arc<dyn UsersRepository>,
    encoder: Arc<dyn PasswordEncoder>,
    jwt: Arc<JwtService>,
}

impl UsersService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        encoder: Arc<dyn PasswordEncoder>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            encoder,
            jwt,
        }
    }

    pub async fn create(&self, params: UserParams) -> Result<User, AccountError> {
        let errors = params.validate_params();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let email = params.email.to_lowercase();
        let mut roles: Vec<String> = params
            .roles
            .iter()
            .filter_map(|role| role.parse::<Role>().ok())
            .map(|role| role.to_string())
            .collect();
        if roles.is_empty() {
            roles.push(Role::Customer.to_string());
        }
        roles.sort();
        roles.dedup();

        let user = UserEntity {
            id: Uuid::new_v4(),
            name: params.name,
            email: email.clone(),
            password_hash: self.hash_password(params.password).await?,
            roles,
            created_at: Utc::now(),
        };

        self.users.create(user.clone()).await.map_err(|err| {
            if err.is_unique_violation(USER_EMAIL_UNIQUE) {
                AccountError::DuplicateEmail(email)
            } else {
                err.into()
            }
        })?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    pub async fn login(&self, params: LoginParams) -> Result<TokenPair, AccountError> {
        let errors = params.validate_params();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let email = params.email.to_lowercase();
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::UnknownEmail(email))?;

        let matches = self
            .verify_password(params.password, user.password_hash.clone())
            .await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Login with invalid credentials");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(self.jwt.issue_pair(user.id, &user.role_set())?)
    }

    async fn hash_password(&self, password: String) -> anyhow::Result<String> {
        let encoder = self.encoder.clone();
        tokio::task::spawn_blocking(move || encoder.hash(&password))
            .await
            .context("Password hashing task failed")?
    }

    async fn verify_password(&self, password: String, hash: String) -> anyhow::Result<bool> {
        let encoder = self.encoder.clone();
        tokio::task::spawn_blocking(move || encoder.verify(&password, &hash))
            .await
            .context("Password verification task failed")
    }

    /// Mints a new access token; the refresh token itself is returned as is.
    pub fn refresh(&self, params: RefreshTokenParams) -> Result<TokenPair, AccountError> {
        let errors = params.validate_params();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let claims = self.jwt.validate(&params.refresh_token, TokenType::Refresh)?;
        let token = self
            .jwt
            .issue(claims.user_id, &claims.roles, TokenType::Access)?;

        Ok(TokenPair {
            token,
            refresh_token: params.refresh_token,
        })
    }
}
