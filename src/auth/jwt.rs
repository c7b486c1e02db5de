//! Access and refresh token issuance and validation (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{config::JwtConfig, models::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("unexpected token type")]
    WrongType,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_exp_mins),
            refresh_ttl: Duration::minutes(config.refresh_token_exp_mins),
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        roles: &[Role],
        token_type: TokenType,
    ) -> Result<String, JwtError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();
        let claims = Claims {
            user_id,
            roles: roles.to_vec(),
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn issue_pair(&self, user_id: Uuid, roles: &[Role]) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            token: self.issue(user_id, roles, TokenType::Access)?,
            refresh_token: self.issue(user_id, roles, TokenType::Refresh)?,
        })
    }

    /// Decodes `token` and checks signature, expiry and that it is of the
    /// `expected` type.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })?;

        if claims.token_type != expected {
            return Err(JwtError::WrongType);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "a-test-secret-that-is-long-enough".into(),
            access_token_exp_mins: 15,
            refresh_token_exp_mins: 60,
        })
    }

    #[test]
    fn access_token_round_trips_claims() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service
            .issue(user_id, &[Role::Admin], TokenType::Access)
            .unwrap();

        let claims = service.validate(&token, TokenType::Access).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.roles, vec![Role::Admin]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access_token() {
        let service = service();
        let pair = service.issue_pair(Uuid::new_v4(), &[Role::Customer]).unwrap();

        assert!(matches!(
            service.validate(&pair.refresh_token, TokenType::Access),
            Err(JwtError::WrongType)
        ));
        assert!(matches!(
            service.validate(&pair.token, TokenType::Refresh),
            Err(JwtError::WrongType)
        ));
    }

    #[test]
    fn expired_token_is_distinguished_from_invalid() {
        let service = service();
        let past = Utc::now() - Duration::minutes(5);
        let claims = Claims {
            user_id: Uuid::new_v4(),
            roles: vec![Role::Admin],
            token_type: TokenType::Access,
            iat: (past - Duration::minutes(15)).timestamp(),
            exp: past.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert!(matches!(
            service.validate(&token, TokenType::Access),
            Err(JwtError::Expired)
        ));
        assert!(matches!(
            service.validate("not.a.token", TokenType::Access),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = JwtService::new(&JwtConfig {
            secret: "some-other-secret".into(),
            access_token_exp_mins: 15,
            refresh_token_exp_mins: 60,
        });
        let token = other
            .issue(Uuid::new_v4(), &[Role::Admin], TokenType::Access)
            .unwrap();

        assert!(matches!(
            service().validate(&token, TokenType::Access),
            Err(JwtError::Invalid)
        ));
    }
}
