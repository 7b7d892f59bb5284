use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::users::{NewUser, User},
    repositories::user_repo::UserRepository,
    Error, Result,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    /// Token lifetime in hours.
    jwt_expiration: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        jwt_expiration: i64,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expiration,
        }
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(User, String)> {
        if self
            .user_repo
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            return Err(Error::BadRequest("User already exists".to_string()));
        }

        let password_hash = hash_password(&password)?;
        let user = self
            .user_repo
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        let token = self.generate_token(user.id)?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(Error::InvalidCredentials);
        }

        let token = self.generate_token(user.id)?;
        Ok((user, token))
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.jwt_expiration)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(Error::InternalServerError)?
            .timestamp()
            .max(0) as usize;
        let iat = now.timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| Error::InternalServerError)
    }

    pub fn decode_token<T: Into<String>>(&self, token: T) -> Result<Uuid> {
        let decoded = decode::<Claims>(
            &token.into(),
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => Error::InvalidToken,
        })?;

        Uuid::parse_str(&decoded.claims.sub).map_err(|_| Error::InvalidToken)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryRepo;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryRepo::new()), "test-secret".to_string(), 1)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secure_password_123").unwrap();

        assert_ne!(hash, "secure_password_123");
        assert!(verify_password("secure_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let service = service();
        let user_id = Uuid::now_v7();

        let token = service.generate_token(user_id).unwrap();
        assert_eq!(service.decode_token(token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_and_foreign_tokens() {
        let expired = AuthService::new(Arc::new(MemoryRepo::new()), "test-secret".to_string(), -2);
        let token = expired.generate_token(Uuid::now_v7()).unwrap();
        assert!(matches!(service().decode_token(token), Err(Error::TokenExpired)));

        let other = AuthService::new(Arc::new(MemoryRepo::new()), "other-secret".to_string(), 1);
        let token = other.generate_token(Uuid::now_v7()).unwrap();
        assert!(matches!(service().decode_token(token), Err(Error::InvalidToken)));

        assert!(matches!(service().decode_token("garbage"), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let service = AuthService::new(Arc::new(MemoryRepo::new()), "s".to_string(), i64::MAX);
        assert!(matches!(
            service.generate_token(Uuid::now_v7()),
            Err(Error::InternalServerError)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = service();
        service
            .register("alice".into(), "alice@example.com".into(), "secret1".into())
            .await
            .unwrap();

        let same_email = service
            .register("alice2".into(), "alice@example.com".into(), "secret1".into())
            .await;
        assert!(matches!(same_email, Err(Error::BadRequest(msg)) if msg == "User already exists"));

        let same_username = service
            .register("alice".into(), "other@example.com".into(), "secret1".into())
            .await;
        assert!(matches!(same_username, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_stores_hash_and_issues_token() {
        let service = service();
        let (user, token) = service
            .register("bob".into(), "bob@example.com".into(), "secret1".into())
            .await
            .unwrap();

        assert_ne!(user.password, "secret1");
        assert_eq!(service.decode_token(token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service
            .register("carol".into(), "carol@example.com".into(), "secret1".into())
            .await
            .unwrap();

        let wrong_password = service.login("carol@example.com", "nope").await;
        let unknown_email = service.login("nobody@example.com", "secret1").await;
        assert!(matches!(wrong_password, Err(Error::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(Error::InvalidCredentials)));

        let (user, token) = service.login("carol@example.com", "secret1").await.unwrap();
        assert_eq!(user.username, "carol");
        assert_eq!(service.decode_token(token).unwrap(), user.id);
    }
}
