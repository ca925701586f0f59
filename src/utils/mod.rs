// src/utils/mod.rs
use crate::config::JwtSettings;
use crate::models::{AuthFailure, Claims, ServiceError, User};
use crate::services::access::Caller;
use crate::storage::Store;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::{dev::ServiceRequest, HttpMessage, HttpRequest};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, warn};

pub mod rate_limit;
pub mod validation;

pub use rate_limit::RateLimit;

// JWT utility functions
pub mod jwt {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    // Generate a new JWT token for a user
    pub fn generate_token(user: &User, settings: &JwtSettings) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(settings.expires_hours))
            .ok_or(ServiceError::InternalServerError)?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.secret.as_ref()),
        )
        .map_err(|e| {
            error!("❌ Failed to sign token: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, settings: &JwtSettings) -> Result<Claims, AuthFailure> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(settings.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthFailure::TokenExpired,
            _ => AuthFailure::InvalidToken,
        })
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, AuthFailure> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AuthFailure::InvalidToken),
        }
    }
}

// Password utility functions
pub mod password {
    use super::*;

    // Hash a password using bcrypt
    pub fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
        hash(password, cost).map_err(|e| {
            error!("❌ Failed to hash password: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // Verify a password against a hash; a malformed stored hash never matches
    pub fn verify_password(password: &str, hash: &str) -> bool {
        verify(password, hash).unwrap_or_else(|e| {
            warn!("⚠️ Stored password hash could not be checked: {:?}", e);
            false
        })
    }

    // bcrypt is deliberately slow; keep it off the request workers
    pub async fn hash_off_thread(password: String, cost: u32) -> Result<String, ServiceError> {
        actix_web::web::block(move || hash_password(&password, cost))
            .await
            .map_err(|e| {
                error!("❌ Hashing task failed: {:?}", e);
                ServiceError::InternalServerError
            })?
    }

    pub async fn verify_off_thread(password: String, hash: String) -> Result<bool, ServiceError> {
        actix_web::web::block(move || verify_password(&password, &hash))
            .await
            .map_err(|e| {
                error!("❌ Verification task failed: {:?}", e);
                ServiceError::InternalServerError
            })
    }
}

// Outcome of reading the Authorization header, stored in request extensions
#[derive(Debug, Clone)]
pub enum TokenState {
    Valid(Claims),
    Rejected(AuthFailure),
}

// Middleware for JWT authentication. It never rejects a request by itself:
// it records what it found and the handler decides whether identity is needed.
pub mod auth_middleware {
    use super::*;
    use actix_web::dev::{forward_ready, Service, ServiceResponse, Transform};
    use actix_web::Error;
    use futures::future::{ok, Ready};
    use std::future::Future;
    use std::pin::Pin;

    pub struct Authentication {
        settings: JwtSettings,
    }

    impl Authentication {
        pub fn new(settings: JwtSettings) -> Self {
            Self { settings }
        }
    }

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware {
                service,
                settings: self.settings.clone(),
            })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
        settings: JwtSettings,
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            // Get Authorization header
            let state = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|value| {
                    value
                        .to_str()
                        .map_err(|_| AuthFailure::InvalidToken)
                        .and_then(jwt::extract_token_from_header)
                        .and_then(|token| jwt::decode_token(&token, &self.settings))
                });

            match state {
                Some(Ok(claims)) => {
                    debug!("🔐 Token accepted for user: {}", claims.sub);
                    req.extensions_mut().insert(TokenState::Valid(claims));
                }
                Some(Err(failure)) => {
                    debug!("🔐 Token rejected: {}", failure);
                    req.extensions_mut().insert(TokenState::Rejected(failure));
                }
                None => {}
            }

            Box::pin(self.service.call(req))
        }
    }
}

pub use auth_middleware::Authentication;

// Hardening headers set on every response unless a handler already set them
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Content-Security-Policy", "default-src 'self'"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Strict-Transport-Security", "max-age=15552000; includeSubDomains"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
}

pub fn caller_of(user: &User) -> Caller {
    Caller::new(user.id.clone(), user.role)
}

// Resolve the authenticated user behind a request or fail with 401
pub fn authenticated_user(req: &HttpRequest, store: &Store) -> Result<User, ServiceError> {
    let state = req.extensions().get::<TokenState>().cloned();
    match state {
        None => Err(ServiceError::Unauthorized(AuthFailure::AuthenticationRequired)),
        Some(TokenState::Rejected(failure)) => Err(ServiceError::Unauthorized(failure)),
        Some(TokenState::Valid(claims)) => match store.find_user(&claims.sub)? {
            Some(user) => Ok(user),
            None => {
                error!("❌ Token subject no longer exists: {}", claims.sub);
                Err(ServiceError::Unauthorized(AuthFailure::InvalidToken))
            }
        },
    }
}

// Like `authenticated_user`, but a missing or bad token just means "anonymous"
pub fn optional_user(req: &HttpRequest, store: &Store) -> Result<Option<User>, ServiceError> {
    let state = req.extensions().get::<TokenState>().cloned();
    match state {
        Some(TokenState::Valid(claims)) => store.find_user(&claims.sub),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret".to_string(),
            expires_hours: 24,
        }
    }

    fn user() -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            legacy_id: None,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::TeamLead,
            avatar: None,
            skills: Vec::new(),
            bio: None,
            experience: 0,
            location: None,
            portfolio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_carries_id_email_and_role() {
        let user = user();
        let token = jwt::generate_token(&user, &settings()).unwrap();
        let claims = jwt::decode_token(&token, &settings()).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::TeamLead);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_and_foreign_tokens_are_told_apart() {
        let user = user();
        let expired = JwtSettings {
            expires_hours: -2,
            ..settings()
        };
        let token = jwt::generate_token(&user, &expired).unwrap();
        assert_eq!(jwt::decode_token(&token, &settings()).unwrap_err(), AuthFailure::TokenExpired);

        let other = JwtSettings {
            secret: "someone-else".to_string(),
            ..settings()
        };
        let token = jwt::generate_token(&user, &other).unwrap();
        assert_eq!(jwt::decode_token(&token, &settings()).unwrap_err(), AuthFailure::InvalidToken);
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(jwt::extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(jwt::extract_token_from_header("Token abc").is_err());
        assert!(jwt::extract_token_from_header("Bearer ").is_err());
    }

    #[test]
    fn password_round_trip() {
        let hashed = password::hash_password("secret1", 4).unwrap();
        assert!(password::verify_password("secret1", &hashed));
        assert!(!password::verify_password("secret2", &hashed));
        assert!(!password::verify_password("secret1", "not-a-hash"));
    }
}
