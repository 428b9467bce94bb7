//! # Session Gate
//!
//! Resolves "who is signed in" for every request.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  sign_up / sign_in                                                      │
//! │      │  argon2 verify                                                   │
//! │      ▼                                                                  │
//! │  sessions row (id, user_id, expires_at)  ──►  JWT { sub, jti = id }    │
//! │                                                     │                   │
//! │  current_session(token)                             ▼                   │
//! │      signature + exp valid?  row still present?  → Some(User)          │
//! │      exp passed             → row deleted, Expired event → None        │
//! │                                                                         │
//! │  sign_out(token)  → row deleted, SignedOut event                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting the row revokes the token even though its signature stays valid.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use stocksence_core::validation::{validate_email, validate_full_name, validate_password};
use stocksence_core::{AuthError, User, ValidationError};
use stocksence_db::repository::user::generate_user_id;
use stocksence_db::{Database, DbError, SessionRecord};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Session row id
    pub jti: String,
}

/// Session state changes, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    SignedIn { user_id: String },
    #[serde(rename_all = "camelCase")]
    SignedOut { user_id: String },
    #[serde(rename_all = "camelCase")]
    Expired { user_id: String },
}

/// Returned by sign-up and sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

pub struct SessionGate {
    db: Database,
    secret: String,
    lifetime: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    pub fn new(db: Database, secret: impl Into<String>, lifetime: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        SessionGate {
            db,
            secret: secret.into(),
            lifetime,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Registers a user, provisions the profile and signs them in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> ApiResult<AuthSession> {
        let email = email.trim();
        validate_email(email)?;
        validate_password(password)?;
        validate_full_name(full_name)?;

        if self.db.users().get_by_email(email).await?.is_some() {
            return Err(AuthError::AlreadyRegistered.into());
        }

        let user = User {
            id: generate_user_id(),
            email: email.to_string(),
            full_name: full_name.trim().to_string(),
            created_at: Utc::now(),
        };
        let hash = hash_password(password)?;

        let user = match self.db.users().create_with_password(&user, &hash).await {
            Ok(user) => user,
            // Lost a race with a concurrent sign-up for the same email
            Err(DbError::UniqueViolation { .. }) => return Err(AuthError::AlreadyRegistered.into()),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "User registered");
        self.open_session(user, Utc::now()).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::Required {
                field: "email".to_string(),
            }
            .into());
        }
        if password.is_empty() {
            return Err(ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let Some(user) = self.db.users().get_by_email(email).await? else {
            debug!("Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let Some(hash) = self.db.users().password_hash_for(&user.id).await? else {
            warn!(user_id = %user.id, "User has no stored credential");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password, &hash) {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.open_session(user, Utc::now()).await
    }

    /// The signed-in user for `token`, or `None` for a missing, invalid,
    /// expired or revoked token.
    pub async fn current_session(&self, token: &str) -> ApiResult<Option<User>> {
        let claims = match self.decode(token, true) {
            Ok(claims) => claims,
            Err(ErrorKind::ExpiredSignature) => {
                self.expire(token).await?;
                return Ok(None);
            }
            Err(kind) => {
                debug!(?kind, "Rejected access token");
                return Ok(None);
            }
        };

        let now = Utc::now();
        let Some(session) = self.db.sessions().get_active(&claims.jti, now).await? else {
            if self.db.sessions().delete(&claims.jti).await? {
                self.publish(SessionEvent::Expired {
                    user_id: claims.sub,
                });
            }
            return Ok(None);
        };

        let user = self.db.users().get_by_id(&session.user_id).await?;
        Ok(user)
    }

    /// Revokes the session behind `token`. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> ApiResult<()> {
        let Ok(claims) = self.decode(token, false) else {
            return Ok(());
        };

        if self.db.sessions().delete(&claims.jti).await? {
            info!(user_id = %claims.sub, "Signed out");
            self.publish(SessionEvent::SignedOut {
                user_id: claims.sub,
            });
        }

        Ok(())
    }

    /// Deletes every expired session row. Returns how many were removed.
    pub async fn purge_expired(&self) -> ApiResult<u64> {
        Ok(self.db.sessions().delete_expired(Utc::now()).await?)
    }

    async fn open_session(&self, user: User, now: DateTime<Utc>) -> ApiResult<AuthSession> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + self.lifetime,
        };
        self.db.sessions().create(&record).await?;

        let claims = Claims {
            sub: user.id.clone(),
            iat: now.timestamp(),
            exp: record.expires_at.timestamp(),
            jti: record.id.clone(),
        };
        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        info!(user_id = %user.id, session_id = %record.id, "Signed in");
        self.publish(SessionEvent::SignedIn {
            user_id: user.id.clone(),
        });

        Ok(AuthSession {
            access_token,
            token_type: "Bearer",
            expires_at: record.expires_at,
            user,
        })
    }

    async fn expire(&self, token: &str) -> ApiResult<()> {
        if let Ok(claims) = self.decode(token, false) {
            if self.db.sessions().delete(&claims.jti).await? {
                info!(user_id = %claims.sub, "Session expired");
                self.publish(SessionEvent::Expired {
                    user_id: claims.sub,
                });
            }
        }
        Ok(())
    }

    fn decode(&self, token: &str, check_exp: bool) -> Result<Claims, ErrorKind> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = check_exp;
        if !check_exp {
            validation.required_spec_claims.clear();
        }

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| e.into_kind())
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}
