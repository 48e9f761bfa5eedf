//! Auth session manager: account creation, password sign-in, bearer
//! sessions, and a push-based session-change event stream.

use std::num::NonZeroU32;

use base64::Engine;
use chrono::{Duration, Utc};
use ring::rand::SecureRandom;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::storage::models::{Account, Session, UserProfile};
use crate::storage::{Database, DatabaseError};

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("crypto failure: {0}")]
    Crypto(String),
}

/// The session user threaded through handlers and the access gate.
/// `profile` is `None` when the profile row is missing or unreadable; that
/// degrades the user to an authenticated non-admin rather than failing.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub profile: Option<UserProfile>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_admin)
    }
}

/// Single writer of session state; everything else subscribes or reads.
pub struct AuthManager {
    db: Database,
    events: broadcast::Sender<Option<AuthUser>>,
    session_ttl: Duration,
}

impl AuthManager {
    pub fn new(db: Database, session_ttl_secs: i64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            db,
            events,
            session_ttl: Duration::seconds(session_ttl_secs),
        }
    }

    /// Create an account and its profile row. Does not sign the user in:
    /// no session is issued and no event fires.
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<String, AuthError> {
        if self.db.get_account_by_email(email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let account = Account {
            id: id.clone(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: now,
        };
        self.db.put_account(&account)?;

        let profile = UserProfile {
            id: id.clone(),
            email: email.to_string(),
            full_name: full_name.unwrap_or_default().to_string(),
            avatar_url: String::new(),
            is_admin: false,
            role: "user".to_string(),
            created_at: now,
        };
        self.db.put_profile(&profile)?;

        tracing::debug!(user_id = %id, "Created account");
        Ok(id)
    }

    /// Verify credentials, issue a session, and broadcast the resolved user
    /// (profile included) to subscribers.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(String, AuthUser), AuthError> {
        let account = self
            .db
            .get_account_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&account.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: generate_token()?,
            user_id: account.id.clone(),
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.db.put_session(&session)?;

        let user = self.resolve_user(&account);
        let _ = self.events.send(Some(user.clone()));

        tracing::debug!(user_id = %account.id, "Signed in");
        Ok((session.token, user))
    }

    /// Destroy the session and broadcast a signed-out event.
    pub fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.db.delete_session(token)?;
        let _ = self.events.send(None);
        Ok(())
    }

    /// Resolve the current user from a bearer token. Expired or unknown
    /// sessions yield `None`; a missing profile does not.
    pub fn current_user(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let Some(session) = self.db.get_session(token)? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            let _ = self.db.delete_session(token);
            return Ok(None);
        }

        let Some(account) = self.db.get_account(&session.user_id)? else {
            return Ok(None);
        };

        Ok(Some(self.resolve_user(&account)))
    }

    /// Subscribe to session-change events: `Some(user)` on sign-in, `None`
    /// on sign-out. Cancel by dropping the receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Option<AuthUser>> {
        self.events.subscribe()
    }

    fn resolve_user(&self, account: &Account) -> AuthUser {
        // Profile read failures are swallowed: "no profile", not "no user".
        let profile = match self.db.get_profile(&account.id) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %account.id, error = %e, "Profile read failed");
                None
            }
        };

        AuthUser {
            id: account.id.clone(),
            email: account.email.clone(),
            profile,
        }
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let rng = ring::rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| AuthError::Crypto("failed to generate salt".into()))?;

    let mut key = [0u8; KEY_LEN];
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        password.as_bytes(),
        &mut key,
    );

    let encoder = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    Ok(format!("{}:{}", encoder.encode(salt), encoder.encode(key)))
}

fn verify_password(hash: &str, password: &str) -> Result<bool, AuthError> {
    let (salt_b64, key_b64) = hash
        .split_once(':')
        .ok_or_else(|| AuthError::Crypto("malformed password hash".into()))?;

    let decoder = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let salt = decoder
        .decode(salt_b64)
        .map_err(|e| AuthError::Crypto(format!("malformed salt: {e}")))?;
    let key = decoder
        .decode(key_b64)
        .map_err(|e| AuthError::Crypto(format!("malformed key: {e}")))?;

    Ok(ring::pbkdf2::verify(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        password.as_bytes(),
        &key,
    )
    .is_ok())
}

fn generate_token() -> Result<String, AuthError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = [0u8; TOKEN_LEN];
    rng.fill(&mut bytes)
        .map_err(|_| AuthError::Crypto("failed to generate session token".into()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(PBKDF2_ITERATIONS).expect("iteration count is nonzero")
}
