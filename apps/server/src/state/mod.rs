//! # State Module
//!
//! Shared state handed to every HTTP handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppState (Clone, cheap)                                               │
//! │  ├── db:           Database          SqlitePool, thread-safe           │
//! │  ├── sessions:     Arc<SessionGate>  token ⇄ user, event broadcast     │
//! │  ├── alerts:       Arc<AlertCenter>  per-user, Mutex<Vec<..>> + expiry │
//! │  └── report_tz:    FixedOffset       read-only after startup           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod alerts;
mod session;

pub use alerts::{ActiveAlert, AlertCenter, UserAlerts};
pub use session::{extract_bearer_token, AuthSession, Claims, SessionEvent, SessionGate};

use axum::http::{header, HeaderMap};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigResult, ServerConfig};
use crate::error::ApiResult;
use stocksence_core::User;
use stocksence_db::Database;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionGate>,
    pub alerts: Arc<AlertCenter>,
    pub report_tz: FixedOffset,
}

impl AppState {
    pub fn new(
        db: Database,
        jwt_secret: &str,
        session_lifetime: chrono::Duration,
        alert_duration: Duration,
        report_tz: FixedOffset,
    ) -> Self {
        AppState {
            sessions: Arc::new(SessionGate::new(db.clone(), jwt_secret, session_lifetime)),
            alerts: Arc::new(AlertCenter::new(alert_duration)),
            db,
            report_tz,
        }
    }

    pub fn from_config(db: Database, config: &ServerConfig) -> ConfigResult<Self> {
        Ok(AppState::new(
            db,
            &config.auth.jwt_secret,
            chrono::Duration::hours(i64::from(config.auth.session_lifetime_hours)),
            config.alerts.duration(),
            config.report.offset()?,
        ))
    }

    /// Resolves the session from the `Authorization` header, if any.
    pub async fn session_user(&self, headers: &HeaderMap) -> ApiResult<Option<User>> {
        match bearer_token(headers) {
            Some(token) => self.sessions.current_session(token).await,
            None => Ok(None),
        }
    }

    /// Current time in the reporting offset.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.report_tz)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
}
