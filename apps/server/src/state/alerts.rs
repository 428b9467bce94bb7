//! # Alert Center
//!
//! Server-side [`NotificationSink`]: every command reports its outcome
//! here, filed under the signed-in user, and that user polls
//! `GET /api/alerts` for what is still visible.
//!
//! ```text
//!  notify("Product created")     t=0     (as ada)
//!  active_for("ada")             t=1s   → ["Product created"]
//!  active_for("bob")             t=1s   → []
//!  active_for("ada")             t=3s   → []   (expired, pruned)
//! ```

use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use stocksence_core::alert::DEFAULT_ALERT_DURATION;
use stocksence_core::{Alert, NotificationSink, User};

#[derive(Debug, Clone)]
struct PostedAlert {
    owner: String,
    alert: Alert,
    expires_at: Instant,
}

/// Alerts with an expiry, kept per user.
#[derive(Debug)]
pub struct AlertCenter {
    duration: Duration,
    alerts: Mutex<Vec<PostedAlert>>,
}

/// Wire shape of an active alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAlert {
    #[serde(flatten)]
    pub alert: Alert,
    /// Milliseconds until the alert clears.
    pub remaining_ms: u64,
}

impl Default for AlertCenter {
    fn default() -> Self {
        AlertCenter::new(DEFAULT_ALERT_DURATION)
    }
}

impl AlertCenter {
    pub fn new(duration: Duration) -> Self {
        AlertCenter {
            duration,
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sink that files alerts under `user`. Without a user, alerts are
    /// only logged: nobody could read them back.
    pub fn for_user<'a>(&'a self, user: Option<&'a User>) -> UserAlerts<'a> {
        UserAlerts {
            center: self,
            owner: user.map(|u| u.id.as_str()),
        }
    }

    /// Stores `alert` for `owner`, dropping everything expired at `now`.
    pub fn post_at(&self, owner: &str, alert: Alert, now: Instant) {
        debug!(owner = %owner, kind = ?alert.kind, message = %alert.message, "Alert posted");

        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.retain(|posted| posted.expires_at > now);
            alerts.push(PostedAlert {
                owner: owner.to_string(),
                alert,
                expires_at: now + self.duration,
            });
        }
    }

    /// `owner`'s unexpired alerts at `now`, oldest first.
    pub fn active_at(&self, owner: &str, now: Instant) -> Vec<ActiveAlert> {
        let Ok(mut alerts) = self.alerts.lock() else {
            return Vec::new();
        };

        alerts.retain(|posted| posted.expires_at > now);
        alerts
            .iter()
            .filter(|posted| posted.owner == owner)
            .map(|posted| ActiveAlert {
                alert: posted.alert.clone(),
                remaining_ms: posted.expires_at.duration_since(now).as_millis() as u64,
            })
            .collect()
    }

    pub fn active_for(&self, owner: &str) -> Vec<ActiveAlert> {
        self.active_at(owner, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@shop.io", id),
            full_name: id.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_alerts_expire_after_duration() {
        let center = AlertCenter::new(Duration::from_secs(3));
        let t0 = Instant::now();

        center.post_at("u1", Alert::success("Product created"), t0);

        let active = center.active_at("u1", t0 + Duration::from_secs(1));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].alert.message, "Product created");
        assert_eq!(active[0].remaining_ms, 2000);

        assert!(center.active_at("u1", t0 + Duration::from_secs(3)).is_empty());
    }

    #[test]
    fn test_oldest_first_and_pruned() {
        let center = AlertCenter::new(Duration::from_secs(3));
        let t0 = Instant::now();

        center.post_at("u1", Alert::info("first"), t0);
        center.post_at("u1", Alert::error("second"), t0 + Duration::from_secs(2));

        let messages: Vec<_> = center
            .active_at("u1", t0 + Duration::from_secs(2))
            .into_iter()
            .map(|a| a.alert.message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);

        let later = center.active_at("u1", t0 + Duration::from_secs(4));
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].alert.message, "second");
    }

    #[test]
    fn test_posting_drops_expired_alerts() {
        let center = AlertCenter::new(Duration::from_secs(3));
        let t0 = Instant::now();

        for i in 0..1000u64 {
            center.post_at("u1", Alert::success("Sale recorded successfully"), t0 + Duration::from_secs(i));
        }

        // Only the posts from the last three seconds survive, without any reader
        assert_eq!(center.stored(), 3);
    }

    #[test]
    fn test_alerts_are_per_user() {
        let center = AlertCenter::default();
        assert_eq!(center.duration(), DEFAULT_ALERT_DURATION);
        let ada = user("ada");
        let bob = user("bob");

        let ada_sink = center.for_user(Some(&ada));
        let sink: &dyn NotificationSink = &ada_sink;
        sink.notify(Alert::warning("Lamp is low on stock (5 left)"));
        center.for_user(Some(&bob)).notify(Alert::success("Sale recorded successfully"));

        let ada_alerts = center.active_for("ada");
        assert_eq!(ada_alerts.len(), 1);
        assert_eq!(ada_alerts[0].alert.message, "Lamp is low on stock (5 left)");
        assert_eq!(center.active_for("bob").len(), 1);
        assert!(center.active_for("eve").is_empty());
    }

    #[test]
    fn test_alerts_without_session_are_not_stored() {
        let center = AlertCenter::default();
        center.for_user(None).notify(Alert::error("Authentication required"));
        assert_eq!(center.stored(), 0);
    }

    #[test]
    fn test_active_alert_json_is_flat() {
        let active = ActiveAlert {
            alert: Alert::warning("Low stock"),
            remaining_ms: 1500,
        };
        let json = serde_json::to_string(&active).unwrap();
        assert_eq!(json, r#"{"kind":"warning","message":"Low stock","remainingMs":1500}"#);
    }
}
