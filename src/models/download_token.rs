//! Download token model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Expiring capability token granting access to a delivered file,
/// independent of any user session. Rows are never deleted; expiry is a
/// timestamp comparison only.
#[derive(Clone, FromRow, Serialize)]
pub struct DownloadToken {
    /// Opaque unguessable string, primary key
    pub token: String,
    pub order_id: i64,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

redacted_debug!(DownloadToken {
    redact token,
    show order_id,
    show file_path,
    show created_at,
    show expires_at,
});

impl DownloadToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> DownloadToken {
        DownloadToken {
            token: "sKx2Fo9q".to_string(),
            order_id: 1,
            file_path: "/opt/app/generated/CT173000000042.docx".to_string(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_future_expiry_is_live() {
        let now = Utc::now();
        assert!(!token_expiring_at(now + Duration::hours(24)).is_expired(now));
    }

    #[test]
    fn test_past_or_exact_expiry_is_expired() {
        let now = Utc::now();
        assert!(token_expiring_at(now - Duration::seconds(1)).is_expired(now));
        assert!(token_expiring_at(now).is_expired(now));
    }

    #[test]
    fn test_debug_redacts_token_value() {
        let token = token_expiring_at(Utc::now());
        let debug = format!("{:?}", token);
        assert!(!debug.contains("sKx2Fo9q"));
        assert!(debug.contains("[REDACTED]"));
    }
}
