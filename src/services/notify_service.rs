//! Outbound notification sink
//!
//! Publishes contest events over Redis pub/sub, keyed by contest id, for the
//! realtime push layer to fan out. Delivery is at-most-once and best-effort:
//! publish failures are logged and swallowed, never propagated.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

/// Notification publisher
pub struct NotifyService;

impl NotifyService {
    /// Announce that a contest's metadata or lifecycle changed
    pub async fn contest_updated(redis: ConnectionManager, contest_id: &Uuid) {
        Self::publish(redis, contest_id, "contest_updated").await;
    }

    /// Announce that a contest's standings changed
    pub async fn standings_updated(redis: ConnectionManager, contest_id: &Uuid) {
        Self::publish(redis, contest_id, "standings_updated").await;
    }

    async fn publish(mut redis: ConnectionManager, contest_id: &Uuid, kind: &str) {
        let channel = format!("contest:{}:events", contest_id);
        let payload = serde_json::json!({
            "type": kind,
            "contest_id": contest_id,
        })
        .to_string();

        if let Err(e) = redis.publish::<_, _, ()>(channel, payload).await {
            tracing::warn!(
                contest_id = %contest_id,
                event = kind,
                error = %e,
                "Failed to publish contest event"
            );
        }
    }
}
