//! Best-effort conversation persistence.
//!
//! The recorder is the single place where store failures are absorbed:
//! every error is logged at `warn` and swallowed, so the webhook reply
//! never depends on a write having succeeded.

use std::sync::Arc;

use tracing::warn;

use {
    remora_reply::DeliveryPlan,
    remora_store::{ConversationStore, Direction},
};

/// The thread opened for one inbound/outbound exchange. Carries the
/// last timestamp handed out so every row in the thread stays strictly
/// ordered even when the wall clock stalls.
#[derive(Debug)]
pub struct ThreadHandle {
    thread_id: String,
    last_sent_at: i64,
}

#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn ConversationStore>,
}

impl Recorder {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Persist an inbound message under a fresh thread. `None` means the
    /// thread could not be opened and the rest of this exchange goes
    /// unrecorded.
    pub async fn record_inbound(
        &self,
        token: &str,
        provider_sid: Option<&str>,
        body: &str,
    ) -> Option<ThreadHandle> {
        let identity = match self.store.ensure_identity(token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(token, "failed to store identity: {e}");
                return None;
            },
        };
        let thread = match self.store.open_thread(&identity.id, provider_sid).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(token, "failed to open thread: {e}");
                return None;
            },
        };

        let sent_at = now_ms();
        if let Err(e) = self
            .store
            .append_message(&thread.id, provider_sid, Direction::Inbound, body, sent_at)
            .await
        {
            warn!(thread_id = thread.id, "failed to store inbound message: {e}");
        }

        Some(ThreadHandle {
            thread_id: thread.id,
            last_sent_at: sent_at,
        })
    }

    /// Persist the real segments of a delivery plan in send order, note
    /// the split for multi-part replies, then close the thread.
    pub async fn record_outbound(&self, handle: ThreadHandle, plan: &DeliveryPlan) {
        let ThreadHandle {
            thread_id,
            mut last_sent_at,
        } = handle;

        let segments: Vec<_> = plan.segments().collect();
        let total = segments.len();

        for segment in segments {
            last_sent_at = next_after(last_sent_at);
            if let Err(e) = self
                .store
                .append_message(
                    &thread_id,
                    None,
                    Direction::Outbound,
                    &segment.body,
                    last_sent_at,
                )
                .await
            {
                warn!(
                    thread_id,
                    position = segment.position,
                    "failed to store reply segment: {e}"
                );
            }
        }

        if total > 1 {
            last_sent_at = next_after(last_sent_at);
            let note = format!("reply split into {total} parts");
            if let Err(e) = self
                .store
                .append_message(&thread_id, None, Direction::System, &note, last_sent_at)
                .await
            {
                warn!(thread_id, "failed to store split note: {e}");
            }
        }

        if let Err(e) = self.store.close_thread(&thread_id, next_after(last_sent_at)).await {
            warn!(thread_id, "failed to close thread: {e}");
        }
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Wall clock, bumped past `last` when the clock has not advanced.
fn next_after(last: i64) -> i64 {
    now_ms().max(last + 1)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        remora_reply::{PacingConfig, Segment, schedule},
        remora_store::SqliteConversationStore,
        sqlx::SqlitePool,
    };

    use super::*;

    async fn recorder_with_pool() -> (Recorder, Arc<dyn ConversationStore>, SqlitePool) {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteConversationStore::init(&pool).await.unwrap();
        let store: Arc<dyn ConversationStore> =
            Arc::new(SqliteConversationStore::new(pool.clone()));
        (Recorder::new(Arc::clone(&store)), store, pool)
    }

    fn part(body: &str, position: usize, total: usize) -> Segment {
        Segment {
            body: body.to_string(),
            position,
            total,
        }
    }

    #[tokio::test]
    async fn exchange_rows_stay_strictly_ordered() {
        let (recorder, store, _pool) = recorder_with_pool().await;

        let handle = recorder
            .record_inbound("+15550100", Some("SM100"), "hi there")
            .await
            .unwrap();
        let plan = schedule(
            vec![part("(1/2) one", 1, 2), part("(2/2) two", 2, 2)],
            &PacingConfig::default(),
        );
        recorder.record_outbound(handle, &plan).await;

        let identity = store.list_identities().await.unwrap().remove(0);
        let thread = store.list_threads(&identity.id).await.unwrap().remove(0);
        let messages = store.list_messages(&thread.id).await.unwrap();

        let directions: Vec<Direction> = messages.iter().map(|m| m.direction).collect();
        assert_eq!(directions, vec![
            Direction::Inbound,
            Direction::Outbound,
            Direction::Outbound,
            Direction::System,
        ]);
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec![
            "hi there",
            "(1/2) one",
            "(2/2) two",
            "reply split into 2 parts",
        ]);
        assert!(messages.windows(2).all(|w| w[0].sent_at < w[1].sent_at));
    }

    #[tokio::test]
    async fn single_part_reply_records_no_split_note() {
        let (recorder, store, _pool) = recorder_with_pool().await;

        let handle = recorder.record_inbound("+15550100", None, "hi").await.unwrap();
        let plan = schedule(vec![part("short answer", 1, 1)], &PacingConfig::default());
        recorder.record_outbound(handle, &plan).await;

        let identity = store.list_identities().await.unwrap().remove(0);
        let thread = store.list_threads(&identity.id).await.unwrap().remove(0);
        assert!(thread.ended_at.is_some());

        let messages = store.list_messages(&thread.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.direction != Direction::System));
    }

    #[tokio::test]
    async fn sender_sid_lands_on_thread_and_inbound_row() {
        let (recorder, store, _pool) = recorder_with_pool().await;

        recorder.record_inbound("+15550100", Some("SM42"), "hi").await.unwrap();

        let identity = store.list_identities().await.unwrap().remove(0);
        let thread = store.list_threads(&identity.id).await.unwrap().remove(0);
        assert_eq!(thread.provider_sid.as_deref(), Some("SM42"));

        let messages = store.list_messages(&thread.id).await.unwrap();
        assert_eq!(messages[0].provider_sid.as_deref(), Some("SM42"));
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let (recorder, _store, pool) = recorder_with_pool().await;
        pool.close().await;

        assert!(recorder.record_inbound("+15550100", None, "hi").await.is_none());
    }
}
