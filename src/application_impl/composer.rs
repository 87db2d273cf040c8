use crate::application_port::ChatError;
use crate::domain_model::*;
use crate::domain_port::{RealtimeStore, StoreError};
use chrono::Utc;
use std::sync::Arc;

pub struct Composer {
    store: Arc<dyn RealtimeStore>,
    collection: String,
}

impl Composer {
    pub fn new(store: Arc<dyn RealtimeStore>, collection: &str) -> Self {
        Self {
            store,
            collection: collection.to_owned(),
        }
    }

    /// Appends `text` as a new message by the session's user, stamped with
    /// the local clock. Blank text or a missing session is a no-op
    /// (`Ok(None)`).
    pub async fn send(
        &self,
        session: Option<&Session>,
        text: &str,
    ) -> Result<Option<MessageId>, ChatError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let Some(session) = session else {
            return Ok(None);
        };

        let record = MessageRecord::compose(session, text, Utc::now());
        let value = serde_json::to_value(&record)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        match self.store.append(&self.collection, value).await {
            Ok(id) => {
                tracing::debug!(%id, "message appended");
                Ok(Some(id))
            }
            Err(e) => {
                tracing::error!(user_id = %session.user_id, "send failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryRealtimeStore;

    fn alice() -> Session {
        Session {
            user_id: UserId::generate(),
            email: Email::new("alice@student.hs-rm.de"),
        }
    }

    #[tokio::test]
    async fn blank_text_is_a_no_op() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let composer = Composer::new(store.clone(), "messages");
        let session = alice();

        for text in ["", "   ", "\n\t"] {
            assert_eq!(composer.send(Some(&session), text).await, Ok(None));
        }
        assert!(store.is_empty("messages"));
    }

    #[tokio::test]
    async fn missing_session_is_a_no_op() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let composer = Composer::new(store.clone(), "messages");

        assert_eq!(composer.send(None, "hello").await, Ok(None));
        assert!(store.is_empty("messages"));
    }

    #[tokio::test]
    async fn appends_record_with_author_and_untrimmed_text() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let composer = Composer::new(store.clone(), "messages");
        let session = alice();

        let id = composer
            .send(Some(&session), "  hello ")
            .await
            .unwrap()
            .unwrap();

        let mut whole = store.subscribe_collection("messages");
        let snapshot = whole.next().await.unwrap();
        let stored: MessageRecord =
            serde_json::from_value(snapshot.val()[id.as_str()].clone()).unwrap();
        assert_eq!(stored.text, "  hello ");
        assert_eq!(stored.uid, session.user_id);
        assert_eq!(stored.email, session.email);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let store = Arc::new(MemoryRealtimeStore::new());
        store.set_available(false);
        let composer = Composer::new(store.clone(), "messages");

        let err = composer.send(Some(&alice()), "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Store(StoreError::Unavailable(_))));
    }
}
