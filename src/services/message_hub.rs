use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use actix_web::web::Bytes;
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{self, Receiver, Sender, error::RecvError};

use crate::database::models::{Conversation, Message};
use crate::database::repositories::MessageStore;

const CHANNEL_CAPACITY: usize = 16;

/// Change notifications per conversation. A notification carries no
/// payload: subscribers re-read the full ordered list from the store.
#[derive(Clone, Default)]
pub struct MessageHub {
    senders: Arc<Mutex<HashMap<Conversation, Sender<()>>>>,
}

impl MessageHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, conversation: Conversation) -> Receiver<()> {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders
            .entry(conversation)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, conversation: Conversation) {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = senders.get(&conversation) {
            if sender.send(()).is_err() {
                // Every subscriber has gone away.
                senders.remove(&conversation);
            }
        }
    }

    /// Drops entries nobody listens to any more.
    pub fn prune(&self) {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.retain(|_, sender| sender.receiver_count() > 0);
    }

    pub fn subscriber_count(&self, conversation: &Conversation) -> usize {
        let senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders
            .get(conversation)
            .map_or(0, |sender| sender.receiver_count())
    }
}

/// One server-sent event holding a full snapshot as JSON.
pub fn snapshot_event(messages: &[Message]) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(messages)?;
    Ok(Bytes::from(format!("event: snapshot\ndata: {}\n\n", json)))
}

struct SnapshotState {
    store: Arc<dyn MessageStore>,
    conversation: Conversation,
    receiver: Receiver<()>,
    first: bool,
}

/// Stream of snapshot events: the current list immediately, then a fresh
/// list after every change. Ends when the hub entry closes or the store fails.
pub fn snapshot_stream(
    store: Arc<dyn MessageStore>,
    hub: &MessageHub,
    conversation: Conversation,
) -> impl Stream<Item = Result<Bytes, serde_json::Error>> + 'static {
    let state = SnapshotState {
        receiver: hub.subscribe(conversation),
        store,
        conversation,
        first: true,
    };

    stream::unfold(state, |mut state| async move {
        if !state.first {
            match state.receiver.recv().await {
                Ok(()) => {}
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "Subscriber for {:?} lagged by {} notifications",
                        state.conversation,
                        skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
        state.first = false;

        let messages = match state.store.list(&state.conversation).await {
            Ok(messages) => messages,
            Err(e) => {
                log::error!("Failed to load messages for {:?}: {}", state.conversation, e);
                return None;
            }
        };

        Some((snapshot_event(&messages), state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::NewMessage;
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn channel_message(channel_id: Uuid, text: &str) -> NewMessage {
        NewMessage {
            channel_id: Some(channel_id),
            recipient_id: None,
            sender_id: Uuid::new_v4(),
            author_name: "Ada".to_string(),
            author_photo: None,
            text: text.to_string(),
            media_url: None,
            media_type: None,
        }
    }

    fn parse(event: &Bytes) -> Vec<Message> {
        let text = std::str::from_utf8(event).unwrap();
        let data = text
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap();
        serde_json::from_str(data).unwrap()
    }

    #[tokio::test]
    async fn test_stream_emits_snapshot_then_refreshed_snapshot() {
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::default());
        let hub = MessageHub::new();
        let channel_id = Uuid::new_v4();
        let conversation = Conversation::Channel(channel_id);

        store.insert(channel_message(channel_id, "hello")).await.unwrap();

        let mut stream = Box::pin(snapshot_stream(store.clone(), &hub, conversation));

        let first = stream.next().await.unwrap().unwrap();
        let texts: Vec<String> = parse(&first).into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["hello"]);

        store.insert(channel_message(channel_id, "again")).await.unwrap();
        hub.publish(conversation);

        let second = stream.next().await.unwrap().unwrap();
        let texts: Vec<String> = parse(&second).into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["hello", "again"]);
    }

    #[tokio::test]
    async fn test_stream_waits_for_publish() {
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::default());
        let hub = MessageHub::new();
        let conversation = Conversation::Channel(Uuid::new_v4());

        let mut stream = tokio_test::task::spawn(Box::pin(snapshot_stream(
            store,
            &hub,
            conversation,
        )));

        let first = stream.next().await.unwrap().unwrap();
        assert!(parse(&first).is_empty());
        tokio_test::assert_pending!(stream.poll_next());

        hub.publish(conversation);
        assert!(stream.is_woken());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let hub = MessageHub::new();
        let conversation = Conversation::direct(Uuid::new_v4(), Uuid::new_v4());

        let receiver = hub.subscribe(conversation);
        assert_eq!(hub.subscriber_count(&conversation), 1);

        drop(receiver);
        hub.prune();
        assert_eq!(hub.subscriber_count(&conversation), 0);
        assert!(hub.senders.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_without_subscribers_is_a_no_op() {
        let hub = MessageHub::new();
        hub.publish(Conversation::Channel(Uuid::new_v4()));
        assert!(hub.senders.lock().unwrap().is_empty());
    }
}
