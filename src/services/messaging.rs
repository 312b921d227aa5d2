use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{Conversation, Message, NewMessage, SendMessageInput, User};
use crate::database::repositories::MessageStore;
use crate::error::AppError;
use crate::services::media::MediaService;
use crate::services::message_hub::MessageHub;

/// Where a new message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Channel(Uuid),
    Direct { recipient_id: Uuid },
}

impl Destination {
    pub fn conversation(&self, sender_id: Uuid) -> Conversation {
        match *self {
            Destination::Channel(channel_id) => Conversation::Channel(channel_id),
            Destination::Direct { recipient_id } => Conversation::direct(sender_id, recipient_id),
        }
    }
}

#[derive(Clone)]
pub struct MessagingService {
    store: Arc<dyn MessageStore>,
    media: MediaService,
    hub: MessageHub,
}

impl MessagingService {
    pub fn new(store: Arc<dyn MessageStore>, media: MediaService, hub: MessageHub) -> Self {
        Self { store, media, hub }
    }

    pub fn hub(&self) -> &MessageHub {
        &self.hub
    }

    pub fn store(&self) -> Arc<dyn MessageStore> {
        self.store.clone()
    }

    pub async fn history(&self, conversation: &Conversation) -> Result<Vec<Message>, AppError> {
        Ok(self.store.list(conversation).await?)
    }

    /// Validates, stores the attachment if any, appends the message and
    /// wakes every subscriber of the conversation.
    pub async fn send(
        &self,
        destination: Destination,
        sender: &User,
        input: SendMessageInput,
    ) -> Result<Message, AppError> {
        let text = input.text.trim().to_string();
        if text.is_empty() && input.attachment.is_none() {
            return Err(AppError::BadRequest("Message cannot be empty.".into()));
        }

        let (media_url, media_type) = match input.attachment {
            Some(ref attachment) => {
                let media_type = attachment.kind.message_media_type().ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Attachments must be image, video or audio, not {}",
                        attachment.kind
                    ))
                })?;
                let object = self.media.upload(attachment, sender.id).await?;
                (Some(object.url), Some(media_type))
            }
            None => (None, None),
        };

        let (channel_id, recipient_id) = match destination {
            Destination::Channel(channel_id) => (Some(channel_id), None),
            Destination::Direct { recipient_id } => (None, Some(recipient_id)),
        };

        let message = self
            .store
            .insert(NewMessage {
                channel_id,
                recipient_id,
                sender_id: sender.id,
                author_name: sender.display_name.clone(),
                author_photo: sender.photo_url.clone(),
                text,
                media_url,
                media_type,
            })
            .await?;

        self.hub.publish(destination.conversation(sender.id));
        Ok(message)
    }
}
