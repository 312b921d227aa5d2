use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::media::MediaUpload;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MessageMediaType {
        Image => "image",
        Video => "video",
        Audio => "audio",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub author_name: String,
    pub author_photo: Option<String>,
    pub text: String,
    pub media_url: Option<String>,
    pub media_type: Option<MessageMediaType>,
    pub created_at: DateTime<Utc>,
}

/// Which ordered message stream a read, write or subscription targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversation {
    Channel(Uuid),
    /// Stored with the smaller id first so both participants share a key.
    Direct(Uuid, Uuid),
}

impl Conversation {
    pub fn direct(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Conversation::Direct(a, b)
        } else {
            Conversation::Direct(b, a)
        }
    }

    pub fn contains(&self, message: &Message) -> bool {
        match *self {
            Conversation::Channel(id) => message.channel_id == Some(id),
            Conversation::Direct(a, b) => match message.recipient_id {
                Some(recipient) => {
                    (message.sender_id == a && recipient == b)
                        || (message.sender_id == b && recipient == a)
                }
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub channel_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub author_name: String,
    pub author_photo: Option<String>,
    pub text: String,
    pub media_url: Option<String>,
    pub media_type: Option<MessageMediaType>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    #[serde(default)]
    pub text: String,
    pub attachment: Option<MediaUpload>,
}
