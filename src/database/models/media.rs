use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use super::message::MessageMediaType;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MediaKind {
        Image => "image",
        Video => "video",
        Audio => "audio",
        Document => "document",
        Avatar => "avatar",
    }
}

impl MediaKind {
    /// Storage folder blobs of this kind are written under.
    pub fn folder(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Audio => "audio",
            MediaKind::Document => "documents",
            MediaKind::Avatar => "profiles",
        }
    }

    pub fn message_media_type(&self) -> Option<MessageMediaType> {
        match self {
            MediaKind::Image => Some(MessageMediaType::Image),
            MediaKind::Video => Some(MessageMediaType::Video),
            MediaKind::Audio => Some(MessageMediaType::Audio),
            MediaKind::Document | MediaKind::Avatar => None,
        }
    }
}

/// Inline upload: the blob travels base64-encoded inside the JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub content_type: String,
    pub data: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaObject {
    pub path: String,
    pub url: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub size: usize,
}
