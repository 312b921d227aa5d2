use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ChannelVisibility {
        Public => "public",
        Private => "private",
    }
}

impl Default for ChannelVisibility {
    fn default() -> Self {
        ChannelVisibility::Public
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Uuid,
    pub organization_name: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: ChannelVisibility,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    /// Public channels are open to every organization member; private
    /// channels only to their listed members. Organization membership is
    /// checked by the caller.
    pub fn admits(&self, user_id: Uuid) -> bool {
        match self.visibility {
            ChannelVisibility::Public => true,
            ChannelVisibility::Private => self.members.contains(&user_id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelInput {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: ChannelVisibility,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewChannel {
    pub organization_name: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: ChannelVisibility,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub search: Option<String>,
}
