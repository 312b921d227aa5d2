use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workspace. The name doubles as the identifier.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationInput {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationResponse {
    pub organization: Organization,
    pub invitation_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvitationLink {
    pub id: String,
    pub organization_name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationLinkResponse {
    pub link_id: String,
    pub link: String,
    pub organization_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationInput {
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinedOrganization {
    pub organization_name: String,
    pub link_id: String,
}
