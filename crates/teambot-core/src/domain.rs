use serde::{Deserialize, Serialize};

/// Directory user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i64);

/// Organization id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(pub i64);

/// Chat id, used as the per-recipient delivery address.
///
/// A user without one never opened a chat with the bot and is unreachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Role space of the user directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Trainer,
    OrgAdmin,
    SuperAdmin,
}

/// A directory row for the admin driving a conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub role: Role,
    pub org_id: Option<OrgId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
}

/// A broadcast target. Always reachable by construction: the directory query
/// filters out users without a delivery address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub id: ActorId,
    pub chat_id: ChatId,
    pub display_name: String,
    pub role: Role,
}
