//! Read-only port over the persistent user/organization store.
//!
//! The broadcast module only queries the store; writes happen elsewhere in
//! the bot. A JSON-file-backed implementation is provided for wiring and
//! tests; production deployments can put a database behind the same trait.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    domain::{Actor, ActorId, ChatId, OrgId, Organization, Recipient, Role},
    Result,
};

/// Filter for recipient queries.
#[derive(Clone, Debug)]
pub struct RecipientFilter {
    /// Restrict to one organization; `None` spans all of them.
    pub org_id: Option<OrgId>,
    pub roles: Vec<Role>,
}

#[async_trait]
pub trait DirectoryPort: Send + Sync {
    async fn actor(&self, id: ActorId) -> Result<Option<Actor>>;

    async fn organization(&self, id: OrgId) -> Result<Option<Organization>>;

    /// Users matching the filter that have a delivery address. Users without
    /// one are unreachable and never returned.
    async fn recipients(&self, filter: &RecipientFilter) -> Result<Vec<Recipient>>;
}

/// A directory row as stored on disk. `chat_id` is optional: users who never
/// opened a chat with the bot have no delivery address.
#[derive(Clone, Debug, Deserialize)]
pub struct UserRecord {
    pub id: ActorId,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub org_id: Option<OrgId>,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// JSON-file-backed directory. Loaded once at startup; queries run over the
/// in-memory snapshot.
pub struct JsonDirectory {
    organizations: Vec<Organization>,
    users: Vec<UserRecord>,
}

impl JsonDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = std::fs::read_to_string(path)?;
        let file: DirectoryFile = serde_json::from_str(&txt)?;
        Ok(Self {
            organizations: file.organizations,
            users: file.users,
        })
    }
}

#[async_trait]
impl DirectoryPort for JsonDirectory {
    async fn actor(&self, id: ActorId) -> Result<Option<Actor>> {
        Ok(self.users.iter().find(|u| u.id == id).map(|u| Actor {
            id: u.id,
            name: u.name.clone(),
            role: u.role,
            org_id: u.org_id,
        }))
    }

    async fn organization(&self, id: OrgId) -> Result<Option<Organization>> {
        Ok(self.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn recipients(&self, filter: &RecipientFilter) -> Result<Vec<Recipient>> {
        Ok(self
            .users
            .iter()
            .filter(|u| match filter.org_id {
                Some(want) => u.org_id == Some(want),
                None => true,
            })
            .filter(|u| filter.roles.contains(&u.role))
            .filter_map(|u| {
                let chat_id = u.chat_id?;
                Some(Recipient {
                    id: u.id,
                    chat_id,
                    display_name: u.name.clone(),
                    role: u.role,
                })
            })
            .collect())
    }
}
