use std::sync::Arc;

use crate::{
    directory::{DirectoryPort, RecipientFilter},
    domain::Recipient,
    Result,
};

use super::scope::BroadcastScope;

/// Turns a scope into the set of reachable recipients.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn DirectoryPort>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn DirectoryPort>) -> Self {
        Self { directory }
    }

    /// Resolve the reachable recipients for a scope.
    ///
    /// An empty result is a valid, reportable outcome ("no recipients"),
    /// not an error.
    pub async fn resolve(&self, scope: &BroadcastScope) -> Result<Vec<Recipient>> {
        let filter = RecipientFilter {
            org_id: scope.org_id(),
            roles: scope.allowed_roles().to_vec(),
        };
        self.directory.recipients(&filter).await
    }

    /// Entry-time recipient count shown in prompts. Display estimate only;
    /// the dispatch path re-resolves at confirmation time.
    pub async fn estimate(&self, scope: &BroadcastScope) -> Result<usize> {
        Ok(self.resolve(scope).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, ActorId, ChatId, OrgId, Organization, Role};
    use async_trait::async_trait;

    struct TwoOrgDirectory;

    #[async_trait]
    impl DirectoryPort for TwoOrgDirectory {
        async fn actor(&self, _id: ActorId) -> Result<Option<Actor>> {
            Ok(None)
        }

        async fn organization(&self, _id: OrgId) -> Result<Option<Organization>> {
            Ok(None)
        }

        async fn recipients(&self, filter: &RecipientFilter) -> Result<Vec<Recipient>> {
            let all = vec![
                (Some(OrgId(1)), Role::Member, 10),
                (Some(OrgId(1)), Role::Trainer, 11),
                (Some(OrgId(1)), Role::OrgAdmin, 12),
                (Some(OrgId(2)), Role::Member, 20),
            ];
            Ok(all
                .into_iter()
                .filter(|(org, _, _)| match filter.org_id {
                    Some(want) => *org == Some(want),
                    None => true,
                })
                .filter(|(_, role, _)| filter.roles.contains(role))
                .map(|(_, role, id)| Recipient {
                    id: ActorId(id),
                    chat_id: ChatId(id * 100),
                    display_name: format!("user-{id}"),
                    role,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn org_scope_excludes_admins_and_other_orgs() {
        let resolver = RecipientResolver::new(Arc::new(TwoOrgDirectory));
        let scope = BroadcastScope::Organization {
            org_id: OrgId(1),
            org_name: "One".to_string(),
        };

        let got = resolver.resolve(&scope).await.unwrap();
        let ids: Vec<i64> = got.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(resolver.estimate(&scope).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn global_scope_includes_org_admins_across_orgs() {
        let resolver = RecipientResolver::new(Arc::new(TwoOrgDirectory));

        let got = resolver.resolve(&BroadcastScope::Global).await.unwrap();
        let ids: Vec<i64> = got.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![10, 11, 12, 20]);
    }
}
