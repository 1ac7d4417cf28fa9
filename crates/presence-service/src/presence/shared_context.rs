//! Shared group membership between a viewer and its targets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use presence_core::result::AppResult;

use crate::store::MembershipSource;

/// Decides, per (viewer, target), whether they share at least one group.
#[derive(Debug, Clone)]
pub struct SharedContextResolver {
    memberships: Arc<dyn MembershipSource>,
}

impl SharedContextResolver {
    /// Creates a resolver over the group membership provider.
    pub fn new(memberships: Arc<dyn MembershipSource>) -> Self {
        Self { memberships }
    }

    /// Groups of a single user.
    pub async fn groups_of(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let mut groups = self.memberships.groups_of(&[user_id]).await?;
        Ok(groups.remove(&user_id).unwrap_or_default())
    }

    /// Shared-context flag for each target, from one batched membership
    /// load covering the viewer and all targets.
    pub async fn resolve(&self, viewer: Uuid, targets: &[Uuid]) -> AppResult<HashMap<Uuid, bool>> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }

        let mut ids = Vec::with_capacity(targets.len() + 1);
        ids.push(viewer);
        ids.extend(targets.iter().copied().filter(|t| *t != viewer));

        let groups = self.memberships.groups_of(&ids).await?;
        let empty = HashSet::new();
        let viewer_groups = groups.get(&viewer).unwrap_or(&empty);

        Ok(targets
            .iter()
            .map(|target| {
                let shared = groups
                    .get(target)
                    .is_some_and(|g| !g.is_disjoint(viewer_groups));
                (*target, shared)
            })
            .collect())
    }
}
