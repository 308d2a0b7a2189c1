//! Transitive group membership.

use std::collections::{HashSet, VecDeque};

use login_resolver_sdk::{DirectoryConnection, SearchScope};

/// Expand `direct` groups into their transitive closure.
///
/// Each group entry is read once and its `group_attribute` values are
/// queued. DNs are compared case-insensitively; a group seen before is
/// not expanded again, which is what makes cyclic graphs terminate.
/// Groups that cannot be read stay in the result but are not expanded.
///
/// There is no depth limit. Callers that face hostile directories should
/// wrap the login in a timeout.
pub async fn resolve_group_closure(
    conn: &mut dyn DirectoryConnection,
    direct: &[String],
    group_attribute: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    for group in direct {
        if seen.insert(group.to_ascii_lowercase()) {
            queue.push_back(group.clone());
        }
    }

    let mut closure = Vec::new();
    while let Some(group) = queue.pop_front() {
        match conn
            .search(&group, "(objectClass=*)", SearchScope::Base, &[group_attribute])
            .await
        {
            Ok(entries) => {
                for parent in entries.iter().flat_map(|e| e.values(group_attribute)) {
                    if seen.insert(parent.to_ascii_lowercase()) {
                        tracing::debug!(
                            group = %group,
                            parent = %parent,
                            "discovered nested group"
                        );
                        queue.push_back(parent.clone());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(
                    group = %group,
                    error = %e,
                    "group entry not readable; not expanding"
                );
            }
        }
        closure.push(group);
    }
    closure
}
