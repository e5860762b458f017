// Blacklist service - core business logic of the moderation filter.
//
// This service handles:
// - Loading both block-lists at startup (absorbing storage failures)
// - The interception decision for inbound messages
// - Add / remove / clear with capacity and duplicate checks
//
// NO Discord dependencies here - just pure domain logic.

use super::blacklist_models::{
    AddResult, BlacklistConfig, BlacklistKind, ClearedCounts, InboundMessage, ListScope,
    RemoveResult, ViewError,
};
use super::blacklist_store::BlacklistStore;
use std::collections::HashSet;
use tokio::sync::RwLock;

// ============================================================================
// POLICY ENGINE
// ============================================================================

/// Decide whether a message must be intercepted.
///
/// Scope toggles are checked first, then the user list (which wins over the
/// group list), then the group list for group messages.
pub fn should_intercept(
    sender_id: &str,
    group_id: Option<&str>,
    is_private: bool,
    config: &BlacklistConfig,
    users: &HashSet<String>,
    groups: &HashSet<String>,
) -> bool {
    if is_private && !config.intercept_private_chat {
        return false;
    }
    if !is_private && !config.intercept_group_chat {
        return false;
    }

    if users.contains(sender_id) {
        if config.show_interception_log {
            tracing::info!(sender_id, "Intercepted message from blacklisted user");
        }
        return true;
    }

    if !is_private {
        if let Some(group_id) = group_id.filter(|id| groups.contains(*id)) {
            if config.show_interception_log {
                tracing::info!(group_id, "Intercepted message from blacklisted group");
            }
            return true;
        }
    }

    false
}

fn extract_fields(
    message: &impl InboundMessage,
) -> Result<(String, Option<String>, bool), ViewError> {
    Ok((
        message.sender_id()?,
        message.group_id()?,
        message.is_private()?,
    ))
}

// ============================================================================
// CORE SERVICE
// ============================================================================

#[derive(Debug, Default)]
struct BlacklistState {
    users: HashSet<String>,
    groups: HashSet<String>,
}

impl BlacklistState {
    fn list(&self, kind: BlacklistKind) -> &HashSet<String> {
        match kind {
            BlacklistKind::User => &self.users,
            BlacklistKind::Group => &self.groups,
        }
    }

    fn list_mut(&mut self, kind: BlacklistKind) -> &mut HashSet<String> {
        match kind {
            BlacklistKind::User => &mut self.users,
            BlacklistKind::Group => &mut self.groups,
        }
    }
}

/// Owns both block-lists and the filter configuration.
///
/// Mutations hold the write lock across check, update and save, so
/// concurrent commands cannot push a list past its capacity.
pub struct BlacklistService<S: BlacklistStore> {
    store: S,
    config: BlacklistConfig,
    state: RwLock<BlacklistState>,
}

impl<S: BlacklistStore> BlacklistService<S> {
    /// Create the service and load both lists from the store.
    ///
    /// A list that cannot be loaded starts empty.
    pub async fn new(store: S, config: BlacklistConfig) -> Self {
        let mut state = BlacklistState::default();
        for kind in BlacklistKind::ALL {
            match store.load(kind).await {
                Ok(ids) => {
                    tracing::info!(list = %kind, count = ids.len(), "Loaded blacklist");
                    *state.list_mut(kind) = ids;
                }
                Err(e) => {
                    tracing::error!("Failed to load {} blacklist, starting empty: {}", kind, e);
                }
            }
        }

        Self {
            store,
            config,
            state: RwLock::new(state),
        }
    }

    pub fn config(&self) -> &BlacklistConfig {
        &self.config
    }

    /// Check an inbound message. Extraction failures fail open.
    pub async fn is_blacklisted(&self, message: &impl InboundMessage) -> bool {
        let (sender_id, group_id, is_private) = match extract_fields(message) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Could not inspect message, letting it through: {}", e);
                return false;
            }
        };

        let state = self.state.read().await;
        should_intercept(
            &sender_id,
            group_id.as_deref(),
            is_private,
            &self.config,
            &state.users,
            &state.groups,
        )
    }

    pub async fn add(&self, kind: BlacklistKind, id: &str) -> AddResult {
        let mut state = self.state.write().await;
        let list = state.list_mut(kind);

        if list.contains(id) {
            return AddResult::Duplicate;
        }
        // The same cap applies to both lists.
        if list.len() >= self.config.max_blacklist_size {
            return AddResult::AtCapacity;
        }

        list.insert(id.to_string());
        self.persist(kind, list).await;
        AddResult::Added
    }

    pub async fn remove(&self, kind: BlacklistKind, id: &str) -> RemoveResult {
        let mut state = self.state.write().await;
        let list = state.list_mut(kind);

        if !list.remove(id) {
            return RemoveResult::NotPresent;
        }

        self.persist(kind, list).await;
        RemoveResult::Removed
    }

    pub async fn clear(&self, scope: ListScope) -> ClearedCounts {
        let mut state = self.state.write().await;
        let mut counts = ClearedCounts::default();

        for &kind in scope.kinds() {
            let list = state.list_mut(kind);
            let removed = list.len();
            list.clear();
            self.persist(kind, list).await;

            match kind {
                BlacklistKind::User => counts.users = removed,
                BlacklistKind::Group => counts.groups = removed,
            }
        }

        counts
    }

    /// Ids of one list, sorted for display.
    pub async fn sorted_ids(&self, kind: BlacklistKind) -> Vec<String> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.list(kind).iter().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn count(&self, kind: BlacklistKind) -> usize {
        self.state.read().await.list(kind).len()
    }

    /// Save a list; failures are logged and the in-memory state is kept.
    async fn persist(&self, kind: BlacklistKind, ids: &HashSet<String>) {
        match self.store.save(kind, ids).await {
            Ok(()) => tracing::info!(list = %kind, count = ids.len(), "Saved blacklist"),
            Err(e) => tracing::error!("Failed to save {} blacklist: {}", kind, e),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blacklist::blacklist_models::InboundMessageView;
    use crate::core::blacklist::blacklist_store::mock::MockBlacklistStore;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn config_with_capacity(max_blacklist_size: usize) -> BlacklistConfig {
        BlacklistConfig {
            max_blacklist_size,
            ..Default::default()
        }
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    /// View whose sender lookup always fails.
    struct BrokenView;

    impl InboundMessage for BrokenView {
        fn sender_id(&self) -> Result<String, ViewError> {
            Err(ViewError("sender".to_string()))
        }

        fn group_id(&self) -> Result<Option<String>, ViewError> {
            Ok(Some("g1".to_string()))
        }

        fn is_private(&self) -> Result<bool, ViewError> {
            Ok(false)
        }
    }

    #[test]
    fn test_policy_user_block_wins_in_any_group() {
        let config = BlacklistConfig::default();
        let users = set(&["u1"]);
        let groups = set(&[]);

        assert!(should_intercept("u1", Some("g9"), false, &config, &users, &groups));
        assert!(should_intercept("u1", None, true, &config, &users, &groups));
    }

    #[test]
    fn test_policy_group_block_only_applies_to_group_messages() {
        let config = BlacklistConfig::default();
        let users = set(&[]);
        let groups = set(&["g1"]);

        assert!(should_intercept("u2", Some("g1"), false, &config, &users, &groups));
        assert!(!should_intercept("u2", Some("g1"), true, &config, &users, &groups));
        assert!(!should_intercept("u2", Some("g2"), false, &config, &users, &groups));
        assert!(!should_intercept("u2", None, false, &config, &users, &groups));
    }

    #[test]
    fn test_policy_scope_gating() {
        let users = set(&["u1"]);
        let groups = set(&["g1"]);

        let no_private = BlacklistConfig {
            intercept_private_chat: false,
            ..Default::default()
        };
        assert!(!should_intercept("u1", None, true, &no_private, &users, &groups));
        assert!(should_intercept("u1", Some("g1"), false, &no_private, &users, &groups));

        let no_group = BlacklistConfig {
            intercept_group_chat: false,
            ..Default::default()
        };
        assert!(!should_intercept("u2", Some("g1"), false, &no_group, &users, &groups));
        assert!(!should_intercept("u1", Some("g1"), false, &no_group, &users, &groups));
        assert!(should_intercept("u1", None, true, &no_group, &users, &groups));
    }

    #[tokio::test]
    async fn test_loads_existing_lists() {
        let store = MockBlacklistStore::with_ids(BlacklistKind::User, &["b", "a"]);
        let service = BlacklistService::new(store, BlacklistConfig::default()).await;

        assert_eq!(service.sorted_ids(BlacklistKind::User).await, vec!["a", "b"]);
        assert_eq!(service.count(BlacklistKind::Group).await, 0);
    }

    #[tokio::test]
    async fn test_load_failure_starts_empty() {
        let service =
            BlacklistService::new(MockBlacklistStore::failing(), BlacklistConfig::default())
                .await;

        assert_eq!(service.count(BlacklistKind::User).await, 0);
        assert_eq!(service.count(BlacklistKind::Group).await, 0);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;

        assert_eq!(service.add(BlacklistKind::User, "111").await, AddResult::Added);
        assert_eq!(
            service.add(BlacklistKind::User, "111").await,
            AddResult::Duplicate
        );
        assert_eq!(service.count(BlacklistKind::User).await, 1);
    }

    #[tokio::test]
    async fn test_capacity_is_enforced_per_list() {
        let service = BlacklistService::new(MockBlacklistStore::new(), config_with_capacity(2)).await;

        assert_eq!(service.add(BlacklistKind::User, "1").await, AddResult::Added);
        assert_eq!(service.add(BlacklistKind::User, "2").await, AddResult::Added);
        assert_eq!(
            service.add(BlacklistKind::User, "3").await,
            AddResult::AtCapacity
        );
        // A duplicate at capacity is still reported as a duplicate
        assert_eq!(
            service.add(BlacklistKind::User, "2").await,
            AddResult::Duplicate
        );
        assert_eq!(service.count(BlacklistKind::User).await, 2);

        // The group list has its own entries under the same cap
        assert_eq!(service.add(BlacklistKind::Group, "g").await, AddResult::Added);
    }

    #[tokio::test]
    async fn test_concurrent_adds_never_exceed_capacity() {
        let service = Arc::new(
            BlacklistService::new(MockBlacklistStore::new(), config_with_capacity(10)).await,
        );

        let mut handles = Vec::new();
        for i in 0..50 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.add(BlacklistKind::User, &i.to_string()).await
            }));
        }

        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap() == AddResult::Added {
                added += 1;
            }
        }

        assert_eq!(added, 10);
        assert_eq!(service.count(BlacklistKind::User).await, 10);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;

        service.add(BlacklistKind::User, "111").await;
        service.add(BlacklistKind::Group, "g1").await;
        assert_eq!(service.store.saved(BlacklistKind::User), set(&["111"]));
        assert_eq!(service.store.saved(BlacklistKind::Group), set(&["g1"]));

        assert_eq!(
            service.remove(BlacklistKind::User, "111").await,
            RemoveResult::Removed
        );
        assert!(service.store.saved(BlacklistKind::User).is_empty());

        // Rejected operations do not touch storage
        let saves = service.store.saves.load(Ordering::SeqCst);
        service.add(BlacklistKind::Group, "g1").await;
        service.remove(BlacklistKind::User, "missing").await;
        assert_eq!(service.store.saves.load(Ordering::SeqCst), saves);
    }

    #[tokio::test]
    async fn test_remove_missing_id() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;

        assert_eq!(
            service.remove(BlacklistKind::Group, "nope").await,
            RemoveResult::NotPresent
        );
    }

    #[tokio::test]
    async fn test_clear_reports_counts() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;
        service.add(BlacklistKind::User, "1").await;
        service.add(BlacklistKind::User, "2").await;
        service.add(BlacklistKind::Group, "g").await;

        let counts = service.clear(ListScope::User).await;
        assert_eq!(counts, ClearedCounts { users: 2, groups: 0 });
        assert_eq!(service.count(BlacklistKind::Group).await, 1);

        let counts = service.clear(ListScope::All).await;
        assert_eq!(counts, ClearedCounts { users: 0, groups: 1 });
        assert_eq!(service.count(BlacklistKind::Group).await, 0);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_memory_state() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;
        service.store.failing.store(true, Ordering::SeqCst);

        assert_eq!(service.add(BlacklistKind::User, "111").await, AddResult::Added);
        assert!(
            service
                .is_blacklisted(&InboundMessageView::private("111"))
                .await
        );
    }

    #[tokio::test]
    async fn test_is_blacklisted_uses_loaded_lists() {
        let service =
            BlacklistService::new(MockBlacklistStore::new(), BlacklistConfig::default()).await;
        service.add(BlacklistKind::User, "bad").await;
        service.add(BlacklistKind::Group, "noisy").await;

        assert!(
            service
                .is_blacklisted(&InboundMessageView::group("bad", "quiet"))
                .await
        );
        assert!(
            service
                .is_blacklisted(&InboundMessageView::group("good", "noisy"))
                .await
        );
        assert!(
            !service
                .is_blacklisted(&InboundMessageView::group("good", "quiet"))
                .await
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_fails_open() {
        let store = MockBlacklistStore::with_ids(BlacklistKind::Group, &["g1"]);
        let service = BlacklistService::new(store, BlacklistConfig::default()).await;

        assert!(!service.is_blacklisted(&BrokenView).await);
    }
}
