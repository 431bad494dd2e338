use crate::reducer::ConflictPolicy;

/// Settings for a [`TodoStore`](super::TodoStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Identifies the store in logs.
    pub store_id: String,
    pub conflict_policy: ConflictPolicy,
    /// Refresh the store's checkpoint after this many commits. `None` disables it.
    pub checkpoint_every: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_id: "todos".to_string(),
            conflict_policy: ConflictPolicy::default(),
            checkpoint_every: None,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = store_id.into();
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// A frequency of zero disables automatic checkpoints.
    pub fn with_checkpoint_every(mut self, commits: u64) -> Self {
        self.checkpoint_every = (commits > 0).then_some(commits);
        self
    }
}
