use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::StoreConfig;
use super::error::StoreError;
use crate::event::{EventRecord, TodoEvent};
use crate::reducer::Reducer;
use crate::schema::EventRegistry;
use crate::snapshot::{Checkpoint, Snapshot, TodoRow};

const TODOS_CHANGED: &str = "todos_changed";

/// Delivered to subscribers after a commit that changed at least one row.
///
/// Notifications are delivered on background threads and may arrive out of order;
/// `sequence` lets a listener drop a stale one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosChanged {
    pub sequence: u64,
    /// All live todos, newest first.
    pub todos: Vec<TodoRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct State {
    snapshot: Snapshot,
    /// Records committed since the store was opened or restored.
    history: Vec<EventRecord>,
    /// Sequence of the last event folded into `snapshot`.
    sequence: u64,
    commits_since_checkpoint: u64,
    latest_checkpoint: Option<Checkpoint>,
    closed: bool,
}

struct Listeners {
    emitter: EventEmitter,
    ids: HashSet<String>,
}

struct Inner {
    config: StoreConfig,
    registry: EventRegistry,
    reducer: Reducer,
    state: RwLock<State>,
    listeners: Mutex<Listeners>,
}

/// An explicitly owned handle to one todo list's state.
///
/// Clones share the same store. All mutation goes through `commit*`, which validates the
/// event, materializes it, appends it to the history and notifies subscribers.
#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoStore")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Live todos ordered by `createdAt` descending, ties broken by id.
fn newest_first(snapshot: &Snapshot) -> Vec<TodoRow> {
    let mut todos: Vec<TodoRow> = snapshot.rows().cloned().collect();
    todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    todos
}

impl TodoStore {
    /// Create an empty store with the standard todo event schema.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        Self::open_at(config, Snapshot::new(), None)
    }

    /// Rebuild a store by replaying `records` from the empty snapshot.
    ///
    /// Every record is validated and sequences must run 1, 2, 3, ... without gaps;
    /// one bad record fails the whole recovery.
    pub fn from_history(
        config: StoreConfig,
        records: impl IntoIterator<Item = EventRecord>,
    ) -> Result<Self, StoreError> {
        let store = Self::open(config)?;
        store.load(0, records)?;
        Ok(store)
    }

    /// Rebuild a store from `checkpoint`, then replay the records after it.
    ///
    /// Records at or below the checkpoint's sequence are already in the checkpoint and skipped.
    /// The rest must continue the checkpoint's sequence without gaps.
    pub fn restore(
        config: StoreConfig,
        checkpoint: Checkpoint,
        records: impl IntoIterator<Item = EventRecord>,
    ) -> Result<Self, StoreError> {
        let snapshot = checkpoint.snapshot()?;
        let after = checkpoint.sequence;
        let store = Self::open_at(config, snapshot, Some(checkpoint))?;
        store.load(after, records.into_iter().filter(|record| record.sequence > after))?;
        Ok(store)
    }

    fn open_at(
        config: StoreConfig,
        snapshot: Snapshot,
        checkpoint: Option<Checkpoint>,
    ) -> Result<Self, StoreError> {
        let registry = EventRegistry::todos()?;
        let sequence = checkpoint.as_ref().map_or(0, |c| c.sequence);
        info!(
            store = %config.store_id,
            sequence,
            todos = snapshot.len(),
            "opened todo store"
        );

        Ok(TodoStore {
            inner: Arc::new(Inner {
                reducer: Reducer::new(config.conflict_policy),
                config,
                registry,
                state: RwLock::new(State {
                    snapshot,
                    history: Vec::new(),
                    sequence,
                    commits_since_checkpoint: 0,
                    latest_checkpoint: checkpoint,
                    closed: false,
                }),
                listeners: Mutex::new(Listeners {
                    emitter: EventEmitter::new(),
                    ids: HashSet::new(),
                }),
            }),
        })
    }

    fn load(
        &self,
        after: u64,
        records: impl IntoIterator<Item = EventRecord>,
    ) -> Result<(), StoreError> {
        let mut expected = after + 1;
        let mut events = Vec::new();
        for record in records {
            if record.sequence != expected {
                warn!(
                    store = %self.inner.config.store_id,
                    expected,
                    found = record.sequence,
                    "history has a gap"
                );
                return Err(StoreError::SequenceGap {
                    expected,
                    found: record.sequence,
                });
            }
            events.push(self.inner.registry.decode(&record)?);
            expected += 1;
        }
        if !events.is_empty() {
            self.commit_all(events)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.inner.registry
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .state
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .state
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))
    }

    fn listeners(&self) -> Result<MutexGuard<'_, Listeners>, StoreError> {
        self.inner
            .listeners
            .lock()
            .map_err(|_| StoreError::LockPoisoned("listeners"))
    }

    /// Commit one event. Returns its sequence in the history.
    pub fn commit(&self, event: TodoEvent) -> Result<u64, StoreError> {
        self.commit_all([event])
    }

    /// Commit a batch atomically: either every event is applied or none is.
    ///
    /// Returns the sequence of the last event. Subscribers are notified once.
    pub fn commit_all(
        &self,
        events: impl IntoIterator<Item = TodoEvent>,
    ) -> Result<u64, StoreError> {
        let events: Vec<TodoEvent> = events.into_iter().collect();
        for event in &events {
            if let Err(err) = event.validate() {
                warn!(store = %self.inner.config.store_id, error = %err, "commit rejected");
                return Err(err.into());
            }
        }

        let (sequence, notification) = {
            let mut state = self.write()?;
            if state.closed {
                return Err(StoreError::Closed);
            }
            if events.is_empty() {
                return Ok(state.sequence);
            }

            let mut next = state.snapshot.clone();
            let mut changed = 0;
            for event in &events {
                changed += self
                    .inner
                    .reducer
                    .apply_in_place(&mut next, event)
                    .inspect_err(|err| {
                        warn!(store = %self.inner.config.store_id, error = %err, "commit rejected");
                    })?;
            }

            state.snapshot = next;
            for event in &events {
                state.sequence += 1;
                let record = event.to_record(state.sequence);
                debug!(
                    store = %self.inner.config.store_id,
                    sequence = record.sequence,
                    event = %record.name,
                    "committed"
                );
                state.history.push(record);
            }
            self.refresh_checkpoint(&mut state, events.len() as u64);

            let notification = (changed > 0).then(|| TodosChanged {
                sequence: state.sequence,
                todos: newest_first(&state.snapshot),
            });
            (state.sequence, notification)
        };

        if let Some(change) = notification {
            if let Err(err) = self.notify(change) {
                warn!(
                    store = %self.inner.config.store_id,
                    sequence,
                    error = %err,
                    "notify failed"
                );
            }
        }
        Ok(sequence)
    }

    /// Commit an event that arrived as an untyped record, e.g. from the sync layer.
    ///
    /// The record's own sequence is not kept; the store assigns the next local one.
    pub fn commit_record(&self, record: &EventRecord) -> Result<u64, StoreError> {
        let event = self.inner.registry.decode(record).inspect_err(|err| {
            warn!(
                store = %self.inner.config.store_id,
                record = record.sequence,
                error = %err,
                "record rejected"
            );
        })?;
        self.commit(event)
    }

    fn refresh_checkpoint(&self, state: &mut State, committed: u64) {
        let Some(every) = self.inner.config.checkpoint_every else {
            return;
        };
        state.commits_since_checkpoint += committed;
        if state.commits_since_checkpoint < every {
            return;
        }
        match Checkpoint::capture(&state.snapshot, state.sequence) {
            Ok(checkpoint) => {
                debug!(
                    store = %self.inner.config.store_id,
                    sequence = checkpoint.sequence,
                    "checkpoint refreshed"
                );
                state.latest_checkpoint = Some(checkpoint);
                state.commits_since_checkpoint = 0;
            }
            // The commit itself already succeeded; try again on the next one.
            Err(err) => warn!(store = %self.inner.config.store_id, error = %err, "checkpoint failed"),
        }
    }

    fn notify(&self, change: TodosChanged) -> Result<(), StoreError> {
        let data = serde_json::to_string(&change).map_err(|e| StoreError::Notify(e.to_string()))?;
        let mut listeners = self.listeners()?;
        if !listeners.ids.is_empty() {
            listeners.emitter.emit(TODOS_CHANGED, data);
        }
        Ok(())
    }

    /// Register `listener` for change notifications.
    pub fn subscribe<F>(&self, listener: F) -> Result<SubscriptionId, StoreError>
    where
        F: Fn(TodosChanged) + Send + Sync + 'static,
    {
        let state = self.read()?;
        if state.closed {
            return Err(StoreError::Closed);
        }
        let mut listeners = self.listeners()?;
        let store_id = self.inner.config.store_id.clone();
        let id = listeners.emitter.on(TODOS_CHANGED, move |data: String| {
            match serde_json::from_str::<TodosChanged>(&data) {
                Ok(change) => listener(change),
                Err(err) => warn!(store = %store_id, error = %err, "dropped malformed notification"),
            }
        });
        listeners.ids.insert(id.clone());
        debug!(store = %self.inner.config.store_id, subscription = %id, "subscribed");
        Ok(SubscriptionId(id))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> Result<bool, StoreError> {
        let mut listeners = self.listeners()?;
        if !listeners.ids.remove(&id.0) {
            return Ok(false);
        }
        listeners.emitter.remove_listener(&id.0);
        Ok(true)
    }

    pub fn subscriber_count(&self) -> Result<usize, StoreError> {
        Ok(self.listeners()?.ids.len())
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.read()?.snapshot.clone())
    }

    pub fn get(&self, id: &str) -> Result<Option<TodoRow>, StoreError> {
        Ok(self.read()?.snapshot.get(id).cloned())
    }

    /// All live todos, newest first.
    pub fn todos(&self) -> Result<Vec<TodoRow>, StoreError> {
        Ok(newest_first(&self.read()?.snapshot))
    }

    /// Run a read-only query against the current snapshot.
    pub fn query<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T, StoreError> {
        Ok(f(&self.read()?.snapshot))
    }

    /// Records committed since the store was opened or restored.
    pub fn history(&self) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.read()?.history.clone())
    }

    /// Sequence of the last committed event; 0 for a fresh store.
    pub fn sequence(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.sequence)
    }

    /// Capture the current state as a checkpoint.
    pub fn checkpoint(&self) -> Result<Checkpoint, StoreError> {
        let state = self.read()?;
        Ok(Checkpoint::capture(&state.snapshot, state.sequence)?)
    }

    /// The checkpoint kept by `checkpoint_every` or handed to [`TodoStore::restore`].
    pub fn latest_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError> {
        Ok(self.read()?.latest_checkpoint.clone())
    }

    pub fn is_closed(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.closed)
    }

    /// Close the store and drop every listener.
    ///
    /// Later commits and subscriptions fail with [`StoreError::Closed`]; reads keep working.
    pub fn shutdown(&self) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        let mut listeners = self.listeners()?;
        let ids: Vec<String> = listeners.ids.drain().collect();
        for id in &ids {
            listeners.emitter.remove_listener(id);
        }
        info!(
            store = %self.inner.config.store_id,
            sequence = state.sequence,
            dropped_listeners = ids.len(),
            "todo store shut down"
        );
        Ok(())
    }
}
