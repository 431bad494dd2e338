use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use sourced_todos::{StoreConfig, TodoEvent, TodoStore, TodosChanged};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_id() -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("todo-{}", id)
}

/// Creates for `texts`, with `createdAt` 1000, 2000, ...
pub fn creates(texts: &[&str]) -> Vec<(String, TodoEvent)> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let id = next_id();
            let event = TodoEvent::created(id.clone(), *text, 1000 * (i as i64 + 1));
            (id, event)
        })
        .collect()
}

pub fn open_store() -> TodoStore {
    TodoStore::open(StoreConfig::default().with_store_id(next_id())).unwrap()
}

/// Subscribe and forward every notification into a channel.
pub fn watch(store: &TodoStore) -> Receiver<TodosChanged> {
    let (tx, rx) = mpsc::channel();
    store
        .subscribe(move |change| {
            let _ = tx.send(change);
        })
        .unwrap();
    rx
}

/// Wait for the notification of `sequence`, skipping earlier ones that arrive late.
pub fn wait_for(rx: &Receiver<TodosChanged>, sequence: u64) -> TodosChanged {
    loop {
        let change = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("no notification received");
        if change.sequence == sequence {
            return change;
        }
    }
}
