//! TodoMVC flow against an in-process store.
//!
//! Run with `RUST_LOG=sourced_todos=debug cargo run --example todos` to see commit logs.

use std::error::Error;
use std::sync::mpsc;
use std::time::Duration;

use sourced_todos::{StoreConfig, TodoCreated, TodoEvent, TodoRow, TodoStore};
use tracing_subscriber::EnvFilter;

fn print_todos(title: &str, todos: &[TodoRow]) {
    println!("{title}");
    if todos.is_empty() {
        println!("  (no todos)");
    }
    for todo in todos {
        let mark = if todo.completed { "x" } else { " " };
        println!("  [{mark}] {}  ({})", todo.text, todo.id);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = TodoStore::open(StoreConfig::default().with_checkpoint_every(5))?;

    let (tx, rx) = mpsc::channel();
    store.subscribe(move |change| {
        let _ = tx.send(change);
    })?;

    let milk = TodoCreated::now("buy milk");
    let dog = TodoCreated::now("walk the dog");
    let taxes = TodoCreated::now("file taxes");
    let (milk_id, dog_id, taxes_id) = (milk.id.clone(), dog.id.clone(), taxes.id.clone());

    store.commit_all([
        TodoEvent::TodoCreated(milk),
        TodoEvent::TodoCreated(dog),
        TodoEvent::TodoCreated(taxes),
    ])?;
    store.commit(TodoEvent::toggled(milk_id.clone(), true))?;
    store.commit(TodoEvent::text_updated(dog_id, "walk the dog twice"))?;
    let last = store.commit(TodoEvent::deleted(taxes_id))?;

    // Notifications arrive on background threads; wait for the newest one.
    while let Ok(change) = rx.recv_timeout(Duration::from_secs(1)) {
        if change.sequence == last {
            print_todos("subscriber view:", &change.todos);
            break;
        }
    }

    store.commit(TodoEvent::completed_cleared())?;
    print_todos("after clearing completed:", &store.todos()?);

    let replayed = TodoStore::from_history(
        StoreConfig::default().with_store_id("replica"),
        store.history()?,
    )?;
    print_todos("replayed from history:", &replayed.todos()?);
    println!(
        "replica matches: {}",
        replayed.snapshot()? == store.snapshot()?
    );

    if let Some(checkpoint) = store.latest_checkpoint()? {
        println!("latest checkpoint at sequence {}", checkpoint.sequence);
    }
    println!("milk still present: {}", store.get(&milk_id)?.is_some());

    store.shutdown()?;
    replayed.shutdown()?;
    Ok(())
}
