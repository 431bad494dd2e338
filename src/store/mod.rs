mod config;
mod error;
mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use store::{SubscriptionId, TodoStore, TodosChanged};
