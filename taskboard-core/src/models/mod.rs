mod assignee;
mod assignment;
mod task;

pub use assignee::*;
pub use assignment::*;
pub use task::*;

use serde::{de::DeserializeOwned, Serialize};

/// A record type stored in its own document collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Backing table name.
    const COLLECTION: &'static str;
    /// Human-readable name used in not-found messages.
    const NAME: &'static str;

    fn id(&self) -> &str;
}
