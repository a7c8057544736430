//! Persistent storage for users and their weekly work locations.

mod sqlite;

pub use sqlite::{Store, StoreError};
