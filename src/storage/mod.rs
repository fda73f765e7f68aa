mod accessors;
mod kv;
mod schema;
mod types;

pub use accessors::{
    preferences_key, DurationCache, Storage, AUTH_TOKEN_KEY, AUTH_USER_KEY, MOVIE_DURATIONS_KEY,
    USER_SESSION_KEY,
};
pub use kv::{KeyValueStore, MemoryStore};
pub use schema::Database;
pub use types::StorageError;
