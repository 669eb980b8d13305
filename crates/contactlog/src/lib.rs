//! `contactlog` - A small contact log kept in a single storage slot
//!
//! This library keeps a list of contacts, each tagged with the time and
//! place it was saved, as one JSON document under a single key in a
//! key-value backend. Every operation reads the whole list, changes it in
//! memory and writes the whole list back.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod contact;
pub mod dial;
pub mod error;
pub mod location;
pub mod logging;
pub mod storage;
pub mod store;

pub use config::Config;
pub use contact::{ContactEdit, ContactRecord, ContactStats, NewContact};
pub use dial::{DialIntake, DialRequest};
pub use error::{Error, Result};
pub use location::{Geolocator, Place};
pub use logging::init_logging;
pub use storage::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
pub use store::{ContactStore, Snapshot};
