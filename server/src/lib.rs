//! A trivial key-value service over TCP backed by [`lfkv::HashTable`].
//!
//! Each connection carries exactly one newline-terminated request and receives exactly one
//! newline-terminated response. See [`protocol`] for the wire format.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use config::Config;
pub use error::{ClientError, ConfigError, ServerError, SessionError};
pub use server::serve;

/// The table type shared by every session.
pub type Store = lfkv::HashTable<String, String>;
