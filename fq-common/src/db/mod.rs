//! SQLite key/value persistence

pub mod init;
pub mod kv;

pub use init::*;
pub use kv::*;
