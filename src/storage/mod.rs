//! Storage layer for liftlog
//!
//! Provides the live workout store handle and atomic file operations. The
//! store content itself is opaque to this layer; the backup system only needs
//! to copy, checksum, and swap it.

pub mod file_io;
pub mod init;
pub mod store;

pub use file_io::write_bytes_atomic;
pub use init::initialize_storage;
pub use store::LiveStore;
