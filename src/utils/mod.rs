//! Supporting utilities: HTTP plumbing, file system safety, locking and
//! progress display.

pub mod fs;
pub mod http;
pub mod lock;
pub mod progress;

pub use fs::{TempFileGuard, atomic_replace};
pub use lock::RunLock;
