//! File system helpers for installing artifacts safely.

pub mod atomic;
pub mod temp;

pub use atomic::atomic_replace;
pub use temp::TempFileGuard;
