// Adapters layer: concrete implementations for the filesystem side (storage, change notification).

pub mod storage;
pub mod watcher;

pub use storage::LocalStorage;
pub use watcher::{FsWatcher, WatchFilter};
