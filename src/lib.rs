//! Library crate for blindscan-rs exposing reusable modules.
pub mod candidate;
pub mod devfs;
pub mod format;
pub mod lock;
pub mod nimsockets;
pub mod session;
pub mod types;
