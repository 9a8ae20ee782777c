// src/commands/mod.rs
pub mod init;
mod api;

pub use api::{Commands, TagExplanation, TagScope};

pub use init::{ensure_initialized, ensure_initialized_at, ensure_initialized_once, InitReport};
