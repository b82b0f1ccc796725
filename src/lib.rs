//! kotoba-bot: a Japanese dictionary chat bot
//!
//! Feature modules ("extensions") are declared in a compiled-in manifest;
//! each contributes command groups that the extension loader registers
//! with the dispatch table at startup or via owner-only admin commands.

pub mod application;
pub mod domain;
pub mod extensions;
pub mod infrastructure;
