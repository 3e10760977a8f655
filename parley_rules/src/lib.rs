//! # Parley Rules
//!
//! The "rules book" crate - NPC stats, outcome classes, delta normalization,
//! and the session state they act on. This crate is the single source of
//! truth for game state and does not talk to any narrative generator.

pub mod config;
pub mod entities;
pub mod error;
pub mod mechanics;
pub mod session_state;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use session_state::*;
