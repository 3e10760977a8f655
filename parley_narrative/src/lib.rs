//! # Parley Narrative
//!
//! The narrative side of a persuasion game. This crate drives turns against
//! `parley_rules`, compacts history for the generator, and talks to the
//! narrative generator through a port.
//!
//! ## Core Components
//!
//! - **context_summarizer**: Bounded context built from session history
//! - **generator**: The narrative generator port and lenient output parsing
//! - **resolver**: One turn, from player input to committed record
//! - **game**: The session loop with retry and export
//! - **journal**: Serializable session history
//!
//! ## Design Philosophy
//!
//! - **Rules Own State**: Only `parley_rules` mutates NPC stats and history
//! - **All or Nothing**: A turn either commits completely or leaves the session untouched
//! - **Ports at the Edges**: Generation, presentation, export, and time are traits

pub mod config;
pub mod context_summarizer;
pub mod error;
pub mod game;
pub mod generator;
pub mod journal;
pub mod ports;
pub mod resolver;

pub use config::*;
pub use context_summarizer::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use journal::*;
pub use ports::*;
pub use resolver::*;
