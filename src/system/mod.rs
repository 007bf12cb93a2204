//! # System Interaction Layer
//!
//! The boundary between the command model and the operating system: process
//! spawning and everything that touches the terminal or the network on a
//! session's behalf.
//!
//! ## Modules
//!
//! - **`executor`**: spawns `<shell> -c <line>`, drains both output pipes
//!   concurrently with live mirroring, and turns the exit status into the
//!   success/failure result.
//! - **`helpers`**: the session-level conveniences: checked `cd`,
//!   interactive `question` prompting with prefix completion, and the
//!   instrumented `fetch` pass-through.

pub mod executor;
pub mod helpers;
