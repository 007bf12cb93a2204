pub mod cli;
pub mod constants;
pub mod core;
pub mod session;
pub mod system;

pub use crate::core::output::{CommandOutput, StreamSource};
pub use crate::core::template::{Arg, Command};
pub use crate::session::Session;
pub use crate::system::executor::ExecutionError;
pub use crate::system::helpers::{cd, fetch, fetch_with, question, question_with_choices};
