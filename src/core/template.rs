// src/core/template.rs

use crate::core::escape;
use crate::core::output::CommandOutput;
use crate::session::Session;
use crate::system::executor::{self, ExecutionError};
use std::panic::Location;
use std::path::{Path, PathBuf};

/// One substitution value in a command template.
///
/// The two variants close the set of things a template accepts: plain text
/// and the output of an earlier command. Anything else must convert into
/// one of them first, which the `From` impls below do for the usual
/// primitives.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A plain value, escaped as-is.
    Raw(String),
    /// A prior command's output. It contributes the command's stdout with
    /// exactly one trailing newline removed, then is escaped like any
    /// other value.
    Output(CommandOutput),
}

impl Arg {
    /// The text this value contributes, before escaping.
    fn as_text(&self) -> &str {
        match self {
            Self::Raw(text) => text,
            Self::Output(output) => output.substitution_text(),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Raw(value.clone())
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Self::Raw(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Arg {
    fn from(value: PathBuf) -> Self {
        Self::Raw(value.to_string_lossy().into_owned())
    }
}

impl From<CommandOutput> for Arg {
    fn from(value: CommandOutput) -> Self {
        Self::Output(value)
    }
}

impl From<&CommandOutput> for Arg {
    fn from(value: &CommandOutput) -> Self {
        Self::Output(value.clone())
    }
}

macro_rules! arg_from_display {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Self::Raw(value.to_string())
            }
        })*
    };
}

arg_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

#[derive(Debug, Clone)]
enum Piece {
    Fragment(String),
    Value(Arg),
}

/// An ordered command template: literal fragments interleaved with
/// substitution values.
///
/// Fragments land in the command line verbatim; values are escaped into
/// exactly one shell word each at assembly time. Construction captures the
/// call site as the command's origin, carried through to the result so
/// failures can say where they were launched from.
#[derive(Debug, Clone)]
pub struct Command {
    pieces: Vec<Piece>,
    origin: String,
}

impl Command {
    /// Starts a template with its first literal fragment.
    #[track_caller]
    pub fn new(fragment: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            pieces: vec![Piece::Fragment(fragment.into())],
            origin: format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
        }
    }

    /// Appends a literal fragment, verbatim.
    pub fn text(mut self, fragment: impl Into<String>) -> Self {
        self.pieces.push(Piece::Fragment(fragment.into()));
        self
    }

    /// Appends a substitution value, escaped at assembly.
    pub fn arg(mut self, value: impl Into<Arg>) -> Self {
        self.pieces.push(Piece::Value(value.into()));
        self
    }

    /// Replaces the captured origin. Callers that track their own
    /// positions, like the script runner, label commands with script
    /// coordinates instead of Rust call sites.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The final command line: fragments verbatim, values quoted, in
    /// template order.
    pub fn assemble(&self) -> String {
        let mut line = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Fragment(text) => line.push_str(text),
                Piece::Value(value) => line.push_str(&escape::quote(value.as_text())),
            }
        }
        line
    }

    /// Assembles and runs this command under `session`.
    pub async fn run(&self, session: &Session) -> Result<CommandOutput, ExecutionError> {
        executor::run(session, &self.assemble(), &self.origin).await
    }
}

// MARK: --- UNIT TESTS ---
