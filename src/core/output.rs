// src/core/output.rs

use std::fmt;

/// Which child stream a captured chunk arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// The complete record of one finished command.
///
/// Built by the executor once the child has exited and both output pipes
/// have been drained to EOF; immutable from then on. The same value serves
/// as the success payload and, inside the executor's failure variant, as
/// the failure payload. Only the exit code tells the two apart.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
    chunks: Vec<(StreamSource, String)>,
    origin: String,
}

impl CommandOutput {
    pub(crate) fn new(
        exit_code: i32,
        stdout: String,
        stderr: String,
        chunks: Vec<(StreamSource, String)>,
        origin: String,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            chunks,
            origin,
        }
    }

    /// Exit status of the child. `-1` when it was terminated by a signal.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Everything the command wrote to stdout, in write order.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Everything the command wrote to stderr, in write order.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Every captured chunk from both streams, tagged with its source and
    /// ordered by arrival. Order within one stream is exact; order across
    /// the two streams is best-effort.
    pub fn chunks(&self) -> &[(StreamSource, String)] {
        &self.chunks
    }

    /// Both streams interleaved in arrival order, as one string.
    pub fn combined(&self) -> String {
        self.chunks.iter().map(|(_, text)| text.as_str()).collect()
    }

    /// The call site that launched the command, e.g. `deploy.sh:12`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `true` when the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout with exactly one trailing newline removed: the shape this
    /// output takes when substituted into a later command line.
    pub fn substitution_text(&self) -> &str {
        self.stdout.strip_suffix('\n').unwrap_or(&self.stdout)
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, text) in &self.chunks {
            f.write_str(text)?;
        }
        Ok(())
    }
}
