// src/session.rs

use crate::constants::DEFAULT_SHELL;
use crate::core::color;
use std::path::{Path, PathBuf};

/// Per-run execution settings, passed explicitly to every command.
///
/// A `Session` is plain data. Mutating it takes `&mut`, so concurrent
/// mutation is a compile error rather than a race. The executor reads it
/// at the moment each command launches; a change made between two commands
/// affects every later command in the run and nothing already started.
#[derive(Debug, Clone)]
pub struct Session {
    verbose: bool,
    shell: PathBuf,
    cwd: Option<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with the defaults: verbose on, the platform shell, and
    /// the inherited working directory.
    pub fn new() -> Self {
        Self {
            verbose: true,
            shell: PathBuf::from(DEFAULT_SHELL),
            cwd: None,
        }
    }

    /// Whether commands are echoed and their output mirrored live.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        log::debug!("session verbose -> {verbose}");
        self.verbose = verbose;
    }

    /// The shell binary that interprets command lines.
    pub fn shell(&self) -> &Path {
        &self.shell
    }

    pub fn set_shell(&mut self, shell: impl Into<PathBuf>) {
        self.shell = shell.into();
        log::debug!("session shell -> {}", self.shell.display());
    }

    /// Working directory for spawned commands. `None` inherits the
    /// process's own.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Sets the working directory without checking it exists. The `cd`
    /// helper in `system::helpers` is the checked front door.
    pub fn set_cwd(&mut self, dir: impl Into<PathBuf>) {
        self.cwd = Some(dir.into());
        log::debug!("session cwd -> {:?}", self.cwd);
    }

    /// Echoes `$ <line>` with the program word highlighted, when verbose.
    pub fn echo_command(&self, line: &str) {
        if self.verbose {
            println!("$ {}", color::colorize_command(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    #[test]
    fn test_defaults() {
        let session = Session::new();
        assert!(session.verbose());
        assert_eq!(session.shell(), Path::new(constants::DEFAULT_SHELL));
        assert_eq!(session.cwd(), None);
    }

    #[test]
    fn test_mutations_stick() {
        let mut session = Session::new();
        session.set_verbose(false);
        session.set_shell("/bin/sh");
        session.set_cwd("/tmp");
        assert!(!session.verbose());
        assert_eq!(session.shell(), Path::new("/bin/sh"));
        assert_eq!(session.cwd(), Some(Path::new("/tmp")));
    }
}
