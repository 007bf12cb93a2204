// src/constants.rs

/// The shell used to interpret command lines unless the session overrides it.
#[cfg(not(windows))]
pub const DEFAULT_SHELL: &str = "/bin/bash";
#[cfg(windows)]
pub const DEFAULT_SHELL: &str = "cmd.exe";

/// The flag that makes the shell read a command line from its next argument.
#[cfg(not(windows))]
pub const SHELL_FLAG: &str = "-c";
#[cfg(windows)]
pub const SHELL_FLAG: &str = "/C";

/// Crate version as recorded in the manifest at build time.
pub const VERSION: &str = match option_env!("CARGO_PKG_VERSION") {
    Some(version) => version,
    None => "(unknown)",
};

/// Usage line printed when no script is given.
pub const USAGE: &str = "usage: shrun <script>";

/// Read buffer size for draining child output pipes.
pub const PIPE_CHUNK_SIZE: usize = 8 * 1024;
