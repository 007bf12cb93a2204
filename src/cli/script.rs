// src/cli/script.rs

use crate::core::escape;
use crate::session::Session;
use crate::system::executor::{self, ExecutionError};
use crate::system::helpers;
use anyhow::{Context, Result};
use std::path::Path;

/// A script resolved to its text, plus the short name used in origins.
#[derive(Debug)]
pub struct Script {
    name: String,
    body: String,
}

impl Script {
    /// Loads a script from whatever the user passed on the command line:
    /// an `http(s)://` URL fetched through the instrumented helper, a
    /// `file://` URL, or a plain filesystem path.
    pub async fn load(session: &Session, source: &str) -> Result<Self> {
        if let Some(path) = source.strip_prefix("file://") {
            let body = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("Could not read script '{path}'"))?;
            return Ok(Self {
                name: short_name(path),
                body,
            });
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            let body = helpers::fetch(session, source)
                .await
                .and_then(reqwest::Response::error_for_status)
                .with_context(|| format!("Could not fetch script '{source}'"))?
                .text()
                .await
                .with_context(|| format!("Could not read script body from '{source}'"))?;
            return Ok(Self {
                name: short_name(source),
                body,
            });
        }
        let body = std::fs::read_to_string(source)
            .with_context(|| format!("Could not read script '{source}'"))?;
        Ok(Self {
            name: short_name(source),
            body,
        })
    }

    /// Wraps text read from piped stdin.
    pub fn from_stdin(body: String) -> Self {
        Self {
            name: "stdin".to_string(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the script line by line, stopping at the first failure.
    ///
    /// Blank lines and `#` comments are skipped. A `cd` line with a single
    /// plain target goes through the session helper so the directory
    /// change outlives the line's shell; every other line, compound `cd`
    /// included, is handed to the shell verbatim. Origins are
    /// `<name>:<line>`, one-based.
    pub async fn run(&self, session: &mut Session) -> Result<(), ExecutionError> {
        for (index, raw_line) in self.body.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let origin = format!("{}:{}", self.name, index + 1);
            if let Some(target) = cd_target(line) {
                helpers::cd_with_origin(session, target, &origin);
                continue;
            }
            executor::run(session, line, &origin).await?;
        }
        Ok(())
    }
}

/// Last path segment of a path or URL, for origin labels.
fn short_name(source: &str) -> String {
    source
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(source)
        .to_string()
}

/// The target of a `cd` line whose argument is one word, bare or wrapped
/// in matching quotes. Anything the shell would interpret, `cd /tmp &&
/// make` or `cd $HOME`, returns `None` and runs as an ordinary line.
fn cd_target(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("cd ")?.trim();
    for quote_char in ['\'', '"'] {
        if let Some(inner) = rest
            .strip_prefix(quote_char)
            .and_then(|r| r.strip_suffix(quote_char))
        {
            // An interior quote of the same kind means the quotes do not
            // wrap the whole argument.
            return (!inner.contains(quote_char)).then_some(inner);
        }
    }
    escape::is_inert_word(rest).then_some(rest)
}
