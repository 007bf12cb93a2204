// src/system/helpers.rs

use crate::session::Session;
use dialoguer::{Completion, Input};
use std::panic::Location;
use std::path::Path;

/// Changes the session working directory, verifying the target first.
///
/// A missing target is unrecoverable by design: the diagnostic and the
/// call site go to stderr and the process exits with status 1, so no later
/// command can run in a directory the author did not ask for.
#[track_caller]
pub fn cd(session: &mut Session, path: impl AsRef<Path>) {
    let location = Location::caller();
    let origin = format!(
        "{}:{}:{}",
        location.file(),
        location.line(),
        location.column()
    );
    cd_with_origin(session, path, &origin);
}

/// `cd` with an explicit origin label, for callers that track their own
/// positions (the script runner).
pub fn cd_with_origin(session: &mut Session, path: impl AsRef<Path>, origin: &str) {
    let path = path.as_ref();
    session.echo_command(&format!("cd {}", path.display()));

    // Relative targets resolve against the session cwd, not the process's.
    let target = match session.cwd() {
        Some(current) => current.join(path),
        None => path.to_path_buf(),
    };
    if !target.is_dir() {
        eprintln!("cd: {}: No such directory", path.display());
        eprintln!("  at {origin}");
        std::process::exit(1);
    }
    session.set_cwd(target);
}

/// Prefix completion over a fixed choice list. Tab completes only when
/// exactly one choice starts with the typed text; an ambiguous or unknown
/// prefix leaves the input untouched.
struct PrefixCompletion {
    choices: Vec<String>,
}

impl Completion for PrefixCompletion {
    fn get(&self, input: &str) -> Option<String> {
        let mut hits = self.choices.iter().filter(|c| c.starts_with(input));
        match (hits.next(), hits.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        }
    }
}

/// Asks `query` on the terminal and returns the typed line.
///
/// Empty input is a valid answer. Cancellation and read errors also come
/// back as the empty string: prompts sit on interactive paths where
/// "no answer" is the only sensible fallback.
pub fn question(query: &str) -> String {
    question_with_choices(query, &[])
}

/// `question` with Tab completion over `choices`.
pub fn question_with_choices(query: &str, choices: &[&str]) -> String {
    let completion = PrefixCompletion {
        choices: choices.iter().map(|c| (*c).to_string()).collect(),
    };
    Input::<String>::new()
        .with_prompt(query)
        .allow_empty(true)
        .completion_with(&completion)
        .interact_text()
        .unwrap_or_default()
}

/// Instrumented HTTP GET: echoes the request when the session is verbose,
/// then defers to the client untouched. No retries, no rewriting; the
/// response and any error are the caller's to interpret.
pub async fn fetch(session: &Session, url: &str) -> reqwest::Result<reqwest::Response> {
    session.echo_command(&format!("fetch {url}"));
    reqwest::get(url).await
}

/// `fetch` for callers that carry their own client and request options.
pub async fn fetch_with(
    session: &Session,
    client: &reqwest::Client,
    request: reqwest::Request,
) -> reqwest::Result<reqwest::Response> {
    session.echo_command(&format!("fetch {} {}", request.method(), request.url()));
    client.execute(request).await
}
