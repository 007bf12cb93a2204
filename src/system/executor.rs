// src/system/executor.rs

use crate::constants::{PIPE_CHUNK_SIZE, SHELL_FLAG};
use crate::core::output::{CommandOutput, StreamSource};
use crate::session::Session;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command as ShellCommand;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Shell '{shell}' could not be spawned: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Child process I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command exited with status {}.", .0.exit_code())]
    Failed(CommandOutput),
}

/// Runs one command line under `session` and captures everything it writes.
///
/// The line goes to the session's shell as `<shell> -c <line>`, with the
/// environment inherited unchanged and the working directory taken from
/// the session. Stdout and stderr are drained concurrently on the current
/// task while the child runs; each chunk is tagged with its stream for the
/// combined view and, when the session is verbose, mirrored to the parent's
/// matching stream the moment it arrives. The call returns only after the
/// child has exited and both pipes have reached EOF, so output written
/// just before exit is never dropped.
///
/// Exit status 0 yields `Ok`; any other status yields
/// [`ExecutionError::Failed`] carrying the same record, exit code included.
/// A shell that cannot be started at all is the distinct
/// [`ExecutionError::Spawn`], which has no output to carry.
pub async fn run(
    session: &Session,
    command_line: &str,
    origin: &str,
) -> Result<CommandOutput, ExecutionError> {
    session.echo_command(command_line);

    let mut command = ShellCommand::new(session.shell());
    command
        .arg(SHELL_FLAG)
        .arg(command_line)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = session.cwd() {
        command.current_dir(dunce::simplified(dir));
    }

    log::debug!(
        "spawning {} {} <command> (origin {})",
        session.shell().display(),
        SHELL_FLAG,
        origin
    );

    let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
        shell: session.shell().display().to_string(),
        source,
    })?;

    // Both pipes were requested above, so their absence is an I/O defect.
    let stdout_pipe = child.stdout.take().ok_or_else(missing_pipe)?;
    let stderr_pipe = child.stderr.take().ok_or_else(missing_pipe)?;

    let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
    let stdout_drain = drain(
        stdout_pipe,
        StreamSource::Stdout,
        chunk_tx.clone(),
        session.verbose(),
    );
    let stderr_drain = drain(
        stderr_pipe,
        StreamSource::Stderr,
        chunk_tx,
        session.verbose(),
    );
    let collector = async {
        let mut chunks = Vec::new();
        while let Some(chunk) = chunk_rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    };

    // One task, four futures: both drains, the arrival-order collector,
    // and the wait. The collector finishes once the drains have dropped
    // their channel ends at EOF.
    let (stdout_bytes, stderr_bytes, chunks, status) =
        tokio::join!(stdout_drain, stderr_drain, collector, child.wait());

    let status = status?;
    let stdout_bytes = stdout_bytes?;
    let stderr_bytes = stderr_bytes?;

    let exit_code = status.code().unwrap_or(-1);
    let output = CommandOutput::new(
        exit_code,
        String::from_utf8_lossy(&stdout_bytes).into_owned(),
        String::from_utf8_lossy(&stderr_bytes).into_owned(),
        chunks,
        origin.to_string(),
    );

    if status.success() {
        Ok(output)
    } else {
        log::debug!("command exited with status {exit_code} (origin {origin})");
        Err(ExecutionError::Failed(output))
    }
}

fn missing_pipe() -> ExecutionError {
    ExecutionError::Io(std::io::Error::other("child stdio pipe was not captured"))
}

/// Reads one child pipe to EOF. Raw bytes accumulate for the exact
/// per-stream transcript; each chunk is also decoded and sent to the
/// combined-view collector, and mirrored to the parent's stream when
/// requested. The sender drops on return, which is how the collector
/// learns this stream is done.
async fn drain<R>(
    mut pipe: R,
    source: StreamSource,
    chunks: mpsc::UnboundedSender<(StreamSource, String)>,
    mirror: bool,
) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = vec![0u8; PIPE_CHUNK_SIZE];
    // Undecoded tail of the previous read: at most one unfinished
    // multi-byte sequence, completed by the next read or flushed at EOF.
    let mut pending: Vec<u8> = Vec::new();
    loop {
        let read = pipe.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        let bytes = &buf[..read];
        captured.extend_from_slice(bytes);
        if mirror {
            mirror_chunk(source, bytes).await?;
        }
        pending.extend_from_slice(bytes);
        let text = decode_completed(&mut pending);
        if !text.is_empty() {
            let _ = chunks.send((source, text));
        }
    }
    if !pending.is_empty() {
        // EOF inside a sequence; nothing can complete it now.
        let _ = chunks.send((source, String::from_utf8_lossy(&pending).into_owned()));
    }
    Ok(captured)
}

/// Decodes and removes every byte of `pending` except an unfinished
/// multi-byte sequence at its end, which stays behind for the next read.
/// Concatenated across reads, the returned texts equal one whole-buffer
/// lossy decode: a character whose bytes straddle a read boundary comes
/// out intact rather than as replacement characters.
fn decode_completed(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut consumed = 0;
    loop {
        match std::str::from_utf8(&pending[consumed..]) {
            Ok(valid) => {
                text.push_str(valid);
                consumed = pending.len();
                break;
            }
            Err(error) => {
                let valid_end = consumed + error.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[consumed..valid_end]));
                match error.error_len() {
                    // Genuinely invalid bytes decode to U+FFFD here exactly
                    // as the whole-buffer decode treats them.
                    Some(invalid) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        consumed = valid_end + invalid;
                    }
                    // The buffer ends mid-sequence; the next read may
                    // finish it.
                    None => {
                        consumed = valid_end;
                        break;
                    }
                }
            }
        }
    }
    pending.drain(..consumed);
    text
}

async fn mirror_chunk(source: StreamSource, bytes: &[u8]) -> std::io::Result<()> {
    match source {
        StreamSource::Stdout => {
            let mut out = tokio::io::stdout();
            out.write_all(bytes).await?;
            out.flush().await
        }
        StreamSource::Stderr => {
            let mut err = tokio::io::stderr();
            err.write_all(bytes).await?;
            err.flush().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::escape;

    fn quiet_session() -> Session {
        let mut session = Session::new();
        session.set_verbose(false);
        session
    }

    #[tokio::test]
    async fn test_exit_zero_yields_ok_with_exact_stdout() {
        let output = run(&quiet_session(), "echo hello", "test:1").await.unwrap();
        assert!(output.success());
        assert_eq!(output.exit_code(), 0);
        assert_eq!(output.stdout(), "hello\n");
        assert_eq!(output.stderr(), "");
        assert_eq!(output.origin(), "test:1");
    }

    #[tokio::test]
    async fn test_nonzero_exit_yields_failed_with_the_same_record() {
        let err = run(&quiet_session(), "echo oops >&2; exit 3", "test:2")
            .await
            .unwrap_err();
        match err {
            ExecutionError::Failed(output) => {
                assert_eq!(output.exit_code(), 3);
                assert!(!output.success());
                assert_eq!(output.stderr(), "oops\n");
                assert_eq!(output.origin(), "test:2");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quoted_metacharacters_round_trip() {
        let tricky = r#"a b'c"d $HOME `id` ; e"#;
        let line = format!("printf %s {}", escape::quote(tricky));
        let output = run(&quiet_session(), &line, "test:3").await.unwrap();
        assert_eq!(output.stdout(), tricky);
    }

    #[tokio::test]
    async fn test_quoted_value_is_one_argument() {
        let line = format!("printf '%s\\n' {}", escape::quote("hello world"));
        let output = run(&quiet_session(), &line, "test:4").await.unwrap();
        // One %s consumed one argument, so exactly one output line.
        assert_eq!(output.stdout(), "hello world\n");
    }

    #[tokio::test]
    async fn test_combined_chunks_partition_into_streams() {
        let line = "echo one; echo two >&2; echo three";
        let output = run(&quiet_session(), line, "test:5").await.unwrap();
        assert_eq!(output.stdout(), "one\nthree\n");
        assert_eq!(output.stderr(), "two\n");

        let mut from_stdout = String::new();
        let mut from_stderr = String::new();
        for (source, text) in output.chunks() {
            match source {
                StreamSource::Stdout => from_stdout.push_str(text),
                StreamSource::Stderr => from_stderr.push_str(text),
            }
        }
        assert_eq!(from_stdout, output.stdout());
        assert_eq!(from_stderr, output.stderr());

        // Interleaving across streams is by arrival and not asserted
        // exactly; the combined text still contains every byte once.
        let combined = output.combined();
        assert_eq!(combined.len(), output.stdout().len() + output.stderr().len());
        assert!(combined.contains("one\n"));
        assert!(combined.contains("two\n"));
        assert!(combined.contains("three\n"));
    }

    #[tokio::test]
    async fn test_session_cwd_redirects_child() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = quiet_session();
        session.set_cwd(dir.path());
        let output = run(&session, "pwd", "test:6").await.unwrap();
        let reported = std::path::Path::new(output.stdout().trim_end());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_environment_is_inherited() {
        let output = run(&quiet_session(), "printf %s \"$PATH\"", "test:7")
            .await
            .unwrap();
        assert!(!output.stdout().is_empty());
    }

    #[tokio::test]
    async fn test_missing_shell_is_a_spawn_error() {
        let mut session = quiet_session();
        session.set_shell("/no/such/shell/anywhere");
        let err = run(&session, "echo hi", "test:8").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination_reports_minus_one() {
        let err = run(&quiet_session(), "kill -TERM $$", "test:9")
            .await
            .unwrap_err();
        match err {
            ExecutionError::Failed(output) => assert_eq!(output.exit_code(), -1),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multi_chunk_output_is_complete() {
        // Much larger than one pipe buffer, so the drain loops.
        let line = "seq 1 20000";
        let output = run(&quiet_session(), line, "test:10").await.unwrap();
        let expected: String = (1..=20000).map(|n| format!("{n}\n")).collect();
        assert_eq!(output.stdout(), expected);
        assert_eq!(output.combined(), expected);
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_reads_stays_intact() {
        // 8191 ASCII bytes then a two-byte character: the first read fills
        // the whole buffer and cuts the character in half.
        let mut payload = "a".repeat(PIPE_CHUNK_SIZE - 1);
        payload.push('é');
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.txt");
        std::fs::write(&path, &payload).unwrap();
        let line = format!("cat {}", escape::quote(&path.display().to_string()));
        let output = run(&quiet_session(), &line, "test:11").await.unwrap();
        assert_eq!(output.stdout(), payload);
        assert_eq!(output.combined(), payload);
        assert!(!output.combined().contains(char::REPLACEMENT_CHARACTER));
    }

    #[tokio::test]
    async fn test_truncated_sequence_at_eof_still_appears() {
        // A lone lead byte is invalid however it is decoded; the combined
        // view must agree with the per-stream transcript on that.
        let output = run(&quiet_session(), r"printf '\xc3'", "test:12")
            .await
            .unwrap();
        assert_eq!(output.stdout(), "\u{FFFD}");
        assert_eq!(output.combined(), "\u{FFFD}");
    }

    #[test]
    fn test_decode_completed_carries_unfinished_sequences() {
        let mut pending = b"caf\xc3".to_vec();
        assert_eq!(decode_completed(&mut pending), "caf");
        assert_eq!(pending, b"\xc3");
        // The next read's \xa9 completes 'é'.
        pending.extend_from_slice(b"\xa9 suite");
        assert_eq!(decode_completed(&mut pending), "\u{e9} suite");
        assert!(pending.is_empty());

        // Invalid bytes in the middle become one replacement character,
        // the same as a whole-buffer decode makes them.
        let mut pending = b"ab\xffcd".to_vec();
        assert_eq!(decode_completed(&mut pending), "ab\u{fffd}cd");
        assert!(pending.is_empty());
    }
}
