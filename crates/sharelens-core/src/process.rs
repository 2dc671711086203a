//! Running external programs with a deadline.
//!
//! Both the indexed search and the AVI converter delegate to an external
//! program and need a single outcome: the program finished (with whatever
//! exit status and output) or it did not finish in time and was killed.
//!
//! Output pipes are drained on reader threads so a chatty program can never
//! block on a full pipe; the threads hand their buffers back over a channel
//! whose deadline enforces the timeout.
//!
//! On Unix the program runs in its own process group and a timeout kills the
//! whole group. Helpers it started in the background would otherwise keep
//! the pipes open and the reader threads blocked. Elsewhere only the direct
//! child is killed, so a surviving grandchild holds its reader thread until
//! it exits.

use crossbeam_channel::RecvTimeoutError;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Captured result of a finished program.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

/// Run `command` to completion, killing it once `timeout` elapses.
///
/// Spawn failures are returned as-is; an expired deadline is reported as
/// [`io::ErrorKind::TimedOut`].
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> io::Result<ProcessOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    debug!(command = ?command, timeout_ms = timeout.as_millis() as u64, "Spawning process");
    let mut child = command.spawn()?;
    let deadline = Instant::now() + timeout;

    let (tx, rx) = crossbeam_channel::bounded(2);
    spawn_reader(child.stdout.take(), Pipe::Stdout, tx.clone());
    spawn_reader(child.stderr.take(), Pipe::Stderr, tx);

    let mut stdout = None;
    let mut stderr = None;
    while stdout.is_none() || stderr.is_none() {
        match rx.recv_deadline(deadline) {
            Ok((Pipe::Stdout, bytes)) => stdout = Some(bytes),
            Ok((Pipe::Stderr, bytes)) => stderr = Some(bytes),
            Err(RecvTimeoutError::Timeout) => return Err(kill_timed_out(&mut child, timeout)),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Both pipes are closed; the process is exiting or has exited
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            return Err(kill_timed_out(&mut child, timeout));
        }
        thread::sleep(Duration::from_millis(10));
    };

    Ok(ProcessOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout.unwrap_or_default()).into_owned(),
        stderr: String::from_utf8_lossy(&stderr.unwrap_or_default()).into_owned(),
    })
}

fn spawn_reader<R>(pipe: Option<R>, which: Pipe, tx: crossbeam_channel::Sender<(Pipe, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buffer) {
                debug!(pipe = ?which, error = %e, "Pipe read ended early");
            }
        }
        let _ = tx.send((which, buffer));
    });
}

fn kill_timed_out(child: &mut Child, timeout: Duration) -> io::Error {
    warn!(pid = child.id(), timeout_ms = timeout.as_millis() as u64, "Process timed out, killing it");
    kill_process_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process did not finish within {}s", timeout.as_secs_f64()),
    )
}

/// Kill every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let result = Command::new("kill")
        .args(["-s", "KILL", "--", &format!("-{}", pid)])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(e) = result {
        debug!(pid, error = %e, "Could not signal process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn test_captures_output() {
        let output = run_with_timeout(sh("printf out; printf err >&2"), Duration::from_secs(10)).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }

    #[test]
    fn test_reports_exit_status() {
        let output = run_with_timeout(sh("exit 3"), Duration::from_secs(10)).unwrap();
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_kills_on_timeout() {
        let start = Instant::now();
        let err = run_with_timeout(sh("sleep 30"), Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(target_os = "linux")]
    fn is_running(pid: &str) -> bool {
        // Gone, or a zombie waiting to be reaped
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => !stat.contains(") Z "),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timeout_kills_background_children() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let pid_file = temp_dir.path().join("pid");
        let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());

        let err = run_with_timeout(sh(&script), Duration::from_millis(500)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
        let deadline = Instant::now() + Duration::from_secs(5);
        while is_running(&pid) {
            assert!(Instant::now() < deadline, "background sleep {} survived the timeout", pid);
            thread::sleep(Duration::from_millis(50));
        }
    }

    #[test]
    fn test_missing_program() {
        let err = run_with_timeout(
            Command::new("sharelens-no-such-program"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_large_output_does_not_block() {
        let output = run_with_timeout(
            sh("i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done"),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(output.stdout.lines().count(), 20000);
    }
}
