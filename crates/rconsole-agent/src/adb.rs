//! ADB discovery and the long-lived `adb shell` process.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Bundled adb locations checked before `PATH`, relative to `base`.
pub fn candidate_paths(base: &Path) -> Vec<PathBuf> {
    vec![
        base.join("adb").join("adb"),
        base.join("adb").join("adb.exe"),
        base.join("platform-tools").join("adb"),
        base.join("platform-tools").join("adb.exe"),
    ]
}

/// True when `<program> version` runs and exits successfully.
async fn responds_to_version(program: &OsStr) -> bool {
    tokio::process::Command::new(program)
        .arg("version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Locate a working adb binary.
///
/// `configured` wins when set. Otherwise bundled copies next to the running
/// executable are tried, then `adb` on `PATH`.
pub async fn find_adb(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if responds_to_version(path.as_os_str()).await {
            info!(path = %path.display(), "Using configured ADB");
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "Configured ADB does not run");
        return None;
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    for path in candidate_paths(&exe_dir) {
        if path.is_file() && responds_to_version(path.as_os_str()).await {
            info!(path = %path.display(), "Using local ADB");
            return Some(path);
        }
    }

    if responds_to_version(OsStr::new("adb")).await {
        info!("Using system ADB from PATH");
        return Some(PathBuf::from("adb"));
    }
    None
}

/// A child process fed line by line on stdin whose non-empty output lines
/// are forwarded to a channel.
pub struct InteractiveShell {
    child: Child,
    stdin: ChildStdin,
}

impl InteractiveShell {
    pub fn spawn<P, A>(program: P, args: &[A], output_tx: mpsc::Sender<String>) -> io::Result<Self>
    where
        P: AsRef<OsStr>,
        A: AsRef<OsStr>,
    {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin not captured"))?;
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, output_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, output_tx));
        }

        Ok(Self { child, stdin })
    }

    /// Write one command line.
    pub async fn send(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "Shell already gone");
        }
    }
}

async fn forward_lines<R>(reader: R, output_tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end_matches('\r');
                if line.is_empty() {
                    continue;
                }
                if output_tx.send(line.to_string()).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Error reading shell output");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn candidates_in_lookup_order() {
        let base = Path::new("/opt/rconsole");
        let paths = candidate_paths(base);
        assert_eq!(
            paths,
            vec![
                base.join("adb/adb"),
                base.join("adb/adb.exe"),
                base.join("platform-tools/adb"),
                base.join("platform-tools/adb.exe"),
            ]
        );
    }

    #[tokio::test]
    async fn configured_path_that_does_not_run_is_rejected() {
        let missing = Path::new("/definitely/not/here/adb");
        assert_eq!(find_adb(Some(missing)).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interactive_shell_streams_non_empty_lines() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut shell = InteractiveShell::spawn("cat", &[] as &[&str], tx).unwrap();
        assert!(shell.is_running());

        shell.send("first").await.unwrap();
        shell.send("").await.unwrap();
        shell.send("second").await.unwrap();

        let wait = Duration::from_secs(5);
        assert_eq!(tokio::time::timeout(wait, rx.recv()).await.unwrap().as_deref(), Some("first"));
        assert_eq!(tokio::time::timeout(wait, rx.recv()).await.unwrap().as_deref(), Some("second"));

        shell.kill().await;
        assert!(!shell.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interactive_shell_runs_sh_commands() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut shell = InteractiveShell::spawn("sh", &[] as &[&str], tx).unwrap();

        shell.send("echo from-shell").await.unwrap();
        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some("from-shell"));
        shell.kill().await;
    }
}
