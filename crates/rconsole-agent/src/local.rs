//! Local command execution: `cd` handling and one-shot shell commands.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

/// Platform shell and the flag that makes it run a single command string.
pub fn shell_command() -> (&'static str, &'static str) {
    #[cfg(windows)]
    {
        ("cmd", "/C")
    }

    #[cfg(not(windows))]
    {
        ("sh", "-c")
    }
}

/// Resolve the argument of a `cd` command against `cwd`.
///
/// An empty argument means the home directory and a leading `~` expands to
/// it. The target must be an existing directory; the returned path is
/// canonical.
pub fn resolve_cd(cwd: &Path, arg: &str, home: Option<&Path>) -> Result<PathBuf, String> {
    let arg = arg.trim();
    let target = match (arg, home) {
        ("", Some(home)) => home.to_path_buf(),
        ("", None) => cwd.to_path_buf(),
        (arg, Some(home)) if arg == "~" => home.to_path_buf(),
        (arg, Some(home)) if arg.starts_with("~/") || arg.starts_with("~\\") => {
            home.join(&arg[2..])
        }
        (arg, _) => {
            let path = Path::new(arg);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            }
        }
    };

    if target.is_dir() {
        target
            .canonicalize()
            .map_err(|_| format!("cd: {}: No such file or directory", target.display()))
    } else {
        Err(format!("cd: {}: No such file or directory", target.display()))
    }
}

/// Run `command` through the platform shell in `cwd`, bounded by `timeout`.
///
/// Returns the text to report back: stdout followed by stderr, or a status
/// line when the command printed nothing.
pub async fn run_shell(command: &str, cwd: &Path, timeout: Duration) -> String {
    let (shell, flag) = shell_command();
    let child = tokio::process::Command::new(shell)
        .arg(flag)
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => return format!("Error executing command: {e}"),
    };

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return format!("Error executing command: {e}"),
        Err(_) => return format!("Command timed out ({}s limit)", timeout.as_secs()),
    };

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let code = output.status.code().unwrap_or(-1);

    if !output.status.success() {
        return format!("Error executing command: exit status {code}\nOutput: {text}");
    }
    if text.is_empty() {
        return format!("Command executed (exit code: {code})");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cd_relative_joins_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let resolved = resolve_cd(dir.path(), "sub", None).unwrap();
        assert_eq!(resolved, dir.path().join("sub").canonicalize().unwrap());
    }

    #[test]
    fn cd_empty_goes_home() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();

        let resolved = resolve_cd(cwd.path(), "", Some(home.path())).unwrap();
        assert_eq!(resolved, home.path().canonicalize().unwrap());
    }

    #[test]
    fn cd_tilde_expands_home() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir(home.path().join("projects")).unwrap();
        let cwd = TempDir::new().unwrap();

        let resolved = resolve_cd(cwd.path(), "~/projects", Some(home.path())).unwrap();
        assert_eq!(resolved, home.path().join("projects").canonicalize().unwrap());
        let resolved = resolve_cd(cwd.path(), "~", Some(home.path())).unwrap();
        assert_eq!(resolved, home.path().canonicalize().unwrap());
    }

    #[test]
    fn cd_missing_or_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();

        let err = resolve_cd(dir.path(), "nope", None).unwrap_err();
        assert!(err.starts_with("cd: "));
        assert!(err.ends_with("No such file or directory"));
        assert!(resolve_cd(dir.path(), "file.txt", None).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_shell_captures_output() {
        let dir = TempDir::new().unwrap();
        let out = run_shell("echo hello", dir.path(), Duration::from_secs(5)).await;
        assert_eq!(out, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_shell_runs_in_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let out = run_shell("ls", dir.path(), Duration::from_secs(5)).await;
        assert!(out.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_shell_reports_silent_success() {
        let dir = TempDir::new().unwrap();
        let out = run_shell("true", dir.path(), Duration::from_secs(5)).await;
        assert_eq!(out, "Command executed (exit code: 0)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_shell_reports_failure_with_output() {
        let dir = TempDir::new().unwrap();
        let out = run_shell("echo oops >&2; exit 3", dir.path(), Duration::from_secs(5)).await;
        assert!(out.starts_with("Error executing command: exit status 3"));
        assert!(out.contains("Output: oops"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_shell_times_out() {
        let dir = TempDir::new().unwrap();
        let out = run_shell("sleep 5", dir.path(), Duration::from_secs(1)).await;
        assert_eq!(out, "Command timed out (1s limit)");
    }
}
