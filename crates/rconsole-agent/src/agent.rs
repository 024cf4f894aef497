//! Command interpreter behind `execute_command`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::adb::InteractiveShell;
use crate::local::{resolve_cd, run_shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Adb,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Adb => write!(f, "adb"),
        }
    }
}

/// Per-connection command state: mode, working directory and the adb shell.
pub struct Agent {
    mode: Mode,
    cwd: PathBuf,
    home: Option<PathBuf>,
    adb_path: Option<PathBuf>,
    adb_shell: Option<InteractiveShell>,
    command_timeout: Duration,
    /// Receives every line the adb shell prints.
    adb_output: mpsc::Sender<String>,
}

impl Agent {
    pub fn new(
        cwd: PathBuf,
        adb_path: Option<PathBuf>,
        command_timeout: Duration,
        adb_output: mpsc::Sender<String>,
    ) -> Self {
        Self {
            mode: Mode::Local,
            cwd,
            home: None,
            adb_path,
            adb_shell: None,
            command_timeout,
            adb_output,
        }
    }

    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn has_adb(&self) -> bool {
        self.adb_path.is_some()
    }

    pub fn prompt(&self) -> String {
        match self.mode {
            Mode::Local => {
                let name = self
                    .cwd
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.cwd.display().to_string());
                format!("local:{name}$ ")
            }
            Mode::Adb => "adb$ ".to_string(),
        }
    }

    /// Banner sent when the relay connection opens.
    pub fn welcome(&self) -> String {
        let mut commands = String::from("'mode local'");
        if self.has_adb() {
            commands.push_str(", 'mode adb'");
        }
        commands.push_str(", 'help'");
        format!(
            "Multi-Terminal Remote Console\nMode: {}\nCommands: {commands}\n{}",
            self.mode,
            self.prompt()
        )
    }

    pub fn help(&self) -> String {
        let mut help =
            String::from("Available commands:\n- mode local: Switch to local terminal mode");
        if self.has_adb() {
            help.push_str("\n- mode adb: Switch to ADB shell mode");
        }
        help.push_str("\n- help: Show this help\n- Any system command (in local mode)");
        if self.has_adb() {
            help.push_str("\n- Any ADB shell command (in ADB mode)");
        }
        help
    }

    /// Run one command.
    ///
    /// Returns the text to send back, prompt included. `None` means the
    /// command went to the adb shell and its output arrives asynchronously.
    pub async fn execute(&mut self, command: &str) -> Option<String> {
        let command = command.trim();
        info!(command = %command, mode = %self.mode, "Executing command");

        let body = match command {
            "mode local" => {
                self.mode = Mode::Local;
                "Switched to local mode".to_string()
            }
            "mode adb" => {
                if self.has_adb() {
                    self.mode = Mode::Adb;
                    "Switched to ADB mode".to_string()
                } else {
                    "ADB not available. Please install ADB first.".to_string()
                }
            }
            "help" => self.help(),
            "pwd" if self.mode == Mode::Local => self.cwd.display().to_string(),
            _ if self.mode == Mode::Local => self.execute_local(command).await,
            _ => match self.execute_adb(command).await {
                Ok(()) => return None,
                Err(message) => message,
            },
        };

        Some(format!("{body}\n{}", self.prompt()))
    }

    async fn execute_local(&mut self, command: &str) -> String {
        let cd_arg = if command == "cd" {
            Some("")
        } else {
            command.strip_prefix("cd ")
        };

        match cd_arg {
            Some(arg) => match resolve_cd(&self.cwd, arg, self.home.as_deref()) {
                Ok(path) => {
                    self.cwd = path;
                    format!("Changed directory to: {}", self.cwd.display())
                }
                Err(message) => message,
            },
            None => run_shell(command, &self.cwd, self.command_timeout).await,
        }
    }

    async fn execute_adb(&mut self, command: &str) -> Result<(), String> {
        let Some(adb) = self.adb_path.clone() else {
            return Err("ADB mode not available".to_string());
        };

        let running = self
            .adb_shell
            .as_mut()
            .map(InteractiveShell::is_running)
            .unwrap_or(false);
        if !running {
            match InteractiveShell::spawn(&adb, &["shell"], self.adb_output.clone()) {
                Ok(shell) => {
                    info!("ADB shell process started");
                    self.adb_shell = Some(shell);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to start ADB shell");
                    return Err("Failed to start ADB shell".to_string());
                }
            }
        }

        let Some(shell) = self.adb_shell.as_mut() else {
            return Err("Failed to start ADB shell".to_string());
        };
        shell.send(command).await.map_err(|e| {
            warn!(error = %e, "Failed to write to ADB shell");
            format!("Error sending command to ADB shell: {e}")
        })
    }

    pub async fn shutdown(&mut self) {
        if let Some(mut shell) = self.adb_shell.take() {
            shell.kill().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn agent_in(dir: &Path, adb: Option<PathBuf>) -> (Agent, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let agent = Agent::new(dir.to_path_buf(), adb, Duration::from_secs(5), tx)
            .with_home(Some(dir.to_path_buf()));
        (agent, rx)
    }

    #[test]
    fn prompt_uses_directory_name() {
        let (agent, _rx) = agent_in(Path::new("/srv/projects"), None);
        assert_eq!(agent.prompt(), "local:projects$ ");
    }

    #[test]
    fn welcome_lists_modes() {
        let (agent, _rx) = agent_in(Path::new("/srv/projects"), None);
        assert_eq!(
            agent.welcome(),
            "Multi-Terminal Remote Console\nMode: local\nCommands: 'mode local', 'help'\nlocal:projects$ "
        );

        let (agent, _rx) = agent_in(Path::new("/srv/projects"), Some("adb".into()));
        assert!(agent.welcome().contains("'mode local', 'mode adb', 'help'"));
    }

    #[test]
    fn help_mentions_adb_only_when_available() {
        let (agent, _rx) = agent_in(Path::new("/tmp"), None);
        assert!(!agent.help().contains("ADB"));

        let (agent, _rx) = agent_in(Path::new("/tmp"), Some("adb".into()));
        assert!(agent.help().contains("- mode adb: Switch to ADB shell mode"));
        assert!(agent.help().contains("- Any ADB shell command (in ADB mode)"));
    }

    #[tokio::test]
    async fn mode_adb_without_adb_stays_local() {
        let dir = TempDir::new().unwrap();
        let (mut agent, _rx) = agent_in(dir.path(), None);

        let reply = agent.execute("mode adb").await.unwrap();
        assert!(reply.starts_with("ADB not available"));
        assert_eq!(agent.mode(), Mode::Local);
    }

    #[tokio::test]
    async fn mode_switching() {
        let dir = TempDir::new().unwrap();
        let (mut agent, _rx) = agent_in(dir.path(), Some("adb".into()));

        let reply = agent.execute("  mode adb ").await.unwrap();
        assert_eq!(reply, "Switched to ADB mode\nadb$ ");
        assert_eq!(agent.mode(), Mode::Adb);

        let reply = agent.execute("mode local").await.unwrap();
        assert!(reply.starts_with("Switched to local mode\nlocal:"));
        assert_eq!(agent.mode(), Mode::Local);
    }

    #[tokio::test]
    async fn pwd_and_cd_track_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("inner")).unwrap();
        let root = dir.path().canonicalize().unwrap();
        let (mut agent, _rx) = agent_in(&root, None);

        let reply = agent.execute("cd inner").await.unwrap();
        assert_eq!(
            reply,
            format!("Changed directory to: {}\nlocal:inner$ ", root.join("inner").display())
        );

        let reply = agent.execute("pwd").await.unwrap();
        assert_eq!(reply, format!("{}\nlocal:inner$ ", root.join("inner").display()));

        let reply = agent.execute("cd").await.unwrap();
        assert!(reply.starts_with("Changed directory to: "));
        assert_eq!(agent.cwd(), root.as_path());
    }

    #[tokio::test]
    async fn cd_to_missing_directory_keeps_cwd() {
        let dir = TempDir::new().unwrap();
        let (mut agent, _rx) = agent_in(dir.path(), None);

        let reply = agent.execute("cd missing").await.unwrap();
        assert!(reply.contains("No such file or directory"));
        assert_eq!(agent.cwd(), dir.path());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn local_commands_run_in_cwd() {
        let dir = TempDir::new().unwrap();
        let (mut agent, _rx) = agent_in(dir.path(), None);

        let reply = agent.execute("echo hi").await.unwrap();
        assert!(reply.starts_with("hi\n"));
        assert!(reply.ends_with("$ "));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn adb_mode_streams_through_the_shell() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in adb: `fake-adb shell` becomes a plain sh reading stdin.
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("fake-adb");
        std::fs::write(&fake, "#!/bin/sh\nexec sh\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (mut agent, mut rx) = agent_in(dir.path(), Some(fake));
        agent.execute("mode adb").await.unwrap();

        assert_eq!(agent.execute("echo via-adb").await, None);
        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some("via-adb"));

        assert_eq!(agent.execute("pwd").await, None);
        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert!(line.is_some());
        agent.shutdown().await;
    }
}
