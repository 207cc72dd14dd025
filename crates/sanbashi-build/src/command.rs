//! 外部コマンド実行
//!
//! 標準出力を継承・取得・破棄のいずれかにして子プロセスを起動し、
//! 終了まで待機する。build/push/version/login はすべてここを通る。

use crate::error::{BuildError, BuildResult, ExitReason};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// 子プロセスの標準出力の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdout {
    Inherit,
    Capture,
    Discard,
}

/// 実行するコマンド
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdout: Stdout,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdout: Stdout::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdout(mut self, mode: Stdout) -> Self {
        self.stdout = mode;
        self
    }

    /// エラー表示用の短い名前 (例: "docker build")
    pub fn label(&self) -> String {
        match self.args.first() {
            Some(sub) => format!("{} {}", self.program, sub),
            None => self.program.clone(),
        }
    }

    /// ログ表示用のコマンドライン（パスワードは伏せる）
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            if arg.starts_with("--password=") {
                parts.push("--password=********".to_string());
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// 子プロセスの終了結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    /// `Stdout::Capture` の場合のみ Some
    pub stdout: Option<String>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0) && self.signal.is_none()
    }

    pub fn reason(&self) -> Option<ExitReason> {
        if let Some(signal) = self.signal {
            return Some(ExitReason::Signal(signal));
        }
        match self.code {
            Some(0) => None,
            Some(code) => Some(ExitReason::Code(code)),
            None => Some(ExitReason::Code(-1)),
        }
    }

    /// 失敗していれば `ToolchainFailed` に変換
    pub fn check(self, command: &str) -> BuildResult<Self> {
        match self.reason() {
            None => Ok(self),
            Some(reason) => Err(BuildError::ToolchainFailed {
                command: command.to_string(),
                reason,
            }),
        }
    }
}

/// コマンドを実行して終了を待つ
///
/// 標準入力と標準エラーは常に継承する。
pub async fn run_command(spec: &CommandSpec) -> BuildResult<CommandOutcome> {
    tracing::debug!("Running: {}", spec.display());

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.stdin(Stdio::inherit());
    cmd.stderr(Stdio::inherit());
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let spawn_error = |source| BuildError::ToolchainSpawn {
        command: spec.label(),
        source,
    };

    let (status, stdout) = match spec.stdout {
        Stdout::Capture => {
            cmd.stdout(Stdio::piped());
            let output = cmd.output().await.map_err(spawn_error)?;
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            (output.status, Some(stdout))
        }
        Stdout::Inherit | Stdout::Discard => {
            let mode = if spec.stdout == Stdout::Inherit {
                Stdio::inherit()
            } else {
                Stdio::null()
            };
            cmd.stdout(mode);
            let status = cmd.status().await.map_err(spawn_error)?;
            (status, None)
        }
    };

    let outcome = CommandOutcome {
        code: status.code(),
        signal: signal_of(&status),
        stdout,
    };

    tracing::debug!(
        "{} finished (code: {:?}, signal: {:?})",
        spec.label(),
        outcome.code,
        outcome.signal
    );

    Ok(outcome)
}

#[cfg(unix)]
fn signal_of(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
