use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 子プロセスが成功しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 非ゼロの終了コード
    Code(i32),
    /// シグナルによる終了
    Signal(i32),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "{}", code),
            ExitReason::Signal(signal) => write!(f, "signal {}", signal),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid discovery pattern: {0}")]
    Discovery(String),

    #[error(
        "Cannot build. More than one Dockerfile defines the process type '{process_type}':\n{}",
        format_paths(.paths)
    )]
    UnresolvableConflict {
        process_type: String,
        paths: Vec<PathBuf>,
    },

    #[error("Selection aborted for process type '{0}'")]
    SelectionAborted(String),

    #[error("{command} exited with {reason}")]
    ToolchainFailed { command: String, reason: ExitReason },

    #[error("Failed to run {command}: {source}")]
    ToolchainSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Version String: {0}")]
    InvalidVersion(String),

    #[error("Build failed for '{process_type}' ({}): {source}", .descriptor.display())]
    BuildPhase {
        process_type: String,
        descriptor: PathBuf,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Push failed for '{process_type}' ({resource}): {source}")]
    PushPhase {
        process_type: String,
        resource: String,
        #[source]
        source: Box<BuildError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::UnresolvableConflict { .. } => {
                format!(
                    "{}\n\
                     \n\
                     解決方法:\n\
                     1. 不要なDockerfileを削除またはリネームしてください\n\
                     2. 端末から実行して対話的に選択してください",
                    self
                )
            }
            BuildError::ToolchainSpawn { command, .. } => {
                format!(
                    "{}\n\
                     \n\
                     {} がインストールされ、PATH に含まれているか確認してください。",
                    self, command
                )
            }
            BuildError::BuildPhase { .. } => {
                format!(
                    "{}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    self
                )
            }
            BuildError::PushPhase { .. } => {
                format!(
                    "{}\n\
                     \n\
                     レジストリにログインしているか確認してください: sanbashi login",
                    self
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_every_path() {
        let err = BuildError::UnresolvableConflict {
            process_type: "web".to_string(),
            paths: vec![PathBuf::from("a/Dockerfile.web"), PathBuf::from("b/Dockerfile.web")],
        };
        let msg = err.to_string();
        assert!(msg.contains("'web'"));
        assert!(msg.contains("a/Dockerfile.web\nb/Dockerfile.web"));
    }

    #[test]
    fn test_toolchain_failed_message() {
        let err = BuildError::ToolchainFailed {
            command: "docker build".to_string(),
            reason: ExitReason::Code(1),
        };
        assert_eq!(err.to_string(), "docker build exited with 1");

        let err = BuildError::ToolchainFailed {
            command: "docker push".to_string(),
            reason: ExitReason::Signal(9),
        };
        assert_eq!(err.to_string(), "docker push exited with signal 9");
    }

    #[test]
    fn test_user_message_adds_hint() {
        let err = BuildError::PushPhase {
            process_type: "web".to_string(),
            resource: "registry.heroku.com/app/web".to_string(),
            source: Box::new(BuildError::ToolchainFailed {
                command: "docker push".to_string(),
                reason: ExitReason::Code(1),
            }),
        };
        let msg = err.user_message();
        assert!(msg.starts_with("Push failed for 'web'"));
        assert!(msg.contains("sanbashi login"));
    }
}
