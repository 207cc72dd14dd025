//! docker CLI ラッパー
//!
//! ビルド・プッシュ・実行・ログイン・ログアウトを docker コマンドで行う。

use crate::command::{CommandOutcome, CommandSpec, Stdout, run_command};
use crate::error::{BuildError, BuildResult};
use crate::resolver::Job;
use async_trait::async_trait;
use colored::Colorize;
use regex::Regex;
use std::sync::LazyLock;

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(\d+)\.(\d+)\.(\d+)(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
    )
    .unwrap()
});

/// `--email` フラグが不要になったバージョン
const EMAIL_FLAG_REMOVED_IN: ToolchainVersion = ToolchainVersion {
    major: 1,
    minor: 11,
};

/// ツールチェーンのバージョン（major.minor のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolchainVersion {
    pub major: u64,
    pub minor: u64,
}

impl ToolchainVersion {
    /// 古い docker login は `--email` を要求する
    pub fn requires_email_flag(&self) -> bool {
        *self < EMAIL_FLAG_REMOVED_IN
    }
}

/// バージョン文字列をパース
///
/// 末尾の改行を取り除き、`MAJOR.MINOR.PATCH[-pre][+build]` を受け付ける。
/// パッチ以降は捨てる。
pub fn parse_version(raw: &str) -> BuildResult<ToolchainVersion> {
    let version = raw.trim_end_matches(['\r', '\n']);
    let invalid = || BuildError::InvalidVersion(version.to_string());

    let captures = VERSION_REGEX.captures(version).ok_or_else(invalid)?;
    let major = captures[1].parse().map_err(|_| invalid())?;
    let minor = captures[2].parse().map_err(|_| invalid())?;

    Ok(ToolchainVersion { major, minor })
}

/// パイプラインが使うビルド・プッシュ操作
#[async_trait]
pub trait Toolchain: Send + Sync {
    async fn build(&self, job: &Job, build_args: &[String]) -> BuildResult<()>;

    async fn push(&self, job: &Job) -> BuildResult<()>;
}

/// docker コマンドを子プロセスとして実行する
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
    verbose: bool,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
            verbose: false,
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            verbose: false,
        }
    }

    /// 実行するコマンドラインを表示する
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build_spec(&self, job: &Job, build_args: &[String]) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program)
            .arg("build")
            .arg("-f")
            .arg(job.descriptor.to_string_lossy())
            .arg("-t")
            .arg(&job.resource);

        for arg in build_args.iter().filter(|a| !a.is_empty()) {
            spec = spec.arg("--build-arg").arg(arg);
        }

        spec.arg(job.context_dir().to_string_lossy())
    }

    pub fn push_spec(&self, job: &Job) -> CommandSpec {
        CommandSpec::new(&self.program).arg("push").arg(&job.resource)
    }

    pub fn version_spec(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(["version", "--format", "{{.Server.Version}}"])
            .stdout(Stdout::Capture)
    }

    pub fn login_spec(
        &self,
        registry: &str,
        password: &str,
        version: ToolchainVersion,
    ) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).arg("login");
        if version.requires_email_flag() {
            spec = spec.arg("--email=_");
        }
        spec.arg("--username=_")
            .arg(format!("--password={}", password))
            .arg(registry)
    }

    pub fn logout_spec(&self, registry: &str) -> CommandSpec {
        CommandSpec::new(&self.program).arg("logout").arg(registry)
    }

    pub fn run_spec(
        &self,
        resource: &str,
        port: u16,
        command: &[String],
        user: Option<u32>,
    ) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).arg("run");
        if let Some(uid) = user {
            spec = spec.arg("--user").arg(uid.to_string());
        }
        spec.arg("-e")
            .arg(format!("PORT={}", port))
            .arg("-it")
            .arg(resource)
            .args(command.iter().cloned())
    }

    /// サーバーのバージョンを取得
    pub async fn version(&self) -> BuildResult<ToolchainVersion> {
        let spec = self.version_spec();
        let outcome = self.execute(&spec).await?.check(&spec.label())?;
        parse_version(outcome.stdout.as_deref().unwrap_or_default())
    }

    /// レジストリにログイン
    ///
    /// バージョンを確認してから古い docker 向けのフラグを付ける。
    pub async fn login(&self, registry: &str, password: &str) -> BuildResult<()> {
        let version = self.version().await?;
        tracing::debug!("docker server version: {}.{}", version.major, version.minor);

        let spec = self.login_spec(registry, password, version);
        self.execute(&spec).await?.check(&spec.label())?;
        Ok(())
    }

    pub async fn logout(&self, registry: &str) -> BuildResult<()> {
        let spec = self.logout_spec(registry);
        self.execute(&spec).await?.check(&spec.label())?;
        Ok(())
    }

    /// コンテナを実行し、終了結果をそのまま返す
    pub async fn run(
        &self,
        resource: &str,
        port: u16,
        command: &[String],
        user: Option<u32>,
    ) -> BuildResult<CommandOutcome> {
        let spec = self.run_spec(resource, port, command, user);
        self.execute(&spec).await
    }

    async fn execute(&self, spec: &CommandSpec) -> BuildResult<CommandOutcome> {
        if self.verbose {
            println!("{}", format!("> {}", spec.display()).dimmed());
        }
        run_command(spec).await
    }
}

#[async_trait]
impl Toolchain for DockerCli {
    async fn build(&self, job: &Job, build_args: &[String]) -> BuildResult<()> {
        let spec = self.build_spec(job, build_args);
        self.execute(&spec).await?.check(&spec.label())?;
        Ok(())
    }

    async fn push(&self, job: &Job) -> BuildResult<()> {
        let spec = self.push_spec(job);
        self.execute(&spec).await?.check(&spec.label())?;
        Ok(())
    }
}
