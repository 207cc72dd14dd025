use super::Outcome;
use sanbashi_build::{BuildError, DockerCli};
use sanbashi_config::Settings;

/// プッシュ済みのイメージをローカルで起動する
///
/// コンテナの終了コードをそのまま返す。
pub async fn handle(
    settings: &Settings,
    app: &str,
    process_type: &str,
    command: &[String],
    port: u16,
    verbose: bool,
) -> anyhow::Result<Outcome> {
    let resource = format!("{}/{}", settings.resource_root(app), process_type);

    let outcome = DockerCli::new()
        .verbose(verbose)
        .run(&resource, port, command, current_uid())
        .await?;

    if outcome.success() {
        return Ok(Outcome::Done);
    }

    match (outcome.code, outcome.reason()) {
        (Some(code), _) => Ok(Outcome::Exit(u8::try_from(code).unwrap_or(1))),
        (None, Some(reason)) => Err(BuildError::ToolchainFailed {
            command: "docker run".to_string(),
            reason,
        }
        .into()),
        (None, None) => Ok(Outcome::Done),
    }
}

#[cfg(unix)]
fn current_uid() -> Option<u32> {
    // SAFETY: getuid は常に成功し、副作用もない
    Some(unsafe { libc::getuid() })
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}
