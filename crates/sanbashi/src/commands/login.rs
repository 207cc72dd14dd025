use super::Outcome;
use colored::Colorize;
use sanbashi_build::DockerCli;
use sanbashi_config::{ApiAuth, Settings};

/// API トークンをパスワードとしてレジストリにログイン
pub async fn handle(settings: &Settings, verbose: bool) -> anyhow::Result<Outcome> {
    let registry = settings.registry();
    let token = ApiAuth::new().token(settings.api_host())?;

    println!("{}", format!("{} にログイン中...", registry).blue());

    DockerCli::new()
        .verbose(verbose)
        .login(&registry, &token)
        .await?;

    println!("{}", "✓ ログインしました".green().bold());
    Ok(Outcome::Done)
}
