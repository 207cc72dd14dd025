use super::Outcome;
use colored::Colorize;
use sanbashi_build::DockerCli;
use sanbashi_config::Settings;

pub async fn handle(settings: &Settings, verbose: bool) -> anyhow::Result<Outcome> {
    let registry = settings.registry();

    DockerCli::new().verbose(verbose).logout(&registry).await?;

    println!(
        "{}",
        format!("✓ {} からログアウトしました", registry).green()
    );
    Ok(Outcome::Done)
}
