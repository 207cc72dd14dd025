use super::Outcome;
use crate::api::PlatformClient;
use colored::Colorize;
use sanbashi_config::{ApiAuth, Settings};
use std::io::Write;

/// プロセスタイプのイメージ割り当てを外す
///
/// 指定順に処理し、最初の失敗で中断する。
pub async fn handle(
    settings: &Settings,
    app: &str,
    process_types: &[String],
) -> anyhow::Result<Outcome> {
    let token = ApiAuth::new().token(settings.api_host())?;
    let client = PlatformClient::new(&settings.api_url, token);

    for process_type in process_types {
        print!(
            "Removing container {} for {}... ",
            process_type.cyan(),
            app.magenta()
        );
        std::io::stdout().flush()?;

        match client.remove_process_type(app, process_type).await {
            Ok(()) => println!("{}", "done".green()),
            Err(e) => {
                println!("{}", "!".red().bold());
                return Err(e);
            }
        }
    }

    Ok(Outcome::Done)
}
