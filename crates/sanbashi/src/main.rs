mod api;
mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::Outcome;
use std::process::ExitCode;

/// ビルドやプッシュに失敗した場合
const EXIT_FAILURE: u8 = 1;
/// 対象の Dockerfile が見つからなかった場合
const EXIT_NOTHING_TO_DO: u8 = 3;

#[derive(Parser)]
#[command(name = "sanbashi")]
#[command(
    about = "Dockerfile をプロセスタイプごとにビルドし、コンテナレジストリへプッシュする",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドしてレジストリにプッシュ
    Push {
        /// プロセスタイプ (web, worker, ...)。省略時は見つかったもの
        process_types: Vec<String>,
        /// アプリ名
        #[arg(short, long, env = "HEROKU_APP")]
        app: String,
        /// サブディレクトリの Dockerfile.<process_type> もすべて対象にする
        #[arg(short = 'R', long)]
        recursive: bool,
        /// ビルド引数（例: NODE_ENV=production,VERSION=1）
        #[arg(long)]
        arg: Option<String>,
        /// 同名の Dockerfile が複数あっても対話的に選択しない
        #[arg(long)]
        no_prompt: bool,
        /// 実行する docker コマンドを表示
        #[arg(short, long)]
        verbose: bool,
    },
    /// コンテナレジストリにログイン
    Login {
        /// 実行する docker コマンドを表示
        #[arg(short, long)]
        verbose: bool,
    },
    /// コンテナレジストリからログアウト
    Logout {
        /// 実行する docker コマンドを表示
        #[arg(short, long)]
        verbose: bool,
    },
    /// プロセスタイプのコンテナを削除
    Rm {
        /// 削除するプロセスタイプ
        #[arg(required = true)]
        process_types: Vec<String>,
        /// アプリ名
        #[arg(short, long, env = "HEROKU_APP")]
        app: String,
    },
    /// プッシュ済みイメージをローカルで実行
    Run {
        /// プロセスタイプ
        process_type: String,
        /// コンテナ内で実行するコマンド（-- 以降）
        #[arg(last = true)]
        command: Vec<String>,
        /// アプリ名
        #[arg(short, long, env = "HEROKU_APP")]
        app: String,
        /// コンテナに PORT として渡すポート番号
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// 実行する docker コマンドを表示
        #[arg(short, long)]
        verbose: bool,
    },
    /// バージョン情報を表示
    Version,
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Push { verbose, .. }
            | Commands::Login { verbose }
            | Commands::Logout { verbose }
            | Commands::Run { verbose, .. } => *verbose,
            Commands::Rm { .. } | Commands::Version => false,
        }
    }
}

/// ログは stderr に出力（RUST_LOG が優先）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn dispatch(command: Commands) -> anyhow::Result<Outcome> {
    if matches!(command, Commands::Version) {
        println!("sanbashi {}", env!("CARGO_PKG_VERSION"));
        return Ok(Outcome::Done);
    }

    let settings = sanbashi_config::Settings::from_env()?;

    match command {
        Commands::Push {
            process_types,
            app,
            recursive,
            arg,
            no_prompt,
            verbose,
        } => {
            commands::push::handle(
                &settings,
                &app,
                &process_types,
                recursive,
                arg.as_deref(),
                no_prompt,
                verbose,
            )
            .await
        }
        Commands::Login { verbose } => commands::login::handle(&settings, verbose).await,
        Commands::Logout { verbose } => commands::logout::handle(&settings, verbose).await,
        Commands::Rm { process_types, app } => {
            commands::rm::handle(&settings, &app, &process_types).await
        }
        Commands::Run {
            process_type,
            command,
            app,
            port,
            verbose,
        } => commands::run::handle(&settings, &app, &process_type, &command, port, verbose).await,
        Commands::Version => unreachable!("Version is handled before settings loading"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    match dispatch(cli.command).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::NothingToDo) => ExitCode::from(EXIT_NOTHING_TO_DO),
        Ok(Outcome::Exit(code)) => ExitCode::from(code),
        Err(e) => {
            let message = match e.downcast_ref::<sanbashi_build::BuildError>() {
                Some(build_error) => build_error.user_message(),
                None => format!("{:#}", e),
            };
            eprintln!("{} {}", "Error:".red().bold(), message);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
