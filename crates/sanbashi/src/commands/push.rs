use super::Outcome;
use colored::Colorize;
use sanbashi_build::{
    DockerCli, JobChooser, JobResolver, NearestChooser, Pipeline, PipelineOutcome, PromptChooser,
    choose_jobs, parse_build_args,
};
use sanbashi_config::Settings;
use std::io::IsTerminal;

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    settings: &Settings,
    app: &str,
    process_types: &[String],
    recursive: bool,
    build_args: Option<&str>,
    no_prompt: bool,
    verbose: bool,
) -> anyhow::Result<Outcome> {
    let root = std::env::current_dir()?;

    let resolver = JobResolver::new(root, settings.resource_root(app));
    let groups = resolver.resolve(recursive, process_types)?;

    let jobs = {
        let mut chooser: Box<dyn JobChooser> = if !no_prompt && std::io::stdin().is_terminal() {
            Box::new(PromptChooser::stdio())
        } else {
            Box::new(NearestChooser)
        };
        choose_jobs(&groups, recursive, chooser.as_mut())?
    };

    if !jobs.is_empty() {
        println!("{}", format!("ビルド対象 ({} 個):", jobs.len()).bold());
        for job in &jobs {
            println!("  • {} ({})", job.name.cyan(), job.descriptor.display());
        }
    }

    let build_args = parse_build_args(build_args);
    let docker = DockerCli::new().verbose(verbose);

    match Pipeline::new(&docker).run(&jobs, &build_args).await? {
        PipelineOutcome::NothingToDo => {
            println!("{}", "プッシュするイメージがありません".yellow());
            Ok(Outcome::NothingToDo)
        }
        PipelineOutcome::Completed { pushed } => {
            println!();
            println!(
                "{}",
                "✓ すべてのイメージがビルド＆プッシュされました！"
                    .green()
                    .bold()
            );
            println!();
            println!("{}", "結果サマリー:".bold());
            for resource in &pushed {
                println!("  {} {}", "✓".green(), resource.cyan());
            }
            Ok(Outcome::Done)
        }
    }
}
