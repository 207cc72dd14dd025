//! ビルド＆プッシュのパイプライン
//!
//! 全ジョブのビルドが成功した場合のみプッシュに進む。
//! どちらのフェーズも最初の失敗で打ち切る。

use crate::error::{BuildError, BuildResult};
use crate::resolver::Job;
use crate::toolchain::Toolchain;
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// 対象ジョブなし
    NothingToDo,
    /// プッシュしたイメージ
    Completed { pushed: Vec<String> },
}

pub struct Pipeline<'a> {
    toolchain: &'a dyn Toolchain,
}

impl<'a> Pipeline<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self { toolchain }
    }

    pub async fn run(&self, jobs: &[Job], build_args: &[String]) -> BuildResult<PipelineOutcome> {
        if jobs.is_empty() {
            tracing::warn!("No images to push");
            return Ok(PipelineOutcome::NothingToDo);
        }

        for job in jobs {
            println!();
            println!(
                "{}",
                format!("=== Building {} ({})", job.name, job.descriptor.display())
                    .green()
                    .bold()
            );

            self.toolchain
                .build(job, build_args)
                .await
                .map_err(|e| BuildError::BuildPhase {
                    process_type: job.name.clone(),
                    descriptor: job.descriptor.clone(),
                    source: Box::new(e),
                })?;

            tracing::info!("Successfully built: {}", job.resource);
        }

        let mut pushed = Vec::with_capacity(jobs.len());
        for job in jobs {
            println!();
            println!(
                "{}",
                format!("=== Pushing {} ({})", job.name, job.descriptor.display())
                    .blue()
                    .bold()
            );

            self.toolchain
                .push(job)
                .await
                .map_err(|e| BuildError::PushPhase {
                    process_type: job.name.clone(),
                    resource: job.resource.clone(),
                    source: Box::new(e),
                })?;

            tracing::info!("Successfully pushed: {}", job.resource);
            pushed.push(job.resource.clone());
        }

        Ok(PipelineOutcome::Completed { pushed })
    }
}
