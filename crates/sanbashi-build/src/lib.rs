//! Sanbashi のイメージビルド機能
//!
//! ディレクトリ配下の Dockerfile を検索してプロセスタイプごとのジョブにまとめ、
//! docker CLI で全ジョブをビルドしてからプッシュする。

pub mod chooser;
pub mod command;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod toolchain;

pub use chooser::{JobChooser, NearestChooser, PromptChooser, choose_jobs};
pub use command::{CommandOutcome, CommandSpec, Stdout, run_command};
pub use error::{BuildError, BuildResult, ExitReason};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use resolver::{
    DEFAULT_PROCESS_TYPE, Job, JobGroups, JobResolver, Rank, parse_build_args, validate_build_arg,
};
pub use toolchain::{DockerCli, Toolchain, ToolchainVersion, parse_version};
