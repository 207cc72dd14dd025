use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// サフィックスなしの Dockerfile に割り当てるプロセスタイプ
pub const DEFAULT_PROCESS_TYPE: &str = "web";

static DOCKERFILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Dockerfile(?:\.(\w+))?$").unwrap());

/// 同名ジョブの優先順位
///
/// `depth` が小さいほど（ルートに近いほど）優先され、
/// 同じ深さならサフィックスなしの `Dockerfile` が優先される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    pub depth: usize,
    pub suffix_presence: u8,
}

/// 1つの Dockerfile から解決されたビルド＆プッシュ対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// プロセスタイプ名 (web, worker, ...)
    pub name: String,
    /// プッシュ先イメージ: {registry}/{app}/{name}
    pub resource: String,
    pub descriptor: PathBuf,
    pub is_default_named: bool,
    pub rank: Rank,
}

impl Job {
    /// ビルドコンテキスト（Dockerfile のあるディレクトリ）
    pub fn context_dir(&self) -> PathBuf {
        match self.descriptor.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// プロセスタイプ名 → ランク順のジョブ一覧
pub type JobGroups = IndexMap<String, Vec<Job>>;

pub struct JobResolver {
    root: PathBuf,
    resource_root: String,
    default_process_type: String,
}

impl JobResolver {
    /// `resource_root` は `{registry}/{app}` 形式
    pub fn new(root: PathBuf, resource_root: impl Into<String>) -> Self {
        Self {
            root,
            resource_root: resource_root.into(),
            default_process_type: DEFAULT_PROCESS_TYPE.to_string(),
        }
    }

    pub fn with_default_process_type(mut self, process_type: impl Into<String>) -> Self {
        self.default_process_type = process_type.into();
        self
    }

    /// Dockerfile を検索
    ///
    /// - 非再帰: ルート直下の `Dockerfile` と `Dockerfile.<type>`
    /// - 再帰: 任意の深さの `Dockerfile.<type>` のみ（サフィックスなしは除外）
    ///
    /// 見つからない場合は空の Vec を返す。並び順は glob の列挙順。
    pub fn discover(&self, recursive: bool) -> BuildResult<Vec<PathBuf>> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = if recursive {
            format!("{}/**/Dockerfile.*", root)
        } else {
            format!("{}/Dockerfile*", root)
        };

        // 隠しディレクトリは辿らない
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| BuildError::Discovery(format!("{}: {}", pattern, e)))?;

        let mut dockerfiles = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("Skipping unreadable path: {}", e);
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            match suffix_of(&path) {
                Some(Some(_)) => dockerfiles.push(path),
                Some(None) if !recursive => dockerfiles.push(path),
                _ => {}
            }
        }

        tracing::debug!(
            "Discovered {} Dockerfile(s) under {} (recursive: {})",
            dockerfiles.len(),
            self.root.display(),
            recursive
        );

        Ok(dockerfiles)
    }

    /// Dockerfile のパスをジョブに変換
    ///
    /// ファイル名が `Dockerfile` / `Dockerfile.<type>` でなければ None。
    pub fn parse(&self, descriptor: &Path) -> Option<Job> {
        let suffix = suffix_of(descriptor)?;

        let (name, is_default_named) = match suffix {
            Some(suffix) => (suffix, false),
            None => (self.default_process_type.clone(), true),
        };

        Some(Job {
            resource: format!("{}/{}", self.resource_root, name),
            name,
            descriptor: descriptor.to_path_buf(),
            is_default_named,
            rank: Rank {
                depth: self.depth_of(descriptor),
                suffix_presence: if is_default_named { 0 } else { 1 },
            },
        })
    }

    /// ジョブをプロセスタイプごとにまとめる
    ///
    /// `requested` が空でなければ該当する名前のジョブのみ残す。
    /// 各グループ内はランク順（近いもの優先、次にサフィックスなし優先）。
    pub fn group(&self, descriptors: &[PathBuf], requested: &[String]) -> JobGroups {
        let mut jobs: Vec<Job> = descriptors
            .iter()
            .filter_map(|descriptor| self.parse(descriptor))
            .filter(|job| requested.is_empty() || requested.contains(&job.name))
            .collect();

        // 安定ソートなので同ランクは検索順のまま残る
        jobs.sort_by_key(|job| job.rank);

        let mut groups = JobGroups::new();
        for job in jobs {
            groups.entry(job.name.clone()).or_default().push(job);
        }
        groups
    }

    /// discover + group
    pub fn resolve(&self, recursive: bool, requested: &[String]) -> BuildResult<JobGroups> {
        let descriptors = self.discover(recursive)?;
        Ok(self.group(&descriptors, requested))
    }

    /// ルートからの深さ（ファイル自身を含む）
    fn depth_of(&self, descriptor: &Path) -> usize {
        let relative = descriptor.strip_prefix(&self.root).unwrap_or(descriptor);
        relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    }
}

/// `Some(None)` = サフィックスなし、`Some(Some(type))` = サフィックスあり
fn suffix_of(path: &Path) -> Option<Option<String>> {
    let file_name = path.file_name()?.to_str()?;
    let captures = DOCKERFILE_REGEX.captures(file_name)?;
    Some(captures.get(1).map(|m| m.as_str().to_string()))
}

/// `--arg` の値をビルド引数に分解
///
/// `KEY=VALUE,KEY2=VALUE2` をカンマで分割し、空要素は捨てる。
pub fn parse_build_args(raw: Option<&str>) -> Vec<String> {
    let args: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect();

    for arg in &args {
        validate_build_arg(arg);
    }

    args
}

/// ビルド引数の検証（機密情報の警告）
pub fn validate_build_arg(arg: &str) {
    let sensitive_patterns = ["password", "token", "secret", "api_key", "private_key"];

    let key = arg.split_once('=').map(|(k, _)| k).unwrap_or(arg);
    let key_lower = key.to_lowercase();
    if sensitive_patterns.iter().any(|p| key_lower.contains(p)) {
        tracing::warn!(
            "警告: ビルド引数 '{}' は機密情報を含む可能性があります。\n\
             ビルド引数はイメージ履歴に記録されます。",
            key
        );
    }
}
