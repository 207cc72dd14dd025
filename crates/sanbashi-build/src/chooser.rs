//! 同名プロセスタイプの Dockerfile が複数ある場合の選択
//!
//! 非対話環境では [`NearestChooser`]、端末では [`PromptChooser`] を注入する。

use crate::error::{BuildError, BuildResult};
use crate::resolver::{Job, JobGroups};
use colored::Colorize;
use std::io::{BufRead, Write};

/// 候補の中から1つを選ぶ
pub trait JobChooser {
    /// `candidates` はランク順で2件以上。選ばれた候補のインデックスを返す。
    ///
    /// 範囲外のインデックスは `SelectionAborted` として扱われる。
    fn choose(&mut self, process_type: &str, candidates: &[Job]) -> BuildResult<usize>;
}

/// 最も近い Dockerfile を選ぶ。ランクが同じ場合は選ばずにエラー。
#[derive(Debug, Default)]
pub struct NearestChooser;

impl JobChooser for NearestChooser {
    fn choose(&mut self, process_type: &str, candidates: &[Job]) -> BuildResult<usize> {
        if candidates.len() > 1 && candidates[0].rank == candidates[1].rank {
            return Err(BuildError::UnresolvableConflict {
                process_type: process_type.to_string(),
                paths: candidates.iter().map(|j| j.descriptor.clone()).collect(),
            });
        }

        tracing::warn!("Using nearest match for '{}' process type:", process_type);
        for (i, job) in candidates.iter().enumerate() {
            let state = if i == 0 { "used" } else { "ignored" };
            tracing::warn!("{} ({})", job.descriptor.display(), state);
        }

        Ok(0)
    }
}

/// 候補を一覧表示して番号で選ばせる
pub struct PromptChooser<R, W> {
    reader: R,
    writer: W,
}

impl PromptChooser<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> JobChooser for PromptChooser<R, W> {
    fn choose(&mut self, process_type: &str, candidates: &[Job]) -> BuildResult<usize> {
        writeln!(
            self.writer,
            "{} Found multiple Dockerfiles with process type {}. Please choose one to build and push",
            "?".green().bold(),
            process_type.cyan()
        )?;
        for (i, job) in candidates.iter().enumerate() {
            writeln!(self.writer, "  {}) {}", i + 1, job.descriptor.display())?;
        }

        loop {
            write!(self.writer, "番号を選択 [1-{}]: ", candidates.len())?;
            self.writer.flush()?;

            let mut input = String::new();
            if self.reader.read_line(&mut input)? == 0 {
                return Err(BuildError::SelectionAborted(process_type.to_string()));
            }

            match input.trim().parse::<usize>() {
                Ok(n) if (1..=candidates.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(
                    self.writer,
                    "  {} 1 から {} の番号を入力してください",
                    "⚠".yellow(),
                    candidates.len()
                )?,
            }
        }
    }
}

/// ジョブグループから実際にビルドするジョブを選ぶ
///
/// 非再帰の場合は最初のグループだけを採用し、以降は警告を出して無視する。
/// 再帰の場合は全グループから1つずつ選ぶ。
pub fn choose_jobs(
    groups: &JobGroups,
    recursive: bool,
    chooser: &mut dyn JobChooser,
) -> BuildResult<Vec<Job>> {
    let mut chosen = Vec::new();

    for (process_type, group) in groups {
        if !recursive && !chosen.is_empty() {
            tracing::warn!(
                "Skipping '{}' process type (use --recursive to push every process type)",
                process_type
            );
            continue;
        }

        let job = match group.as_slice() {
            [] => continue,
            [only] => only.clone(),
            candidates => {
                let index = chooser.choose(process_type, candidates)?;
                candidates
                    .get(index)
                    .cloned()
                    .ok_or_else(|| BuildError::SelectionAborted(process_type.clone()))?
            }
        };

        chosen.push(job);
    }

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::JobResolver;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn groups(dockerfiles: &[&str]) -> JobGroups {
        let dockerfiles: Vec<PathBuf> = dockerfiles.iter().map(PathBuf::from).collect();
        JobResolver::new(PathBuf::from("."), "rootfulroot").group(&dockerfiles, &[])
    }

    fn descriptors(jobs: &[Job]) -> Vec<PathBuf> {
        jobs.iter().map(|j| j.descriptor.clone()).collect()
    }

    /// 呼ばれたら失敗させるためのチューザー
    struct Unreachable;

    impl JobChooser for Unreachable {
        fn choose(&mut self, process_type: &str, _candidates: &[Job]) -> BuildResult<usize> {
            panic!("chooser called for {}", process_type);
        }
    }

    /// 常に固定のインデックスを返すチューザー
    struct Fixed(usize);

    impl JobChooser for Fixed {
        fn choose(&mut self, _process_type: &str, _candidates: &[Job]) -> BuildResult<usize> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_out_of_range_choice_is_aborted() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web"]);
        let err = choose_jobs(&groups, true, &mut Fixed(5)).unwrap_err();

        match err {
            BuildError::SelectionAborted(process_type) => assert_eq!(process_type, "web"),
            other => panic!("Expected SelectionAborted, got {:?}", other),
        }
    }

    #[test]
    fn test_in_range_choice_is_used() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web"]);
        let chosen = choose_jobs(&groups, true, &mut Fixed(1)).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("b/Dockerfile.web")]);
    }

    #[test]
    fn test_single_entry_selected_directly() {
        let groups = groups(&["Nested/Dockerfile.web"]);
        let chosen = choose_jobs(&groups, true, &mut Unreachable).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("Nested/Dockerfile.web")]);
    }

    #[test]
    fn test_non_recursive_takes_first_group_only() {
        let groups = groups(&["Dockerfile", "Dockerfile.worker"]);
        let chosen = choose_jobs(&groups, false, &mut Unreachable).unwrap();

        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].name, "web");
    }

    #[test]
    fn test_recursive_takes_every_group() {
        let groups = groups(&["Dockerfile.web", "worker/Dockerfile.worker"]);
        let chosen = choose_jobs(&groups, true, &mut Unreachable).unwrap();

        let names: Vec<&str> = chosen.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["web", "worker"]);
    }

    #[test]
    fn test_nearest_picks_top_ranked() {
        let groups = groups(&["Nested/Dockerfile.web", "Dockerfile.web"]);
        let chosen = choose_jobs(&groups, true, &mut NearestChooser).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("Dockerfile.web")]);
    }

    #[test]
    fn test_nearest_prefers_bare_dockerfile() {
        let groups = groups(&["Dockerfile.web", "Dockerfile"]);
        let chosen = choose_jobs(&groups, false, &mut NearestChooser).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("Dockerfile")]);
    }

    #[test]
    fn test_nearest_rejects_tie() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web", "c/d/Dockerfile.web"]);
        let err = choose_jobs(&groups, true, &mut NearestChooser).unwrap_err();

        match err {
            BuildError::UnresolvableConflict {
                process_type,
                paths,
            } => {
                assert_eq!(process_type, "web");
                assert_eq!(
                    paths,
                    vec![
                        PathBuf::from("a/Dockerfile.web"),
                        PathBuf::from("b/Dockerfile.web"),
                        PathBuf::from("c/d/Dockerfile.web"),
                    ]
                );
            }
            other => panic!("Expected UnresolvableConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_prompt_returns_selected_candidate() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web"]);
        let mut output = Vec::new();
        let mut chooser = PromptChooser::new(Cursor::new("2\n"), &mut output);

        let chosen = choose_jobs(&groups, true, &mut chooser).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("b/Dockerfile.web")]);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Found multiple Dockerfiles with process type"));
        assert!(output.contains("1) a/Dockerfile.web"));
        assert!(output.contains("2) b/Dockerfile.web"));
    }

    #[test]
    fn test_prompt_asks_again_on_invalid_input() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web"]);
        let mut output = Vec::new();
        let mut chooser = PromptChooser::new(Cursor::new("x\n3\n1\n"), &mut output);

        let chosen = choose_jobs(&groups, true, &mut chooser).unwrap();

        assert_eq!(descriptors(&chosen), vec![PathBuf::from("a/Dockerfile.web")]);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("番号を選択").count(), 3);
    }

    #[test]
    fn test_prompt_aborts_on_eof() {
        let groups = groups(&["a/Dockerfile.web", "b/Dockerfile.web"]);
        let mut chooser = PromptChooser::new(Cursor::new(""), Vec::new());

        let err = choose_jobs(&groups, true, &mut chooser).unwrap_err();
        assert!(matches!(err, BuildError::SelectionAborted(name) if name == "web"));
    }
}
