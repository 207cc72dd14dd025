pub mod login;
pub mod logout;
pub mod push;
pub mod rm;
pub mod run;

/// コマンドの結果（終了コードの決定に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// 対象が見つからず何もしなかった
    NothingToDo,
    /// 子プロセスの終了コードをそのまま返す
    Exit(u8),
}
