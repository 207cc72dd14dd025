use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("不正なホスト名です: '{0}' (HEROKU_HOST)")]
    InvalidHost(String),

    #[error(
        "{host} の認証情報が見つかりません。以下のいずれかを設定してください:\n\
        - HEROKU_API_KEY 環境変数\n\
        - ~/.netrc の machine {host} エントリ (NETRC 環境変数で場所を変更できます)"
    )]
    CredentialsNotFound { host: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
