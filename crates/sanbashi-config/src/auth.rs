//! API 認証情報の取得
//!
//! HEROKU_API_KEY 環境変数、なければ netrc から API トークンを取得します。
//! トークンはレジストリへの docker login のパスワードとしても使われます。

use crate::error::{ConfigError, Result};
use std::path::PathBuf;

/// API トークンの取得元を管理
#[derive(Debug)]
pub struct ApiAuth {
    netrc_path: PathBuf,
}

impl Default for ApiAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiAuth {
    /// 新しい ApiAuth を作成
    ///
    /// NETRC 環境変数、なければ ~/.netrc を使用
    pub fn new() -> Self {
        let netrc_path = std::env::var("NETRC")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".netrc"))
                    .unwrap_or_else(|| PathBuf::from(".netrc"))
            });

        Self { netrc_path }
    }

    /// 指定したパスの netrc を使用
    pub fn with_netrc_path(netrc_path: PathBuf) -> Self {
        Self { netrc_path }
    }

    /// API トークンを取得
    ///
    /// # Arguments
    /// * `api_host` - netrc の machine 名（例: "api.heroku.com"）
    pub fn token(&self, api_host: &str) -> Result<String> {
        if let Ok(token) = std::env::var("HEROKU_API_KEY") {
            let token = token.trim();
            if !token.is_empty() {
                tracing::debug!("Using token from HEROKU_API_KEY");
                return Ok(token.to_string());
            }
        }

        if !self.netrc_path.exists() {
            tracing::debug!("netrc not found at {:?}", self.netrc_path);
            return Err(ConfigError::CredentialsNotFound {
                host: api_host.to_string(),
            });
        }

        let content = std::fs::read_to_string(&self.netrc_path)?;
        match netrc_password(&content, api_host) {
            Some(token) => {
                tracing::debug!("Found credentials in netrc for {}", api_host);
                Ok(token)
            }
            None => Err(ConfigError::CredentialsNotFound {
                host: api_host.to_string(),
            }),
        }
    }
}

/// netrc から指定 machine の password を取り出す
fn netrc_password(content: &str, machine: &str) -> Option<String> {
    let mut tokens = content.split_whitespace();
    let mut in_machine = false;

    while let Some(token) = tokens.next() {
        match token {
            "machine" => in_machine = tokens.next() == Some(machine),
            "default" => in_machine = false,
            "password" => {
                let password = tokens.next()?;
                if in_machine {
                    return Some(password.to_string());
                }
            }
            _ => {}
        }
    }

    None
}
