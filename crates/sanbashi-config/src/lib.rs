pub mod auth;
pub mod error;

pub use auth::ApiAuth;
pub use error::*;

/// HEROKU_HOST が未設定の場合のホスト
pub const DEFAULT_HOST: &str = "heroku.com";

/// 環境変数から決まる接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// 例: heroku.com
    pub host: String,
    /// 例: https://api.heroku.com
    pub api_url: String,
}

impl Settings {
    /// 環境変数から設定を読み込む
    ///
    /// - HEROKU_HOST: ホスト名（デフォルト heroku.com）
    /// - HEROKU_API_URL: API の URL（デフォルト https://api.{host}）
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HEROKU_HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        if host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidHost(host));
        }

        let api_url = std::env::var("HEROKU_API_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://api.{}", host));

        tracing::debug!(host = %host, api_url = %api_url, "Loaded settings");

        Ok(Self { host, api_url })
    }

    /// コンテナレジストリ: registry.{host}
    pub fn registry(&self) -> String {
        format!("registry.{}", self.host)
    }

    /// イメージ名の共通部分: registry.{host}/{app}
    pub fn resource_root(&self, app: &str) -> String {
        format!("{}/{}", self.registry(), app)
    }

    /// API の URL からホスト部分を取り出す（netrc 検索用）
    pub fn api_host(&self) -> &str {
        let without_scheme = self
            .api_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.api_url);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_settings_default() {
        temp_env::with_vars_unset(["HEROKU_HOST", "HEROKU_API_URL"], || {
            let settings = Settings::from_env().unwrap();

            assert_eq!(settings.host, "heroku.com");
            assert_eq!(settings.api_url, "https://api.heroku.com");
            assert_eq!(settings.registry(), "registry.heroku.com");
            assert_eq!(
                settings.resource_root("myapp"),
                "registry.heroku.com/myapp"
            );
            assert_eq!(settings.api_host(), "api.heroku.com");
        });
    }

    #[test]
    #[serial]
    fn test_settings_host_override() {
        temp_env::with_vars(
            [
                ("HEROKU_HOST", Some("staging.example.com")),
                ("HEROKU_API_URL", None),
            ],
            || {
                let settings = Settings::from_env().unwrap();

                assert_eq!(settings.registry(), "registry.staging.example.com");
                assert_eq!(settings.api_url, "https://api.staging.example.com");
            },
        );
    }

    #[test]
    #[serial]
    fn test_settings_api_url_override() {
        temp_env::with_vars(
            [
                ("HEROKU_HOST", None),
                ("HEROKU_API_URL", Some("http://localhost:5000/")),
            ],
            || {
                let settings = Settings::from_env().unwrap();

                assert_eq!(settings.api_url, "http://localhost:5000");
                assert_eq!(settings.api_host(), "localhost:5000");
                assert_eq!(settings.registry(), "registry.heroku.com");
            },
        );
    }

    #[test]
    #[serial]
    fn test_settings_empty_host_falls_back() {
        temp_env::with_vars([("HEROKU_HOST", Some("  ")), ("HEROKU_API_URL", None)], || {
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.host, DEFAULT_HOST);
        });
    }

    #[test]
    #[serial]
    fn test_settings_invalid_host() {
        temp_env::with_var("HEROKU_HOST", Some("https://heroku.com"), || {
            let result = Settings::from_env();
            assert!(matches!(result, Err(ConfigError::InvalidHost(_))));
        });
    }
}
