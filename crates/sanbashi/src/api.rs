//! プラットフォーム API クライアント
//!
//! プロセスタイプの formation からイメージの割り当てを外すために使う。

use anyhow::Context;

/// docker-releases 機能を有効にする Accept ヘッダー
const ACCEPT: &str = "application/vnd.heroku+json; version=3.docker-releases";

pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn formation_url(&self, app: &str, process_type: &str) -> String {
        format!("{}/apps/{}/formation/{}", self.base_url, app, process_type)
    }

    fn remove_body() -> serde_json::Value {
        serde_json::json!({ "docker_image": null })
    }

    /// プロセスタイプのイメージ割り当てを外す
    pub async fn remove_process_type(&self, app: &str, process_type: &str) -> anyhow::Result<()> {
        let url = self.formation_url(app, process_type);
        tracing::debug!(url = %url, "PATCH formation");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(
                reqwest::header::USER_AGENT,
                concat!("sanbashi/", env!("CARGO_PKG_VERSION")),
            )
            .json(&Self::remove_body())
            .send()
            .await
            .with_context(|| format!("API に接続できませんでした: {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{}: {}", status, body.trim()));
        }

        Ok(())
    }
}
