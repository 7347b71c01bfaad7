use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    /// ユーザー名とAPIトークンからBasic認証値を組み立てる
    Basic { username: String, api_token: String },
    /// エンコード済みのBasic認証トークンをそのまま使う
    Token { token: String },
}

impl Auth {
    /// `Authorization` ヘッダーの値
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic { username, api_token } => {
                let auth_value = format!("{}:{}", username, api_token);
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(auth_value.as_bytes());
                format!("Basic {}", encoded)
            }
            Auth::Token { token } => format!("Basic {}", token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url = base_url.into();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を組み立てる
    ///
    /// `JIRA_AUTH_TOKEN` があればそれを優先し、なければ
    /// `JIRA_USER` と `JIRA_API_TOKEN` の組を使う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("JIRA_URL").ok_or_else(|| {
            Error::ConfigurationMissing("JIRA_URL not found in environment".to_string())
        })?;

        let auth = match lookup("JIRA_AUTH_TOKEN") {
            Some(token) => Auth::Token { token },
            None => {
                let username = lookup("JIRA_USER").ok_or_else(|| {
                    Error::ConfigurationMissing(
                        "JIRA_AUTH_TOKEN or JIRA_USER not found in environment".to_string(),
                    )
                })?;
                let api_token = lookup("JIRA_API_TOKEN").ok_or_else(|| {
                    Error::ConfigurationMissing(
                        "JIRA_API_TOKEN not found in environment".to_string(),
                    )
                })?;
                Auth::Basic { username, api_token }
            }
        };

        Self::new(base_url, auth)
    }
}

/// リモートサービスへのGET呼び出しの抽象
///
/// 1回の呼び出しが1回のHTTP GETに対応する。リトライはしない。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: Option<&[(&str, &str)]>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    pub(crate) client: Client,
    pub(crate) config: Arc<JiraConfig>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // 認証ヘッダーを追加
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&config.auth.header_value())
                .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// リクエストURLを組み立てる
    ///
    /// パラメータがなければベースURLとパスを連結するだけ。パラメータが
    /// あればURLとして解析し、キー順にフォームエンコードしたクエリを付ける。
    pub fn build_url(&self, path: &str, params: Option<&[(&str, &str)]>) -> Result<String> {
        let Some(params) = params else {
            return Ok(format!("{}{}", self.config.base_url, path));
        };

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);

        let mut sorted = params.to_vec();
        sorted.sort_by_key(|(key, _)| *key);
        url.query_pairs_mut().clear().extend_pairs(sorted);

        Ok(url.to_string())
    }
}

#[async_trait]
impl Transport for JiraClient {
    async fn get(&self, path: &str, params: Option<&[(&str, &str)]>) -> Result<Vec<u8>> {
        let url = self.build_url(path, params)?;
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::ApiError { status, message });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
