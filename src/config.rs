use crate::client::JiraConfig;
use crate::error::{Error, Result};
use crate::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// 1回のレポート実行に必要な設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 接続先と認証情報
    pub jira: JiraConfig,
    /// 検索条件
    pub jql: String,
    /// 出力するフィールド名（表示名またはID）
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ReportConfig {
    pub fn new(jira: JiraConfig, jql: impl Into<String>) -> Self {
        Self {
            jira,
            jql: jql.into(),
            fields: Vec::new(),
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `JIRA_JQL`、`JIRA_FIELDS`（カンマ区切り）、`JIRA_WORKERS` を読む
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jira = JiraConfig::from_lookup(&lookup)?;
        let jql = lookup("JIRA_JQL").ok_or_else(|| {
            Error::ConfigurationMissing("JIRA_JQL not found in environment".to_string())
        })?;

        let fields = lookup("JIRA_FIELDS")
            .map(|raw| split_fields(&raw))
            .unwrap_or_default();

        let mut pipeline = PipelineConfig::default();
        if let Some(raw) = lookup("JIRA_WORKERS") {
            let workers = raw.trim().parse::<usize>().map_err(|_| {
                Error::InvalidConfiguration(format!("JIRA_WORKERS is not a number: {}", raw))
            })?;
            pipeline = pipeline.worker_count(workers);
        }

        let config = Self::new(jira, jql).fields(fields).pipeline(pipeline);
        config.validate()?;
        Ok(config)
    }

    /// JSONファイルから読み込む
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            Error::InvalidConfiguration(format!(
                "Failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// JSONファイルに書き込む
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).await?;
        }

        let json_data = serde_json::to_string_pretty(self)?;
        let mut file = fs::File::create(path.as_ref()).await?;
        file.write_all(json_data.as_bytes()).await?;
        file.sync_all().await?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // URLの妥当性はJiraConfig::newで確認する
        JiraConfig::new(self.jira.base_url.clone(), self.jira.auth.clone())?;

        if self.jql.trim().is_empty() {
            return Err(Error::InvalidConfiguration("JQL is empty".to_string()));
        }
        if self.pipeline.worker_count == 0 {
            return Err(Error::InvalidConfiguration(
                "worker_count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// カンマ区切りのフィールド指定を分解する
pub fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Auth;
    use crate::extractor::DateFailurePolicy;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn jira_config() -> JiraConfig {
        JiraConfig::new(
            "https://example.atlassian.net",
            Auth::Token {
                token: "abc123".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(
            split_fields("summary, Story Points,,created "),
            vec!["summary", "Story Points", "created"]
        );
        assert!(split_fields("").is_empty());
    }

    #[test]
    fn test_from_lookup() {
        let lookup = lookup_from(&[
            ("JIRA_URL", "https://example.atlassian.net"),
            ("JIRA_AUTH_TOKEN", "abc123"),
            ("JIRA_JQL", "project = TEST"),
            ("JIRA_FIELDS", "summary,created"),
            ("JIRA_WORKERS", "4"),
        ]);

        let config = ReportConfig::from_lookup(lookup).unwrap();

        assert_eq!(config.jira, jira_config());
        assert_eq!(config.jql, "project = TEST");
        assert_eq!(config.fields, vec!["summary", "created"]);
        assert_eq!(config.pipeline.worker_count, 4);
    }

    #[test]
    fn test_from_lookup_missing_jql() {
        let lookup = lookup_from(&[
            ("JIRA_URL", "https://example.atlassian.net"),
            ("JIRA_AUTH_TOKEN", "abc123"),
        ]);

        match ReportConfig::from_lookup(lookup).unwrap_err() {
            Error::ConfigurationMissing(msg) => assert!(msg.contains("JIRA_JQL")),
            other => panic!("Expected ConfigurationMissing error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_invalid_workers() {
        let lookup = lookup_from(&[
            ("JIRA_URL", "https://example.atlassian.net"),
            ("JIRA_AUTH_TOKEN", "abc123"),
            ("JIRA_JQL", "project = TEST"),
            ("JIRA_WORKERS", "many"),
        ]);

        assert!(matches!(
            ReportConfig::from_lookup(lookup),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = ReportConfig::new(jira_config(), "project = TEST")
            .pipeline(PipelineConfig::new().worker_count(0));

        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        // Given: 一時ディレクトリに設定を保存
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("report.json");
        let config = ReportConfig::new(jira_config(), "project = TEST")
            .fields(vec!["summary".to_string()])
            .pipeline(PipelineConfig::new().date_failure(DateFailurePolicy::NotAvailable));

        // When
        config.save_to_file(&path).await.unwrap();
        let loaded = ReportConfig::load_from_file(&path).await.unwrap();

        // Then
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_minimal_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        tokio::fs::write(
            &path,
            r#"{
                "jira": {
                    "base_url": "https://example.atlassian.net",
                    "auth": { "type": "basic", "username": "me@example.com", "api_token": "t" }
                },
                "jql": "project = TEST"
            }"#,
        )
        .await
        .unwrap();

        let config = ReportConfig::load_from_file(&path).await.unwrap();

        assert!(config.fields.is_empty());
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(matches!(config.jira.auth, Auth::Basic { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(matches!(
            ReportConfig::load_from_file(&path).await,
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = ReportConfig::load_from_file(temp_dir.path().join("absent.json")).await;

        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
