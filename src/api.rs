use crate::client::Transport;
use crate::error::{Error, Result};
use crate::field_catalog::FieldCatalog;
use crate::models::{Field, Issue, SEARCH_PAGE_SIZE, SearchResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const FIELD_PATH: &str = "/rest/api/2/field";
pub const SEARCH_PATH: &str = "/rest/api/2/search";
pub const ISSUE_PATH: &str = "/rest/api/2/issue";

/// REST API 2 の読み取り系エンドポイント
#[derive(Clone)]
pub struct JiraApi {
    transport: Arc<dyn Transport>,
}

impl JiraApi {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn get_json<T>(&self, path: &str, params: Option<&[(&str, &str)]>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.transport.get(path, params).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// フィールド定義一覧を取得
    pub async fn get_fields(&self) -> Result<Vec<Field>> {
        self.get_json(FIELD_PATH, None).await
    }

    /// フィールド定義を取得し、名前からIDへの対応表を構築する
    pub async fn resolve_field_catalog(&self) -> Result<FieldCatalog> {
        let fields = self.get_fields().await?;
        let catalog = FieldCatalog::resolve(&fields);

        info!(
            definitions = fields.len(),
            custom_fields = catalog.len(),
            "Resolved field catalog"
        );

        Ok(catalog)
    }

    pub fn issue_path(id: &str, include_changelog: bool) -> String {
        let path = format!("{}/{}", ISSUE_PATH, urlencoding::encode(id));
        if include_changelog {
            format!("{}?expand=changelog", path)
        } else {
            path
        }
    }

    /// 課題を1件取得。`include_changelog` で変更履歴を含める
    pub async fn get_issue(&self, id: &str, include_changelog: bool) -> Result<Value> {
        let path = Self::issue_path(id, include_changelog);
        let issue: Value = self.get_json(&path, None).await?;

        if !issue.is_object() {
            return Err(Error::InvalidData(format!("Issue {} is not an object", id)));
        }

        Ok(issue)
    }

    /// JQLで検索し、結果を1ページ分まとめて返す
    ///
    /// 取得件数は [`SEARCH_PAGE_SIZE`] までで、それを超える分は切り捨てる。
    pub async fn search_issues(&self, jql: &str, fields: &[String]) -> Result<Vec<Issue>> {
        let joined = fields.join(",");
        let max_results = SEARCH_PAGE_SIZE.to_string();
        let params = [
            ("jql", jql),
            ("fields", joined.as_str()),
            ("maxResults", max_results.as_str()),
        ];

        let result: SearchResult = self.get_json(SEARCH_PATH, Some(&params[..])).await?;

        if result.is_truncated() {
            debug!(
                total = ?result.total,
                returned = result.issues.len(),
                "Search results truncated to a single page"
            );
        }

        Ok(result
            .issues
            .into_iter()
            .map(|data| Issue::new(data, fields.to_vec()))
            .collect())
    }

    /// 検索結果をレスポンス順にチャネルへ送る
    ///
    /// 送信した件数を返す。受信側が閉じていれば [`Error::ChannelClosed`]。
    pub async fn search(
        &self,
        jql: &str,
        fields: &[String],
        sink: &mpsc::Sender<Issue>,
    ) -> Result<usize> {
        let issues = self.search_issues(jql, fields).await?;
        let count = issues.len();

        for issue in issues {
            sink.send(issue).await.map_err(|_| Error::ChannelClosed)?;
        }

        debug!(count, "Search delivered issues");
        Ok(count)
    }
}
