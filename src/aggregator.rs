use crate::api::JiraApi;
use crate::changelog_parser::ChangelogParser;
use crate::error::{Error, Result};
use crate::extractor::FieldExtractor;
use crate::models::{Issue, SubTask};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// バグとして扱う課題タイプ（小文字）
pub const BUG_ISSUE_TYPES: &[&str] = &["bug", "functional bug", "production issue"];

/// 課題タイプの表示値がバグ系かどうか
pub fn is_bug(issue_type: &str) -> bool {
    let lowered = issue_type.to_lowercase();
    BUG_ISSUE_TYPES.contains(&lowered.as_str())
}

/// 課題取得のREST呼び出し回数
#[derive(Debug, Clone, Default)]
pub struct RestCallCounter(Arc<AtomicUsize>);

impl RestCallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1回分加算し、加算後の値を返す
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// 親課題のサブタスク一覧のID
pub fn sub_task_ids(parent: &Value) -> Result<Vec<String>> {
    let subtasks = parent
        .get("fields")
        .and_then(|fields| fields.get("subtasks"))
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidData("Missing subtasks in issue fields".to_string()))?;

    subtasks
        .iter()
        .map(|subtask| {
            subtask
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidData("Missing sub-task id".to_string()))
        })
        .collect()
}

/// 課題ごとにサブタスクと開発担当者を埋める
#[derive(Clone)]
pub struct SubTaskAggregator {
    api: JiraApi,
    extractor: FieldExtractor,
    counter: RestCallCounter,
}

impl SubTaskAggregator {
    pub fn new(api: JiraApi, counter: RestCallCounter) -> Self {
        Self {
            api,
            extractor: FieldExtractor::new(),
            counter,
        }
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn counter(&self) -> &RestCallCounter {
        &self.counter
    }

    async fn fetch(&self, id: &str, include_changelog: bool) -> Result<Value> {
        self.counter.increment();
        self.api.get_issue(id, include_changelog).await
    }

    /// 親課題を変更履歴付きで取り直し、サブタスクを順に取得する
    ///
    /// 親がバグ系なら変更履歴から開発担当者を求めて `assignee_name` に入れる。
    pub async fn aggregate(&self, mut issue: Issue) -> Result<Issue> {
        let issue_id = issue.id()?.to_string();
        let parent = self.fetch(&issue_id, true).await?;

        let ids = sub_task_ids(&parent)?;
        let mut sub_tasks = Vec::with_capacity(ids.len());
        for id in &ids {
            let sub_task_issue = self.fetch(id, false).await?;
            sub_tasks.push(self.sub_task_from(&sub_task_issue)?);
        }
        issue.sub_tasks = sub_tasks;

        let parent_type = self.extractor.extract(&parent, "issuetype")?;
        if is_bug(&parent_type) {
            let developer = ChangelogParser::developer_from_issue(&parent)?;
            if developer.is_empty() {
                warn!(issue = %issue_id, "No developer of record in changelog");
            }
            issue.assignee_name = Some(developer);
        }

        debug!(
            issue = %issue_id,
            sub_tasks = issue.sub_tasks.len(),
            issue_type = %parent_type,
            "Aggregated issue"
        );

        Ok(issue)
    }

    fn sub_task_from(&self, sub_task_issue: &Value) -> Result<SubTask> {
        Ok(SubTask {
            assignee_name: self.extractor.extract(sub_task_issue, "assignee")?,
            issue_type: self.extractor.extract(sub_task_issue, "issuetype")?,
            name: self.extractor.extract(sub_task_issue, "summary")?,
            total_hours: self.extractor.extract(sub_task_issue, "timetracking")?,
        })
    }
}
