use crate::aggregator::{RestCallCounter, SubTaskAggregator};
use crate::api::JiraApi;
use crate::error::{Error, Result};
use crate::extractor::{DateFailurePolicy, FieldExtractor};
use crate::models::Issue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::info;

/// レポート処理の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 同時に処理する課題数
    pub worker_count: usize,
    /// 検索結果チャネルの容量
    pub channel_capacity: usize,
    /// 作成日時が解析できない場合の扱い
    pub date_failure: DateFailurePolicy,
}

impl PipelineConfig {
    /// デフォルト設定で新しいPipelineConfigを作成
    pub fn new() -> Self {
        Self {
            worker_count: 8,
            channel_capacity: 1000,
            date_failure: DateFailurePolicy::Fatal,
        }
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn date_failure(mut self, policy: DateFailurePolicy) -> Self {
        self.date_failure = policy;
        self
    }

    pub fn extractor(&self) -> FieldExtractor {
        FieldExtractor::new().with_date_failure(self.date_failure)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 1回の実行の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// 検索でヒットした課題数
    pub issues_found: usize,
    /// 集約して出力に渡した課題数
    pub issues_processed: usize,
    /// 課題・サブタスク取得のREST呼び出し数
    pub total_rest_calls: usize,
}

/// フィールド解決 → 検索 → 課題ごとの集約 を行うパイプライン
pub struct ReportPipeline {
    api: JiraApi,
    config: PipelineConfig,
}

impl ReportPipeline {
    pub fn new(api: JiraApi, config: PipelineConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 検索結果を集約し、完成した課題を `output` へ送る
    ///
    /// 同時に集約する課題は `worker_count` 件まで。出力順は完了順で、
    /// 検索結果の順序とは一致しない。どこかで1件でも失敗すると残りの
    /// 処理を中断してそのエラーを返す。
    pub async fn run(
        &self,
        jql: &str,
        requested_fields: &[String],
        output: mpsc::Sender<Issue>,
    ) -> Result<PipelineStats> {
        let catalog = self.api.resolve_field_catalog().await?;
        let field_ids = catalog.field_ids_for(requested_fields);

        info!(
            jql,
            fields = ?field_ids,
            workers = self.config.worker_count,
            "Starting report"
        );

        let counter = RestCallCounter::new();
        let aggregator = SubTaskAggregator::new(self.api.clone(), counter.clone())
            .with_extractor(self.config.extractor());

        let (issue_tx, mut issue_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let producer = {
            let api = self.api.clone();
            let jql = jql.to_string();
            tokio::spawn(async move { api.search(&jql, &field_ids, &issue_tx).await })
        };

        let semaphore = Arc::new(Semaphore::new(self.config.worker_count.max(1)));
        let mut workers: JoinSet<Result<()>> = JoinSet::new();
        let mut issues_processed = 0;

        while let Some(issue) = issue_rx.recv().await {
            while let Some(joined) = workers.try_join_next() {
                worker_result(joined)?;
                issues_processed += 1;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::TaskFailed(e.to_string()))?;
            let aggregator = aggregator.clone();
            let output = output.clone();

            workers.spawn(async move {
                let _permit = permit;
                let issue = aggregator.aggregate(issue).await?;
                output.send(issue).await.map_err(|_| Error::ChannelClosed)
            });
        }

        let issues_found = producer
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))??;

        while let Some(joined) = workers.join_next().await {
            worker_result(joined)?;
            issues_processed += 1;
        }

        let stats = PipelineStats {
            issues_found,
            issues_processed,
            total_rest_calls: counter.get(),
        };

        info!(
            issues = stats.issues_processed,
            rest_calls = stats.total_rest_calls,
            "Report finished"
        );

        Ok(stats)
    }

    /// すべての結果を集めて課題キー順に並べて返す
    pub async fn collect(
        &self,
        jql: &str,
        requested_fields: &[String],
    ) -> Result<(Vec<Issue>, PipelineStats)> {
        let (tx, mut rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let drain = async {
            let mut issues = Vec::new();
            while let Some(issue) = rx.recv().await {
                issues.push(issue);
            }
            issues
        };

        let (stats, mut issues) = tokio::join!(self.run(jql, requested_fields, tx), drain);
        let stats = stats?;

        issues.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok((issues, stats))
    }
}

fn worker_result(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(|e| Error::TaskFailed(e.to_string()))?
}
