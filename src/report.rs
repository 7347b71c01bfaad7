use crate::error::{Error, Result};
use crate::extractor::FieldExtractor;
use crate::models::Issue;
use crate::pipeline::{PipelineStats, ReportPipeline};
use serde_json::{Map, Value, json};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::debug;

/// 課題1件分の出力行（JSON）
pub fn report_line(issue: &Issue, extractor: &FieldExtractor) -> Result<String> {
    let fields: Map<String, Value> = extractor
        .extract_requested(issue)?
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    let line = json!({
        "key": issue.key(),
        "fields": fields,
        "subTasks": issue.sub_tasks,
        "assigneeName": issue.assignee_name,
    });

    Ok(serde_json::to_string(&line)?)
}

/// パイプラインを実行し、完成した課題を1行ずつ `out` に書き出す
///
/// 書き出し側が失敗すると受信チャネルが閉じ、パイプラインは
/// [`Error::ChannelClosed`] で止まる。その場合は書き出し側のエラーを返す。
pub async fn write_report<W: Write>(
    pipeline: &ReportPipeline,
    jql: &str,
    requested_fields: &[String],
    extractor: FieldExtractor,
    out: W,
) -> Result<PipelineStats> {
    let (tx, rx) = mpsc::channel(pipeline.config().channel_capacity.max(1));

    // rx は失敗時にここで破棄され、送信側へ伝わる
    let writer = async move {
        let mut rx = rx;
        let mut out = out;
        let mut written = 0usize;

        while let Some(issue) = rx.recv().await {
            let line = report_line(&issue, &extractor)?;
            writeln!(out, "{}", line)?;
            written += 1;
        }

        out.flush()?;
        Ok::<usize, Error>(written)
    };

    let (stats, written) = tokio::join!(pipeline.run(jql, requested_fields, tx), writer);

    let written = written?;
    debug!(written, "Report written");
    stats
}
