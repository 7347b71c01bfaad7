//! jira-report CLI
//!
//! レポートを1回実行し、課題を1件1行のJSONとして標準出力に書き出す。

use anyhow::{Context, Result};
use clap::Parser;
use jira_report::config::split_fields;
use jira_report::{DateFailurePolicy, JiraApi, JiraClient, ReportConfig, ReportPipeline, write_report};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "jira-report")]
#[command(about = "Fetch issues with their sub-tasks and print them as JSON lines", long_about = None)]
struct Args {
    /// 設定ファイル（JSON）。省略時は JIRA_* 環境変数から読む
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JQL。設定の値を上書きする
    #[arg(short, long)]
    jql: Option<String>,

    /// 出力するフィールド名（カンマ区切り）
    #[arg(short, long)]
    fields: Option<String>,

    /// 同時に集約する課題数
    #[arg(short, long)]
    workers: Option<usize>,

    /// 作成日時が解析できない場合に失敗せず N/A を出力する
    #[arg(long)]
    lenient_dates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;

    let client = JiraClient::new(config.jira.clone()).context("Failed to create HTTP client")?;
    let pipeline = ReportPipeline::new(JiraApi::new(client), config.pipeline.clone());

    let stats = write_report(
        &pipeline,
        &config.jql,
        &config.fields,
        config.pipeline.extractor(),
        std::io::stdout(),
    )
    .await
    .context("Report failed")?;

    info!(
        issues_found = stats.issues_found,
        issues_processed = stats.issues_processed,
        total_rest_calls = stats.total_rest_calls,
        "Done"
    );

    Ok(())
}

async fn load_config(args: &Args) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::load_from_file(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ReportConfig::from_env().context("Failed to read configuration from environment")?,
    };

    if let Some(jql) = &args.jql {
        config.jql = jql.clone();
    }
    if let Some(fields) = &args.fields {
        config.fields = split_fields(fields);
    }
    if let Some(workers) = args.workers {
        config.pipeline.worker_count = workers;
    }
    if args.lenient_dates {
        config.pipeline.date_failure = DateFailurePolicy::NotAvailable;
    }

    config.validate()?;
    Ok(config)
}
