use crate::error::{Error, Result};
use crate::models::Changelog;
use serde::Deserialize;
use serde_json::Value;

/// 開発着手を表すステータス遷移先
pub const IN_DEVELOPMENT_STATUS: &str = "In Development";

/// 課題のchangelogを解析するパーサー
pub struct ChangelogParser;

impl ChangelogParser {
    /// `?expand=changelog` 付きで取得した課題JSONからchangelogを取り出す
    pub fn parse(issue: &Value) -> Result<Changelog> {
        let changelog = issue
            .get("changelog")
            .ok_or_else(|| Error::InvalidData("No changelog in issue".to_string()))?;

        Ok(Changelog::deserialize(changelog)?)
    }

    /// 開発担当者（最初に "In Development" へ遷移させた人）を探す
    ///
    /// 履歴を先頭から走査し、最初に見つかった遷移の作成者名を返す。
    /// 作成者名が空の遷移は読み飛ばす。見つからなければ空文字列。
    pub fn developer_of_record(changelog: &Changelog) -> String {
        changelog
            .histories
            .iter()
            .filter(|history| {
                history
                    .items
                    .iter()
                    .any(|item| item.to_string.as_deref() == Some(IN_DEVELOPMENT_STATUS))
            })
            .filter_map(|history| history.author.as_ref())
            .map(|author| author.display_name.as_str())
            .find(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// 課題JSONから直接開発担当者を求める
    pub fn developer_from_issue(issue: &Value) -> Result<String> {
        let changelog = Self::parse(issue)?;
        Ok(Self::developer_of_record(&changelog))
    }
}
