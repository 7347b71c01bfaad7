use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 値が取得できない場合の表示文字列
pub const NOT_AVAILABLE: &str = "N/A";

/// レポート出力向けの課題レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// サービスから返された生の課題JSON
    pub data: Value,
    /// 検索時に要求したフィールド（抽出時に参照する）
    pub fields: Vec<String>,
    #[serde(rename = "subTasks")]
    pub sub_tasks: Vec<SubTask>,
    /// バグと判定された場合のみ開発担当者で上書きされる
    #[serde(rename = "assigneeName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
}

impl Issue {
    pub fn new(data: Value, fields: Vec<String>) -> Self {
        Self {
            data,
            fields,
            sub_tasks: Vec::new(),
            assignee_name: None,
        }
    }

    /// 課題ID。取得できなければ不正なレスポンスとして扱う
    pub fn id(&self) -> Result<&str> {
        self.data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidData("Missing issue id".to_string()))
    }

    pub fn key(&self) -> Option<&str> {
        self.data.get("key").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub name: String,
    #[serde(rename = "assigneeName")]
    pub assignee_name: String,
    #[serde(rename = "totalHours")]
    pub total_hours: String,
}

impl Default for SubTask {
    fn default() -> Self {
        Self {
            issue_type: NOT_AVAILABLE.to_string(),
            name: NOT_AVAILABLE.to_string(),
            assignee_name: NOT_AVAILABLE.to_string(),
            total_hours: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changelog {
    pub histories: Vec<History>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<HistoryAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAuthor {
    #[serde(rename = "accountId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// 無効化されたアカウントなどでは返されないことがある
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "fromString")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_string: Option<String>,
    #[serde(rename = "toString")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_string: Option<String>,
}
