use crate::error::{Error, Result};
use crate::models::{Issue, NOT_AVAILABLE};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CREATED_FIELD: &str = "created";
/// 例: `2023-03-05T10:15:30.000+0000`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
/// 例: `05/Mar/23`
const DISPLAY_DATE_FORMAT: &str = "%d/%b/%y";

/// オブジェクト値のフィールドで表示に使うキー
const NESTED_KEYS: &[(&str, &str)] = &[
    ("assignee", "displayName"),
    ("reporter", "displayName"),
    ("issuetype", "name"),
    ("status", "name"),
    ("priority", "name"),
    ("timetracking", "originalEstimate"),
];
const DEFAULT_NESTED_KEY: &str = "value";

/// フィールド名に対応するネストしたキーを返す
pub fn nested_key_for(field: &str) -> &'static str {
    NESTED_KEYS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(field))
        .map(|(_, key)| *key)
        .unwrap_or(DEFAULT_NESTED_KEY)
}

/// 作成日時が解析できなかったときの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFailurePolicy {
    /// エラーとして処理全体を止める
    #[default]
    Fatal,
    /// `"N/A"` として扱う
    NotAvailable,
}

/// 課題JSONからフィールドの表示文字列を取り出す
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor {
    date_failure: DateFailurePolicy,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_failure(mut self, policy: DateFailurePolicy) -> Self {
        self.date_failure = policy;
        self
    }

    pub fn date_failure(&self) -> DateFailurePolicy {
        self.date_failure
    }

    /// `fields` 配下の値を表示文字列に変換する
    ///
    /// `fields` やフィールド自体が無ければ `"N/A"`。結果からカンマは取り除く。
    pub fn extract(&self, issue: &Value, field: &str) -> Result<String> {
        let Some(value) = issue
            .get("fields")
            .and_then(Value::as_object)
            .and_then(|fields| fields.get(field))
        else {
            return Ok(NOT_AVAILABLE.to_string());
        };

        if field.eq_ignore_ascii_case(CREATED_FIELD) {
            return self.format_created(field, value);
        }

        let text = display_value(value, field)?;
        Ok(text.replace(',', ""))
    }

    /// 課題が要求したフィールドをすべて取り出す
    pub fn extract_requested(&self, issue: &Issue) -> Result<Vec<(String, String)>> {
        issue
            .fields
            .iter()
            .map(|field| Ok((field.clone(), self.extract(&issue.data, field)?)))
            .collect()
    }

    fn format_created(&self, field: &str, value: &Value) -> Result<String> {
        let parsed = value
            .as_str()
            .and_then(|raw| DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok());

        match (parsed, self.date_failure) {
            (Some(timestamp), _) => Ok(timestamp.format(DISPLAY_DATE_FORMAT).to_string()),
            (None, DateFailurePolicy::NotAvailable) => Ok(NOT_AVAILABLE.to_string()),
            (None, DateFailurePolicy::Fatal) => Err(Error::InvalidTimestamp {
                field: field.to_string(),
                value: value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
            }),
        }
    }
}

/// 既定の設定で値を取り出す
pub fn extract_field(issue: &Value, field: &str) -> Result<String> {
    FieldExtractor::new().extract(issue, field)
}

fn display_value(value: &Value, field: &str) -> Result<String> {
    match value {
        // 選択リスト系: 先頭要素の value
        Value::Array(items) => {
            let first = items
                .first()
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    Error::InvalidData(format!(
                        "Field '{}' is not an array of objects",
                        field
                    ))
                })?;
            let selected = first.get(DEFAULT_NESTED_KEY).ok_or_else(|| {
                Error::InvalidData(format!("Field '{}' option has no value", field))
            })?;
            scalar_text(selected, field)
        }
        Value::Object(map) => match map.get(nested_key_for(field)) {
            Some(nested) => scalar_text(nested, field),
            None => Ok(String::new()),
        },
        other => scalar_text(other, field),
    }
}

fn scalar_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::InvalidData(format!(
            "Field '{}' has a non-scalar value",
            field
        ))),
    }
}
