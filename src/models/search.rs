use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 1回の検索で取得する最大件数。これを超える結果は切り捨てられる。
pub const SEARCH_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "startAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,

    #[serde(rename = "maxResults")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    /// 課題は形が一定しないため生のJSONのまま保持する
    pub issues: Vec<Value>,
}

impl SearchResult {
    /// サービス側の総件数が取得件数を上回っているか
    pub fn is_truncated(&self) -> bool {
        self.total
            .map(|total| total as usize > self.issues.len())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_deserialization() {
        let json_data = json!({
            "startAt": 0,
            "maxResults": 1000,
            "total": 1,
            "issues": [
                {
                    "id": "10000",
                    "key": "TEST-1",
                    "fields": {
                        "summary": "Test Issue",
                        "customfield_10010": [{ "value": "Option A" }]
                    }
                }
            ]
        });

        let result: SearchResult = serde_json::from_value(json_data).unwrap();

        assert_eq!(result.start_at, Some(0));
        assert_eq!(result.max_results, Some(1000));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0]["key"], "TEST-1");
        assert!(!result.is_truncated());
    }

    #[test]
    fn test_search_result_truncated() {
        let result: SearchResult = serde_json::from_value(json!({
            "total": 1500,
            "issues": [{ "id": "1" }, { "id": "2" }]
        }))
        .unwrap();

        assert!(result.is_truncated());
    }

    #[test]
    fn test_search_result_without_issues_is_rejected() {
        let result = serde_json::from_value::<SearchResult>(json!({ "total": 0 }));

        assert!(result.is_err());
    }
}
