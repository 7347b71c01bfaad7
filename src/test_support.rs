use crate::client::Transport;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// 登録済みのJSONを返すだけのテスト用トランスポート
///
/// パスとクエリの完全一致を優先し、無ければパスだけで探す。
#[derive(Default)]
pub(crate) struct StaticTransport {
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, path: &str, params: Option<&[(&str, &str)]>) -> Result<Vec<u8>> {
        let key = match params {
            None => path.to_string(),
            Some(params) => {
                let mut sorted = params.to_vec();
                sorted.sort_by_key(|(key, _)| *key);
                let query: Vec<String> = sorted
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value))
                    .collect();
                format!("{}?{}", path, query.join("&"))
            }
        };

        self.calls.lock().unwrap().push(key.clone());

        let body = self
            .responses
            .get(&key)
            .or_else(|| self.responses.get(path))
            .ok_or_else(|| Error::ApiError {
                status: 404,
                message: format!("No response registered for {}", key),
            })?;

        Ok(serde_json::to_vec(body)?)
    }
}
