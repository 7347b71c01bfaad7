use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid timestamp in field '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Output channel closed")]
    ChannelClosed,

    #[error("Worker task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// 通信・認証レベルの失敗かどうか
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::RequestFailed(_) | Error::ApiError { .. })
    }

    /// レスポンスの形が想定と異なるかどうか
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            Error::JsonParsing(_) | Error::InvalidData(_) | Error::InvalidTimestamp { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let api = Error::ApiError {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(api.is_transport());
        assert!(!api.is_malformed_response());

        let shape = Error::InvalidData("subtasks is not an array".to_string());
        assert!(shape.is_malformed_response());
        assert!(!shape.is_transport());

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(Error::from(json).is_malformed_response());

        assert!(!Error::ChannelClosed.is_transport());
        assert!(!Error::ChannelClosed.is_malformed_response());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidTimestamp {
            field: "created".to_string(),
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid timestamp in field 'created': yesterday"
        );
    }
}
