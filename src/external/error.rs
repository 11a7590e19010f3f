// 远程目录接口的错误类型
//
// 所有请求失败都归为三类：传输失败、非 2xx 状态码、响应体无法解析

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("HTTP 错误: 状态码 {0}")]
    Http(u16),

    #[error("响应解析失败: {0}")]
    Decode(String),
}

// 实现从 reqwest::Error 到 FetchError 的转换
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if err.is_status() {
            match err.status() {
                Some(status) => FetchError::Http(status.as_u16()),
                None => FetchError::Network(err.to_string()),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
