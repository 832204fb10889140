//! 响应体序列化。
//!
//! 标量直接转为文本；结构化值只在配置的格式是结构化文档（JSON）时编码，
//! 其它格式下视为配置错误。

use log::error;

use crate::{context::Body, exception::Exception, param::JSON_CONTENT_TYPE};

/// 判断内容类型是否为结构化文档格式。忽略 `;charset=...` 之类的参数。
pub fn is_structured_format(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE)
        || media_type.to_ascii_lowercase().ends_with("+json")
}

/// 将响应体转为线上文本。空响应体得到空字符串。
pub fn serialize(body: Option<&Body>, content_type: &str) -> Result<String, Exception> {
    let body = match body {
        Some(b) => b,
        None => return Ok(String::new()),
    };
    match body {
        Body::Str(s) => Ok(s.clone()),
        Body::Int(v) => Ok(v.to_string()),
        Body::Uint(v) => Ok(v.to_string()),
        Body::Float(v) => Ok(v.to_string()),
        Body::Bool(v) => Ok(v.to_string()),
        Body::Structured(value) => {
            if !is_structured_format(content_type) {
                error!("无法以{}格式序列化结构化响应体", content_type);
                return Err(Exception::UnsupportedContentType(content_type.to_string()));
            }
            serde_json::to_string(value).map_err(|e| Exception::SerializeFailed(e.to_string()))
        }
    }
}
