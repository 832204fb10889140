//! 每个请求独占的执行上下文。
//!
//! `Context` 在匹配成功后由分发器新建，交给控制器动作以可变引用修改，
//! 请求结束时随之销毁，从不在请求之间共享。

use std::collections::HashMap;

use serde::Serialize;

use crate::{exception::Exception, request::Request};

/// 控制器设置的响应体。
///
/// 标量按文本直接输出，`Structured` 走结构化编码（见 `serializer`）。
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Structured(serde_json::Value),
}

impl Body {
    /// 将任意可序列化的值转为结构化响应体
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, Exception> {
        serde_json::to_value(value)
            .map(Body::Structured)
            .map_err(|e| Exception::SerializeFailed(e.to_string()))
    }
}

impl From<String> for Body {
    fn from(v: String) -> Self {
        Body::Str(v)
    }
}

impl From<&str> for Body {
    fn from(v: &str) -> Self {
        Body::Str(v.to_string())
    }
}

impl From<i64> for Body {
    fn from(v: i64) -> Self {
        Body::Int(v)
    }
}

impl From<i32> for Body {
    fn from(v: i32) -> Self {
        Body::Int(v as i64)
    }
}

impl From<u64> for Body {
    fn from(v: u64) -> Self {
        Body::Uint(v)
    }
}

impl From<f64> for Body {
    fn from(v: f64) -> Self {
        Body::Float(v)
    }
}

impl From<bool> for Body {
    fn from(v: bool) -> Self {
        Body::Bool(v)
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Body::Structured(v)
    }
}

/// 控制器动作的输出：状态码与可选的响应体。
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Body>,
}

impl Reply {
    pub fn new() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// 以结构化文档设置响应体；编码失败时置为 500 并返回错误
    pub fn set_structured<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, Exception> {
        match Body::structured(value) {
            Ok(body) => {
                self.body = Some(body);
                Ok(self)
            }
            Err(e) => {
                self.status = 500;
                Err(e)
            }
        }
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new()
    }
}

/// 请求上下文
#[derive(Debug, Clone)]
pub struct Context {
    /// 从路由模式中提取的命名参数
    pub params: HashMap<String, String>,
    /// 原始请求
    pub request: Request,
    /// 由控制器动作修改的响应
    pub response: Reply,
}

impl Context {
    pub fn new(params: HashMap<String, String>, request: Request) -> Self {
        Self {
            params,
            request,
            response: Reply::new(),
        }
    }

    /// 按名称读取路径参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::HttpRequestMethod;
    use serde_derive::Serialize;

    #[derive(Serialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_reply_defaults() {
        let reply = Reply::new();
        assert_eq!(reply.status, 200);
        assert!(reply.body.is_none());
    }

    #[test]
    fn test_body_conversions() {
        assert_eq!(Body::from("abc"), Body::Str("abc".to_string()));
        assert_eq!(Body::from(7i32), Body::Int(7));
        assert_eq!(Body::from(7u64), Body::Uint(7));
        assert_eq!(Body::from(false), Body::Bool(false));
    }

    #[test]
    fn test_set_structured() {
        let mut reply = Reply::new();
        reply
            .set_structured(&Item {
                name: "John".to_string(),
            })
            .unwrap();
        assert_eq!(
            reply.body,
            Some(Body::Structured(serde_json::json!({ "name": "John" })))
        );
        assert_eq!(reply.status, 200);
    }

    #[derive(Serialize)]
    struct Ordered {
        zeta: u8,
        alpha: u8,
    }

    #[test]
    fn test_structured_keeps_field_order() {
        let body = Body::structured(&Ordered { zeta: 1, alpha: 2 }).unwrap();
        let text = crate::serializer::serialize(Some(&body), crate::param::JSON_CONTENT_TYPE).unwrap();
        assert_eq!(text, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn test_context_is_fresh() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        let ctx = Context::new(params, Request::new(HttpRequestMethod::Get, "/users/42"));

        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.response, Reply::new());
    }
}
