// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由器在启动期与请求处理生命周期中可能产生的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析错误、路由注册错误、序列化错误以及配置错误。
//! - **语义映射**：每个变体都对应了特定的处理路径，启动期错误由引导程序终止进程，
//!   请求期错误由上层模块转化为对应的 HTTP 响应状态码。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志。

use std::fmt;

/// 路由器运行过程中发生的异常类型。
///
/// 该枚举作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 客户端使用了无法识别的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 请求行缺失或格式不完整。对应 `400 Bad Request`。
    MalformedRequest,
    /// 注册路由时绑定的控制器尚未注册。属于启动期的致命错误。
    UnknownController(String),
    /// 在非结构化文档格式下尝试序列化结构化的响应体。
    UnsupportedContentType(String),
    /// 结构化编码本身失败。对应 `500 Internal Server Error`。
    SerializeFailed(String),
    /// 配置文件无法打开或读取。
    ConfigUnreadable(String),
    /// 配置文件内容不是合法的 TOML，或字段类型不匹配。
    ConfigInvalid(String),
}

use Exception::*;

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
impl fmt::Display for Exception {
    /// 根据错误类型写入人类可读的描述文本。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            MalformedRequest => write!(f, "Malformed request line (400)"),
            UnknownController(name) => write!(f, "\"{}\" controller does not exist", name),
            UnsupportedContentType(content_type) => write!(
                f,
                "Structured bodies can't be serialized as \"{}\"",
                content_type
            ),
            SerializeFailed(reason) => write!(f, "Failed to serialize response body: {}", reason),
            ConfigUnreadable(reason) => write!(f, "Couldn't read config file: {}", reason),
            ConfigInvalid(reason) => write!(f, "Invalid config file: {}", reason),
        }
    }
}

impl std::error::Error for Exception {}
