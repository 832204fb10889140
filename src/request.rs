// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、查询字符串、版本）。
//! 2. HTTP 标头（Headers）的提取，字段名大小写不敏感。
//! 3. 按 `Content-Length` 截取的请求体。

use std::collections::HashMap;

use bytes::Bytes;
use log::error;

use crate::{exception::Exception, param::*};

/// 头部与正文之间的空行
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// 表示一个完整的 HTTP 请求。
///
/// 路由只使用方法与路径；其余字段原样交给控制器，由控制器自行解释。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（不含查询字符串）
    path: String,
    /// 查询参数，重复的键以最后一次出现为准
    query: HashMap<String, String>,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 标头，键统一为小写
    headers: HashMap<String, String>,
    /// 请求体
    body: Bytes,
}

impl Request {
    /// 以编程方式构造请求，主要供测试与基准使用。
    ///
    /// `target` 可以携带查询字符串，例如 `/users?page=2`。
    pub fn new(method: HttpRequestMethod, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method,
            path,
            query,
            version: HttpVersion::V1_1,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// 附加请求体
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// 附加一个标头
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 按空行切分头部与正文，并验证头部是合法的 UTF-8。
    /// 2. 解析请求行：提取方法、路径、查询字符串和协议版本。
    /// 3. 迭代解析标头。
    /// 4. 依据 `Content-Length` 截取正文，缺省时取空行之后的全部字节。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 缓冲区末尾可能残留未写入的 0 字节
        let buffer = trim_trailing_zeros(buffer);

        let (head, rest) = match find_subslice(buffer, HEADER_TERMINATOR) {
            Some(index) => (&buffer[..index], &buffer[index + HEADER_TERMINATOR.len()..]),
            None => (buffer, &[][..]),
        };

        // 1. 头部必须是 UTF-8，正文保持原始字节
        let head = match std::str::from_utf8(head) {
            Ok(s) => s,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut request_lines = head.split(CRLF);

        // 2. 解析请求行 (e.g., "GET /users/1 HTTP/1.1")
        let first_line = request_lines.next().unwrap_or("");
        let first_line_parts: Vec<&str> = first_line.split(' ').collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, first_line);
            return Err(Exception::MalformedRequest);
        }

        let method = match HttpRequestMethod::parse(first_line_parts[0]) {
            Some(m) => m,
            None => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, first_line_parts[0]);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 路径中可能包含空格（虽然不规范），通过 join 尝试恢复
        let target = first_line_parts[1..first_line_parts.len() - 1].join(" ");
        let (path, query) = split_target(&target);

        // 3. 迭代各行解析 Headers
        let mut headers = HashMap::new();
        for line in request_lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_lowercase(), value.trim().to_string());
            }
        }

        // 4. 正文
        let body_len = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .map_or(rest.len(), |len| len.min(rest.len()));
        let body = Bytes::copy_from_slice(&rest[..body_len]);

        Ok(Self {
            method,
            path,
            query,
            version,
            headers,
            body,
        })
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取查询参数
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// 按名称获取标头，大小写不敏感
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        self.header("user-agent").unwrap_or("")
    }

    /// 获取请求体
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// 头部读完时返回整个请求应有的字节数（头部 + 空行 + `Content-Length`）。
///
/// 头部尚未读完时返回 `None`，传输层据此决定是否继续读取。
pub fn expected_length(buffer: &[u8]) -> Option<usize> {
    let index = find_subslice(buffer, HEADER_TERMINATOR)?;
    let head = String::from_utf8_lossy(&buffer[..index]);
    let content_length = head
        .split(CRLF)
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    Some(index + HEADER_TERMINATOR.len() + content_length)
}

/// 拆出路径与查询字符串，两者都做百分号解码
fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        Some((path, query)) => (percent_decode(path), parse_query(query)),
        None => (percent_decode(target), HashMap::new()),
    }
}

/// 查询参数中的 `+` 表示空格
fn parse_query(query: &str) -> HashMap<String, String> {
    let decode = |s: &str| percent_decode(&s.replace('+', " "));
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

/// 非法的转义序列原样保留，解码结果不是 UTF-8 时做有损替换
fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}

fn trim_trailing_zeros(buffer: &[u8]) -> &[u8] {
    let end = buffer.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &buffer[..end]
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
