use crate::{param::*, util::format_date};

use bytes::Bytes;
use chrono::prelude::*;
use log::warn;

/// 写回传输层的 HTTP 响应报文
#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: DateTime<Utc>,
    server_name: String,
    content: Option<Bytes>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            content: None,
        }
    }

    /// 由控制器给出的状态码与已序列化的响应体构建报文
    pub fn from_reply(status: u16, body: String, content_type: &str) -> Self {
        let mut response = Self::new();
        let bytes = Bytes::from(body);
        response.content_length = bytes.len() as u64;
        response.content = match bytes.is_empty() {
            true => None,
            false => Some(bytes),
        };
        response.content_type = Some(content_type.to_string());
        response.set_code(status).set_date().to_owned()
    }

    /// 只带状态码、正文为空的报文
    pub fn from_status_code(code: u16, content_type: &str) -> Self {
        let mut response = Self::new();
        response.content_type = Some(content_type.to_string());
        response.set_code(code).set_date().to_owned()
    }

    pub fn response_404(content_type: &str) -> Self {
        Self::from_status_code(404, content_type)
    }

    pub fn response_500(content_type: &str) -> Self {
        Self::from_status_code(500, content_type)
    }

    pub fn response_400(content_type: &str) -> Self {
        Self::from_status_code(400, content_type)
    }

    pub fn response_408(content_type: &str) -> Self {
        Self::from_status_code(408, content_type)
    }

    pub fn response_413(content_type: &str) -> Self {
        Self::from_status_code(413, content_type)
    }

    /// HEAD 请求：保留 `Content-Length`，丢弃正文
    pub fn head_only(&mut self) -> &mut Self {
        self.content = None;
        self
    }

    fn set_date(&mut self) -> &mut Self {
        self.date = Utc::now();
        self
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                // 控制器可以自由设置状态码，未收录的只是没有标准短语
                warn!("未收录的状态码：{}", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let information: &str = &self.information;
        let content_length: &str = &self.content_length.to_string();
        let date: &str = &format_date(&self.date);
        let server: &str = &self.server_name;

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            match &self.content_type {
                Some(t) => ["Content-Type: ", t, CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            "Content-Length: ",
            content_length,
            CRLF,
            "Date: ",
            date,
            CRLF,
            "Server: ",
            server,
            CRLF,
            "Connection: close",
            CRLF,
            CRLF,
        ]
        .concat();
        [
            header.as_bytes(),
            match &self.content {
                Some(c) => c,
                None => b"",
            },
        ]
        .concat()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content(&self) -> &[u8] {
        match &self.content {
            Some(c) => c,
            None => b"",
        }
    }

    pub fn get_content_length(&self) -> u64 {
        self.content_length
    }
}
