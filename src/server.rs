// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 传输层
//!
//! 基于 Tokio 的 TCP 监听循环：每个连接派生一个轻量任务，
//! 读取一个请求、交给 `Application::serve`、写回响应后关闭连接。

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

use crate::{application::Application, config::Config, request::{self, Request}, response::Response};

/// 单次读取的块大小
const READ_CHUNK: usize = 1024;

/// 单个连接的读取限制
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// 请求（头部 + 正文）的最大字节数，超过返回 413
    pub max_request_size: usize,
    /// 读完一个请求的时限，超时返回 408
    pub read_timeout: Duration,
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_request_size: config.max_request_size(),
            read_timeout: config.read_timeout(),
        }
    }
}

/// 主事件循环 (Accept Loop)，持续接收新连接并派发到 Tokio 线程池
pub async fn serve(listener: TcpListener, app: Arc<Application>, limits: Limits) {
    let mut id: u128 = 0;
    loop {
        let (mut stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("接受TCP连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        let app = Arc::clone(&app);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, &app, limits).await;
        });
        id += 1; // 增加请求唯一标识序列
    }
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期：读取并解析请求、分发、发送响应。
pub async fn handle_connection(stream: &mut TcpStream, id: u128, app: &Application, limits: Limits) {
    let max_request_size = limits.max_request_size;
    let buffer = match timeout(limits.read_timeout, read_request(stream, max_request_size)).await {
        Ok(Ok(buffer)) if buffer.is_empty() => return, // 客户端主动关闭连接
        Ok(Ok(buffer)) => buffer,
        Ok(Err(e)) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
        Err(_) => {
            warn!("[ID{}]{}ms内未读完请求，返回408", id, limits.read_timeout.as_millis());
            write_response(stream, id, &Response::response_408(app.content_type())).await;
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕，{} bytes", id, buffer.len());

    let start_time = Instant::now();

    // 头部未结束却已达到上限的请求同样视为过大
    let oversized = match request::expected_length(&buffer) {
        Some(len) => len > max_request_size,
        None => buffer.len() >= max_request_size,
    };

    let response = if oversized {
        warn!("[ID{}]请求超过{}字节上限，返回413", id, max_request_size);
        Response::response_413(app.content_type())
    } else {
        match Request::try_from(&buffer, id) {
            Ok(request) => {
                let method = request.method();
                let path = request.path().to_string();
                let response = app.serve(request, id);
                info!(
                    "[ID{}] {}, {}, {}, {}",
                    id,
                    method,
                    path,
                    response.status_code(),
                    response.information(),
                );
                response
            }
            Err(e) => {
                warn!("[ID{}]解析HTTP请求失败: {}，返回400", id, e);
                Response::response_400(app.content_type())
            }
        }
    };

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    write_response(stream, id, &response).await;
}

async fn write_response(stream: &mut TcpStream, id: u128, response: &Response) {
    let response_bytes = response.as_bytes();
    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

/// 读取一个完整请求：读到头部结束且正文达到 `Content-Length`，或达到上限为止
async fn read_request(stream: &mut TcpStream, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.len() >= limit {
            break;
        }
        if let Some(expected) = request::expected_length(&buffer) {
            if buffer.len() >= expected || expected > limit {
                break;
            }
        }
    }
    Ok(buffer)
}
