// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 端到端测试：在临时端口上启动演示服务器，通过原始 TCP 报文交互

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ripple::{
    demo,
    server::{self, Limits},
    Config,
};

/// 启动一个独立的演示服务器，返回其监听地址
async fn spawn_server() -> SocketAddr {
    spawn_server_with(Limits::from_config(&Config::new())).await
}

async fn spawn_server_with(limits: Limits) -> SocketAddr {
    let app = Arc::new(demo::build_application(&Config::new()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, app, limits));
    addr
}

/// 发送原始请求并读取到服务端关闭连接为止
async fn send_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buffer = Vec::new();
    // 设置硬超时限制，防止测试用例因服务器挂起而永久阻塞
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buffer))
        .await
        .expect("服务端响应超时")
        .unwrap();
    String::from_utf8_lossy(&buffer).to_string()
}

/// 发送原始字节，容忍服务端提前关闭连接造成的读写错误
async fn send_bytes(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let _ = stream.write_all(request).await;

    let mut buffer = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buffer))
        .await
        .expect("服务端响应超时");
    String::from_utf8_lossy(&buffer).to_string()
}

fn parse_response(response: &str) -> (u16, HashMap<String, String>, String) {
    let (head, body) = response.split_once("\r\n\r\n").unwrap_or((response, ""));
    let mut lines = head.split("\r\n");

    // 解析状态行
    let status_code = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .unwrap_or(0);

    // 解析头部
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    (status_code, headers, body.to_string())
}

fn get(path: &str) -> String {
    format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path)
}

fn with_body(method: &str, path: &str, body: &str) -> String {
    format!(
        "{} {} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{}",
        method,
        path,
        body.len(),
        body
    )
}

#[tokio::test]
async fn test_list_users() {
    let addr = spawn_server().await;
    let (status, headers, body) = parse_response(&send_request(addr, &get("/users")).await);

    assert_eq!(status, 200);
    assert_eq!(
        body,
        r#"[{"id":1,"name":"John"},{"id":2,"name":"Paul"},{"id":3,"name":"Ringo"},{"id":4,"name":"George"}]"#
    );
    assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
    assert_eq!(headers.get("Content-Length"), Some(&body.len().to_string()));
    assert_eq!(headers.get("Server").map(String::as_str), Some("ripple"));
    assert!(headers.contains_key("Date"));
}

#[tokio::test]
async fn test_get_single_user() {
    let addr = spawn_server().await;
    let (status, _, body) = parse_response(&send_request(addr, &get("/users/2")).await);
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":2,"name":"Paul"}"#);

    let (status, _, body) = parse_response(&send_request(addr, &get("/users/2/")).await);
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":2,"name":"Paul"}"#);
}

#[tokio::test]
async fn test_unknown_user_and_unknown_route() {
    let addr = spawn_server().await;

    let (status, _, body) = parse_response(&send_request(addr, &get("/users/42")).await);
    assert_eq!(status, 404);
    assert!(body.is_empty());

    let (status, _, _) = parse_response(&send_request(addr, &get("/nothere")).await);
    assert_eq!(status, 404);

    // users 没有 GetOops 方法
    let (status, _, _) = parse_response(&send_request(addr, &get("/users/1/oops")).await);
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_post_and_put_user() {
    let addr = spawn_server().await;

    let request = with_body("POST", "/users", r#"{"name":"New user"}"#);
    let (status, _, body) = parse_response(&send_request(addr, &request).await);
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":5,"name":"New user"}"#);

    let request = with_body("PUT", "/users/5", r#"{"name":"Different name"}"#);
    let (status, _, body) = parse_response(&send_request(addr, &request).await);
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":5,"name":"Different name"}"#);

    let (_, _, body) = parse_response(&send_request(addr, &get("/users/5")).await);
    assert_eq!(body, r#"{"id":5,"name":"Different name"}"#);
}

#[tokio::test]
async fn test_post_invalid_user() {
    let addr = spawn_server().await;
    let request = with_body("POST", "/users", "not json");
    let (status, _, _) = parse_response(&send_request(addr, &request).await);
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_friends_round_trip() {
    let addr = spawn_server().await;

    let request = with_body("POST", "/users/1/friends", "4");
    let (status, _, body) = parse_response(&send_request(addr, &request).await);
    assert_eq!(status, 200);
    assert!(body.is_empty());

    let (status, _, body) = parse_response(&send_request(addr, &get("/users/1/friends")).await);
    assert_eq!(status, 200);
    assert_eq!(
        body,
        r#"[{"id":2,"name":"Paul"},{"id":3,"name":"Ringo"},{"id":4,"name":"George"}]"#
    );
}

#[tokio::test]
async fn test_head_request_has_no_body() {
    let addr = spawn_server().await;
    let request = "HEAD /users/1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let (status, headers, body) = parse_response(&send_request(addr, request).await);

    // users 没有绑定 Head 方法，因此得到 404
    assert_eq!(status, 404);
    assert!(body.is_empty());
    assert!(headers.contains_key("Content-Length"));
}

#[tokio::test]
async fn test_malformed_requests_get_400() {
    let addr = spawn_server().await;
    let attacks = vec![
        "GARBAGE\r\n\r\n",
        "BREW /users HTTP/1.1\r\nHost: localhost\r\n\r\n",
        "GET /users HTTP/1.0\r\nHost: localhost\r\n\r\n",
    ];

    for attack in attacks {
        let (status, _, _) = parse_response(&send_request(addr, attack).await);
        assert_eq!(status, 400, "{:?}", attack);
    }
}

#[tokio::test]
async fn test_oversized_request_gets_413() {
    let addr = spawn_server().await;
    let request = "POST /users HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100000\r\n\r\n";
    let (status, _, _) = parse_response(&send_request(addr, request).await);
    assert_eq!(status, 413);
}

#[tokio::test]
async fn test_oversized_headers_without_terminator_get_413() {
    let addr = spawn_server().await;
    // 恰好填满上限，头部一直没有结束
    let mut request = b"GET /users HTTP/1.1\r\nX-Pad: ".to_vec();
    request.resize(8192, b'a');

    let (status, _, _) = parse_response(&send_bytes(addr, &request).await);
    assert_eq!(status, 413);
}

#[tokio::test]
async fn test_stalled_request_times_out_with_408() {
    let addr = spawn_server_with(Limits {
        max_request_size: 8192,
        read_timeout: Duration::from_millis(200),
    })
    .await;

    // 头部只发送一半，之后不再写入
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /users HTTP/1.1\r\nHost: x").await.unwrap();

    let mut buffer = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buffer))
        .await
        .expect("服务端没有在时限后关闭连接")
        .unwrap();
    let (status, _, _) = parse_response(&String::from_utf8_lossy(&buffer));
    assert_eq!(status, 408);
}

#[tokio::test]
async fn test_percent_encoded_path() {
    let addr = spawn_server().await;
    let (status, _, body) = parse_response(&send_request(addr, &get("/%75sers/%32")).await);
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":2,"name":"Paul"}"#);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let addr = spawn_server().await;
    let mut handles = vec![];

    for id in 1..=4 {
        handles.push(tokio::spawn(async move {
            parse_response(&send_request(addr, &get(&format!("/users/{}", id))).await)
        }));
    }

    for handle in handles {
        let (status, _, _) = handle.await.unwrap();
        assert_eq!(status, 200);
    }
}

#[test]
fn test_parse_response_basic() {
    let response = "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nServer: test\r\n\r\nHello";
    let (status_code, headers, body) = parse_response(response);

    assert_eq!(status_code, 200);
    assert_eq!(headers.len(), 2);
    assert_eq!(body, "Hello");
}
