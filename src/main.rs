// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # ripple 演示服务器
//!
//! 初始化日志与配置，构建 REST 演示应用并启动 Tokio 监听循环。
//! 启动后可以直接访问，例如：
//!
//! ```text
//! curl http://127.0.0.1:7878/users
//! curl http://127.0.0.1:7878/users/1/friends
//! curl -X POST -d '{"name":"New user"}' http://127.0.0.1:7878/users
//! ```

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::Path,
    process,
    sync::Arc,
};

use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{net::TcpListener, runtime::Builder};

use ripple::{demo, server::{self, Limits}, Config};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const APP_CONFIG: &str = "config/development.toml";

/// # 程序入口点
///
/// 任何启动期错误（日志、配置、路由注册、端口绑定）都会记录日志并以非零状态退出。
fn main() {
    // 1. 初始化日志系统：优先使用外部 YAML，缺失时退回到控制台输出
    if let Err(e) = init_logging() {
        eprintln!("无法初始化日志系统：{}", e);
        process::exit(1);
    }

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = if Path::new(APP_CONFIG).exists() {
        match Config::from_toml(APP_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
    } else {
        warn!("未找到{}，使用默认配置", APP_CONFIG);
        Config::new()
    };
    info!("配置文件已载入");

    // 3. 注册控制器与路由
    let app = match demo::build_application(&config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("路由注册失败：{}", e);
            process::exit(1);
        }
    };
    info!("共注册{}条路由", app.routes().len());

    // 4. 异步运行时定制：根据配置文件分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建Tokio运行时：{}", e);
            process::exit(1);
        }
    };

    // 5. 网络层初始化：支持全地址监听或本地回环监听
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    let socket = SocketAddrV4::new(address, config.port());

    runtime.block_on(async move {
        let listener = match TcpListener::bind(socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法绑定端口：{}，错误：{}", config.port(), e);
                process::exit(1);
            }
        };
        info!("服务端将在{}上监听Socket连接", socket);
        server::serve(listener, app, Limits::from_config(&config)).await;
    });
}

fn init_logging() -> Result<(), String> {
    if Path::new(LOG_CONFIG).exists() {
        return log4rs::init_file(LOG_CONFIG, Default::default()).map_err(|e| e.to_string());
    }
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| e.to_string())?;
    log4rs::init_config(log_config)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
