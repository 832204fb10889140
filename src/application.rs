// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 应用模块
//!
//! `Application` 持有控制器注册表与有序路由表，负责：
//! - 启动期的注册与校验（`register_controller` / `add_route`）。
//! - 请求期的路由匹配（`match_request`）与分发（`dispatch`）。
//! - 面向传输层的单一入口（`serve`），产出状态码、正文与 `Content-Type`。
//!
//! 注册只应发生在开始服务之前；服务期间注册表与路由表视为只读，
//! 因此 `Application` 可以放进 `Arc` 在并发请求之间共享。

use std::collections::HashMap;

use log::{debug, error, info, warn};

use crate::{
    config::Config,
    context::Context,
    controller::{resolve_method_name, Controller, Handler},
    exception::Exception,
    param::{HttpRequestMethod, JSON_CONTENT_TYPE},
    path::split_path,
    request::Request,
    response::Response,
    route::{Route, Segment},
    serializer::serialize,
    util::{normalize_base_path, strip_base_path},
};

/// 一次成功的路由匹配
#[derive(Clone)]
pub struct RouteMatch<'a> {
    pub controller_name: String,
    pub action_name: String,
    /// 解析出的控制器方法名，例如 `GetTasks`
    pub method_name: String,
    pub handler: Handler,
    pub params: HashMap<String, String>,
    pub route: &'a Route,
}

pub struct Application {
    controllers: HashMap<String, Controller>,
    routes: Vec<Route>,
    content_type: String,
    base_path: String,
}

impl Application {
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
            routes: Vec::new(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            base_path: String::new(),
        }
    }

    /// 按配置设置序列化格式与挂载前缀
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_content_type(config.content_type())
            .with_base_path(config.base_path())
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// 设置挂载前缀；缺失的开头 `/` 会被补上
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// 注册控制器。同名注册以最后一次为准。
    pub fn register_controller(&mut self, name: &str, controller: Controller) {
        if self.controllers.insert(name.to_string(), controller).is_some() {
            warn!("控制器\"{}\"被重复注册，已覆盖先前的注册", name);
        }
        debug!("控制器\"{}\"注册完成", name);
    }

    /// 追加路由。静态绑定的控制器必须已经注册，只在此处检查一次。
    pub fn add_route(&mut self, route: Route) -> Result<(), Exception> {
        if let Some(name) = &route.controller {
            if !self.controllers.contains_key(name) {
                error!("路由{}绑定的控制器\"{}\"不存在", route.pattern, name);
                return Err(Exception::UnknownController(name.clone()));
            }
        }
        info!("已添加路由：{}", route.pattern);
        self.routes.push(route);
        Ok(())
    }

    /// 按注册顺序扫描路由表，返回最后一个匹配的候选。
    ///
    /// 后注册的路由覆盖先注册的路由：当通用模式与更具体的模式同时匹配时，
    /// 通常把具体模式放在后面注册。
    pub fn match_request(&self, request: &Request) -> Option<RouteMatch<'_>> {
        let path = strip_base_path(request.path(), &self.base_path)?;
        let verb = request.method().to_string();
        let path_tokens = split_path(path);

        let mut output = None;
        for route in &self.routes {
            if let Some(m) = self.match_route(route, &verb, &path_tokens) {
                output = Some(m);
            }
        }
        output
    }

    fn match_route<'a>(&self, route: &'a Route, verb: &str, path_tokens: &[&str]) -> Option<RouteMatch<'a>> {
        let pattern_tokens = route.tokens();
        if pattern_tokens.len() != path_tokens.len() {
            return None;
        }

        let mut controller_name = "";
        let mut action_name = "";
        let mut params = HashMap::new();
        for (&pattern_token, &path_token) in pattern_tokens.iter().zip(path_tokens) {
            match Segment::classify(pattern_token) {
                Segment::Controller => controller_name = path_token,
                Segment::Action => action_name = path_token,
                // 与路径段完全相同的模式段按字面量处理，不产生参数
                _ if pattern_token == path_token => {}
                Segment::Param(name) => {
                    params.insert(name.to_string(), path_token.to_string());
                }
                Segment::Literal(_) => return None,
            }
        }

        if controller_name.is_empty() {
            controller_name = route.controller.as_deref().unwrap_or("");
        }
        if action_name.is_empty() {
            action_name = route.action.as_deref().unwrap_or("");
        }

        let controller = self.controllers.get(controller_name)?;
        let method_name = resolve_method_name(verb, action_name);
        let handler = controller.method(&method_name)?;

        Some(RouteMatch {
            controller_name: controller_name.to_string(),
            action_name: action_name.to_string(),
            method_name,
            handler: Handler::clone(handler),
            params,
            route,
        })
    }

    /// 匹配并调用控制器动作，返回动作修改后的上下文。
    ///
    /// 未匹配时返回 `None`，不会调用任何动作。
    pub fn dispatch(&self, request: Request, id: u128) -> Option<Context> {
        let matched = match self.match_request(&request) {
            Some(m) => m,
            None => {
                warn!("[ID{}]No match for: {} {}", id, request.method(), request.path());
                return None;
            }
        };
        debug!(
            "[ID{}]匹配到路由{}：控制器={}, 方法={}",
            id, matched.route.pattern, matched.controller_name, matched.method_name
        );

        let mut ctx = Context::new(matched.params, request);
        matched.handler.call(&mut ctx);
        Some(ctx)
    }

    /// 传输层入口：分发请求并把结果编码为 HTTP 响应报文。
    ///
    /// 未匹配得到 404，序列化失败得到 500，其余情况使用动作设置的状态码。
    pub fn serve(&self, request: Request, id: u128) -> Response {
        let headonly = request.method() == HttpRequestMethod::Head;
        let mut response = match self.dispatch(request, id) {
            None => Response::response_404(&self.content_type),
            Some(ctx) => match serialize(ctx.response.body.as_ref(), &self.content_type) {
                Ok(body) => Response::from_reply(ctx.response.status, body, &self.content_type),
                Err(e) => {
                    error!("[ID{}]序列化响应体失败：{}", id, e);
                    Response::response_500(&self.content_type)
                }
            },
        };
        if headonly {
            response.head_only();
        }
        response
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
