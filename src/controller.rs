// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 控制器模块
//!
//! 控制器是一组以方法名为键的动作处理函数。方法名由 HTTP 方法与动作名按约定拼接，
//! 例如 `GET` + `tasks` 得到 `GetTasks`。
//!
//! 动作表在注册时通过构建器显式建立，匹配阶段只做查表：
//! 表中没有对应方法名时视为“未匹配”，而不是错误。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{context::Context, param::HttpRequestMethod, util::title_case};

/// 根据 HTTP 方法与动作名计算控制器方法名。
///
/// 方法名先转小写再首字母大写，动作名首字母大写，然后拼接：
/// `("GET", "user")` 得到 `"GetUser"`，`("POST", "")` 得到 `"Post"`。
pub fn resolve_method_name(http_verb: &str, action: &str) -> String {
    title_case(&http_verb.to_lowercase()) + &title_case(action)
}

/// 控制器动作。接收请求上下文，通过修改 `ctx.response` 返回结果。
pub trait Action: Send + Sync {
    fn call(&self, ctx: &mut Context);
}

impl<F> Action for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn call(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// 已绑定的动作句柄，可在并发请求之间共享
pub type Handler = Arc<dyn Action>;

/// 已注册的控制器：方法名到动作的映射
#[derive(Clone, Default)]
pub struct Controller {
    methods: HashMap<String, Handler>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以共享状态构建控制器，动作以 `fn(&S, &mut Context)` 的形式绑定
    pub fn with_state<S>(state: S) -> StatefulBuilder<S>
    where
        S: Send + Sync + 'static,
    {
        StatefulBuilder {
            state: Arc::new(state),
            controller: Controller::new(),
        }
    }

    /// 绑定一个动作到 `(verb, action)`。同名方法后绑定者覆盖先绑定者。
    pub fn on<F>(self, verb: HttpRequestMethod, action: &str, handler: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.on_action(verb, action, Arc::new(handler))
    }

    /// 绑定一个已经包装好的动作句柄
    pub fn on_action(mut self, verb: HttpRequestMethod, action: &str, handler: Handler) -> Self {
        let name = resolve_method_name(&verb.to_string(), action);
        self.methods.insert(name, handler);
        self
    }

    /// 按方法名查找动作
    pub fn method(&self, name: &str) -> Option<&Handler> {
        self.methods.get(name)
    }

    /// 已绑定的方法名，按字典序排列
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("methods", &self.method_names())
            .finish()
    }
}

/// 携带共享状态的控制器构建器
pub struct StatefulBuilder<S> {
    state: Arc<S>,
    controller: Controller,
}

impl<S> StatefulBuilder<S>
where
    S: Send + Sync + 'static,
{
    pub fn on(mut self, verb: HttpRequestMethod, action: &str, handler: fn(&S, &mut Context)) -> Self {
        let state = Arc::clone(&self.state);
        self.controller = self
            .controller
            .on(verb, action, move |ctx: &mut Context| handler(&state, ctx));
        self
    }

    /// 状态句柄，供调用方在构建后继续观察控制器内部状态
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    pub fn build(self) -> Controller {
        self.controller
    }
}
