//! 路由定义。
//!
//! 一条路由由模式与可选的静态控制器/动作名组成。模式中的段分为四类：
//! 字面量、`:_controller`、`:_action` 与命名参数 `:name`。

use crate::{
    param::{ACTION_CAPTURE, CAPTURE_MARKER, CONTROLLER_CAPTURE},
    path::split_path,
};

/// 路由模式中的单个段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// 必须与请求路径段完全相等（区分大小写）
    Literal(&'a str),
    /// 把请求路径段绑定为控制器名称
    Controller,
    /// 把请求路径段绑定为动作名称
    Action,
    /// 把请求路径段绑定到同名参数
    Param(&'a str),
}

impl<'a> Segment<'a> {
    pub fn classify(token: &'a str) -> Self {
        if token == CONTROLLER_CAPTURE {
            Segment::Controller
        } else if token == ACTION_CAPTURE {
            Segment::Action
        } else if let Some(name) = token.strip_prefix(CAPTURE_MARKER) {
            Segment::Param(name)
        } else {
            Segment::Literal(token)
        }
    }
}

/// 一条已注册的路由
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub pattern: String,
    /// 模式未捕获控制器时使用的控制器名称
    pub controller: Option<String>,
    /// 模式未捕获动作时使用的动作名称
    pub action: Option<String>,
}

impl Route {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            controller: None,
            action: None,
        }
    }

    /// 绑定静态控制器；空字符串等同于不绑定
    pub fn controller(mut self, name: &str) -> Self {
        self.controller = Some(name.to_string()).filter(|n| !n.is_empty());
        self
    }

    /// 绑定静态动作；空字符串等同于不绑定
    pub fn action(mut self, name: &str) -> Self {
        self.action = Some(name.to_string()).filter(|n| !n.is_empty());
        self
    }

    /// 模式切分后的原始段
    pub fn tokens(&self) -> Vec<&str> {
        split_path(&self.pattern)
    }

    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.tokens().into_iter().map(Segment::classify).collect()
    }
}
