use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};
use serde::Serialize;

use super::models::{FriendshipModel, UserCollection, UserModel};
use crate::{
    context::Context,
    controller::Controller,
    param::HttpRequestMethod,
};

#[derive(Debug, Default)]
struct Directory {
    users: UserCollection,
    friends: Vec<FriendshipModel>,
}

/// 用户控制器的共享状态。
///
/// 同一个控制器会被并发请求调用，所有读写都经过同一把锁。
#[derive(Debug, Default)]
pub struct UserController {
    directory: Mutex<Directory>,
}

impl UserController {
    /// 预置四个用户和四条好友关系
    pub fn new() -> Self {
        let mut directory = Directory::default();
        for name in ["John", "Paul", "Ringo", "George"] {
            directory.users.add(UserModel::new(name));
        }
        for (a, b) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            directory.friends.push(FriendshipModel {
                user_id1: a,
                user_id2: b,
            });
        }
        Self {
            directory: Mutex::new(directory),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Directory> {
        match self.directory.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("用户数据锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }

    /// `GET /users` 列出全部用户，`GET /users/:id` 获取单个用户
    pub fn get(&self, ctx: &mut Context) {
        let directory = self.lock();
        match user_id(ctx) {
            Some(id) => match directory.users.get(id) {
                Some(user) => {
                    respond(ctx, user);
                }
                None => {
                    ctx.response.set_status(404);
                }
            },
            None => {
                respond(ctx, &directory.users.get_all());
            }
        }
    }

    /// `POST /users`，请求体为 JSON 用户
    pub fn post(&self, ctx: &mut Context) {
        let user: UserModel = match serde_json::from_slice(ctx.request.body()) {
            Ok(user) => user,
            Err(e) => {
                debug!("无法解析用户：{}", e);
                ctx.response.set_status(400);
                return;
            }
        };
        let user = self.lock().users.add(user);
        respond(ctx, &user);
    }

    /// `PUT /users/:id`，按 id 覆盖用户
    pub fn put(&self, ctx: &mut Context) {
        let id = match user_id(ctx) {
            Some(id) => id,
            None => {
                ctx.response.set_status(400);
                return;
            }
        };
        let user: UserModel = match serde_json::from_slice(ctx.request.body()) {
            Ok(user) => user,
            Err(e) => {
                debug!("无法解析用户：{}", e);
                ctx.response.set_status(400);
                return;
            }
        };
        let user = self.lock().users.set(id, user);
        respond(ctx, &user);
    }

    /// `GET /users/:id/friends`
    pub fn get_friends(&self, ctx: &mut Context) {
        let id = match user_id(ctx) {
            Some(id) => id,
            None => {
                ctx.response.set_status(400);
                return;
            }
        };
        let directory = self.lock();
        let friends: Vec<&UserModel> = directory
            .friends
            .iter()
            .filter_map(|f| f.other(id))
            .filter_map(|other| directory.users.get(other))
            .collect();
        respond(ctx, &friends);
    }

    /// `POST /users/:id/friends`，请求体为好友的 id 文本
    pub fn post_friends(&self, ctx: &mut Context) {
        let id = user_id(ctx);
        let friend_id = std::str::from_utf8(ctx.request.body())
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok());
        match (id, friend_id) {
            (Some(user_id1), Some(user_id2)) => {
                self.lock().friends.push(FriendshipModel { user_id1, user_id2 });
            }
            _ => {
                ctx.response.set_status(400);
            }
        }
    }

    /// 以约定的动作名把控制器方法绑定到动作表
    pub fn into_controller(self) -> Controller {
        Controller::with_state(self)
            .on(HttpRequestMethod::Get, "", UserController::get)
            .on(HttpRequestMethod::Post, "", UserController::post)
            .on(HttpRequestMethod::Put, "", UserController::put)
            .on(HttpRequestMethod::Get, "friends", UserController::get_friends)
            .on(HttpRequestMethod::Post, "friends", UserController::post_friends)
            .build()
    }
}

/// 以结构化文档作为响应体；编码失败时 `set_structured` 已置为 500，这里只记录日志
fn respond<T: Serialize>(ctx: &mut Context, value: &T) {
    if let Err(e) = ctx.response.set_structured(value) {
        warn!("用户响应体编码失败：{}", e);
    }
}

/// 路径中的正整数 id；缺失或不是正整数时返回 `None`
fn user_id(ctx: &Context) -> Option<u64> {
    ctx.param("id")
        .and_then(|id| id.parse::<u64>().ok())
        .filter(|&id| id > 0)
}
