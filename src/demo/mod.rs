//! # REST 演示应用
//!
//! 在内存中维护用户与好友关系，挂载在三条通用路由上：
//!
//! ```text
//! :_controller/:id/:_action   GET /users/1/friends, POST /users/1/friends
//! :_controller/:id/           GET /users/2, PUT /users/5
//! :_controller                GET /users, POST /users
//! ```

pub mod models;
pub mod users;

use crate::{application::Application, config::Config, exception::Exception, route::Route};

pub use users::UserController;

/// 构建演示应用：注册 `users` 控制器并添加通用路由
pub fn build_application(config: &Config) -> Result<Application, Exception> {
    let mut app = Application::from_config(config);
    app.register_controller("users", UserController::new().into_controller());

    app.add_route(Route::new(":_controller/:id/:_action"))?;
    app.add_route(Route::new(":_controller/:id/"))?;
    app.add_route(Route::new(":_controller"))?;
    Ok(app)
}
