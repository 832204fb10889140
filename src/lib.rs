pub mod application;
pub mod config;
pub mod context;
pub mod controller;
pub mod demo;
pub mod exception;
pub mod param;
pub mod path;
pub mod request;
pub mod response;
pub mod route;
pub mod serializer;
pub mod server;
pub mod util;

pub use application::{Application, RouteMatch};
pub use config::Config;
pub use context::{Body, Context, Reply};
pub use controller::{resolve_method_name, Action, Controller, Handler};
pub use exception::Exception;
pub use param::HttpRequestMethod;
pub use path::split_path;
pub use request::Request;
pub use response::Response;
pub use route::{Route, Segment};
