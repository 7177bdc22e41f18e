//! HTTP 层：跳转、健康检查与中间件

pub mod middleware;
pub mod services;
