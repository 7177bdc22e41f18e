//! Affilink - affiliate short-link redirector with click attribution
//!
//! 处理 `GET /go/{short_code}`：校验链接与合作方状态，识别机器人与可疑流量，
//! 签发会话与归因 Cookie，在后台记录点击，然后 302 到商家页面。
//!
//! # Architecture
//! - `tracking`: 解析、机器人/欺诈识别、会话 Cookie、点击记录器
//! - `cache`: 链接与 IP 黑名单读缓存
//! - `storage`: SeaORM 存储后端
//! - `api`: HTTP 服务与中间件
//! - `interfaces`: 管理 CLI
//! - `config`: 配置加载
//! - `runtime`: 启动、关闭与运行模式
//! - `system`: 日志初始化

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod storage;
pub mod system;
pub mod tracking;
pub mod utils;
