//! `saran_core`：输入提示（自动补全）的纯逻辑层，不依赖任何窗口系统。
//!
//! 设计目标：
//! - **核心可复用**：GUI/CLI 宿主都能复用同一套逻辑，平台浮层藏在 `Overlay` 后面
//! - **分层清晰**：session -> processor -> controller -> (worker: filter) -> presentation
//! - **后写者胜**：只有最新一次文本变化的过滤结果能更新浮层
pub mod config;
pub mod controller;
pub mod filter;
pub mod key_event;
pub mod model;
pub mod presentation;
pub mod processor;
pub mod session;
pub mod token;
pub mod vocabulary;
pub mod worker;
