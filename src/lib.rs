//! # Doc Insight Client
//!
//! 上传 PDF、触发分析、展示结果并导出的会话客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / call() 能力
//!
//! ### ② 业务能力层（Clients / Services / View）
//! - `clients/` - `AnalysisService` 分析服务能力，`AnalysisClient` 基于 reqwest 实现
//! - `services/` - 结果渲染、实体分组、本地 CSV 导出
//! - `view/` - `DocumentView` 页面能力，`MemoryView` / `PageView` 两种实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `SessionCtx` - 上下文封装（session_id + filename）
//! - `SessionController` - 流程编排（upload → process → render → download）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 接收页面事件，串行交给流程层执行
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod view;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use clients::{AnalysisClient, AnalysisService};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{AnalysisResult, ExportKind, SelectedFile};
pub use orchestrator::{App, SessionStats, UiEvent};
pub use view::{DocumentView, MemoryView, PageView};
pub use workflow::{ActionOutcome, SessionController, SessionCtx};
