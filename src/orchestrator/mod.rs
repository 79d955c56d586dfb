//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 接收页面事件并逐个交给流程层执行，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! app::App (接收 UiEvent，串行调度)
//!     ↓
//! workflow::SessionController (处理单个会话)
//!     ↓
//! services / clients (能力层：渲染 / 分组 / 导出 / 分析服务)
//!     ↓
//! view (DocumentView：内存页面或浏览器页面)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod app;

pub use app::{App, SessionStats, UiEvent};
