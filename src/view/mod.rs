//! 页面层
//!
//! `DocumentView` 描述控制器能对页面做的所有操作，按元素 id 寻址。
//! - `MemoryView` - 内存中的页面模型，命令行和测试使用
//! - `PageView` - 通过 `JsExecutor` 操作真实浏览器页面

pub mod memory;
pub mod node;
pub mod page;

pub use memory::MemoryView;
pub use node::{Element, Node};
pub use page::PageView;

use async_trait::async_trait;

use crate::error::AppResult;

/// 页面元素 id
pub mod ids {
    pub const UPLOAD_AREA: &str = "uploadArea";
    pub const FILE_INPUT: &str = "fileInput";
    pub const FILE_INFO: &str = "fileInfo";
    pub const FILE_NAME: &str = "fileName";
    pub const PROCESS_BTN: &str = "processBtn";
    pub const PROGRESS_SECTION: &str = "progressSection";
    pub const PROGRESS_FILL: &str = "progressFill";
    pub const PROGRESS_TEXT: &str = "progressText";
    pub const RESULTS_SECTION: &str = "resultsSection";
    pub const SUMMARY_TEXT: &str = "summaryText";
    pub const DOC_TYPE: &str = "docType";
    pub const EDUCATION_LEVELS: &str = "educationLevels";
    pub const STATES_MENTIONED: &str = "statesMentioned";
    pub const ENTITIES_LIST: &str = "entitiesList";
    pub const STATISTICS_LIST: &str = "statisticsList";
    pub const TABLES_LIST: &str = "tablesList";
    pub const POLICIES_LIST: &str = "policiesList";
}

/// 标签页面板的 class
pub const TAB_PANE_CLASS: &str = "tab-pane";
/// 标签页按钮的 class
pub const TAB_BUTTON_CLASS: &str = "tab-btn";

/// 标签页名对应的面板 id
pub fn tab_pane_id(name: &str) -> String {
    format!("{}Tab", name)
}

/// 页面渲染目标
#[async_trait]
pub trait DocumentView: Send {
    /// 设置元素的文本内容
    async fn set_text(&mut self, id: &str, text: &str) -> AppResult<()>;

    /// 显示 / 隐藏元素
    async fn set_hidden(&mut self, id: &str, hidden: bool) -> AppResult<()>;

    /// 启用 / 禁用控件
    async fn set_disabled(&mut self, id: &str, disabled: bool) -> AppResult<()>;

    /// 设置元素宽度百分比（进度条）
    async fn set_width_percent(&mut self, id: &str, percent: u8) -> AppResult<()>;

    /// 清空元素后放入新的子节点
    async fn replace_children(&mut self, id: &str, nodes: Vec<Node>) -> AppResult<()>;

    /// 清空文件选择框
    async fn clear_file_input(&mut self) -> AppResult<()>;

    /// 先取消所有面板和按钮的激活状态，再激活指定的面板和按钮
    async fn activate_tab(&mut self, pane_id: &str, control_id: &str) -> AppResult<()>;

    /// 滚动到元素
    async fn scroll_into_view(&mut self, id: &str) -> AppResult<()>;

    /// 向用户显示提示
    async fn notify(&mut self, message: &str) -> AppResult<()>;

    /// 浏览器跳转
    async fn navigate(&mut self, url: &str) -> AppResult<()>;
}
