//! 浏览器页面
//!
//! 通过 `JsExecutor` 在真实页面上执行 DOM 操作。每段脚本在找不到元素时返回
//! `false`，由这里转换为 `ViewError::ElementNotFound`。

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::node::{self, Node};
use super::{ids, DocumentView, TAB_BUTTON_CLASS, TAB_PANE_CLASS};
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

const SET_TEXT: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.textContent = args.text;
    return true;
"#;

const SET_HIDDEN: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.classList.toggle('hidden', args.hidden);
    return true;
"#;

const SET_DISABLED: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.disabled = args.disabled;
    return true;
"#;

const SET_WIDTH: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.style.width = args.percent + '%';
    return true;
"#;

const SET_HTML: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.innerHTML = args.html;
    return true;
"#;

const CLEAR_VALUE: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.value = '';
    return true;
"#;

const ACTIVATE_TAB: &str = r#"
    const pane = document.getElementById(args.pane);
    const control = document.getElementById(args.control);
    if (!pane || !control) return false;
    document.querySelectorAll('.' + args.paneClass).forEach(p => p.classList.remove('active'));
    document.querySelectorAll('.' + args.buttonClass).forEach(b => b.classList.remove('active'));
    pane.classList.add('active');
    control.classList.add('active');
    return true;
"#;

const SCROLL: &str = r#"
    const el = document.getElementById(args.id);
    if (!el) return false;
    el.scrollIntoView({ behavior: 'smooth' });
    return true;
"#;

// alert 会阻塞 evaluate，放到下一轮事件循环里弹出
const NOTIFY: &str = r#"
    setTimeout(() => alert(args.message), 0);
    return true;
"#;

const NAVIGATE: &str = r#"
    window.location.href = args.url;
    return true;
"#;

/// 真实浏览器页面
pub struct PageView {
    executor: JsExecutor,
}

impl PageView {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    async fn run(&self, id: &str, body: &str, args: serde_json::Value) -> AppResult<()> {
        let found: bool = self.executor.call(body, &args).await?;
        if found {
            Ok(())
        } else {
            debug!("页面上没有元素 #{}", id);
            Err(AppError::element_not_found(id))
        }
    }
}

#[async_trait]
impl DocumentView for PageView {
    async fn set_text(&mut self, id: &str, text: &str) -> AppResult<()> {
        self.run(id, SET_TEXT, json!({ "id": id, "text": text })).await
    }

    async fn set_hidden(&mut self, id: &str, hidden: bool) -> AppResult<()> {
        self.run(id, SET_HIDDEN, json!({ "id": id, "hidden": hidden })).await
    }

    async fn set_disabled(&mut self, id: &str, disabled: bool) -> AppResult<()> {
        self.run(id, SET_DISABLED, json!({ "id": id, "disabled": disabled }))
            .await
    }

    async fn set_width_percent(&mut self, id: &str, percent: u8) -> AppResult<()> {
        self.run(id, SET_WIDTH, json!({ "id": id, "percent": percent.min(100) }))
            .await
    }

    async fn replace_children(&mut self, id: &str, nodes: Vec<Node>) -> AppResult<()> {
        let html = node::to_html(&nodes);
        self.run(id, SET_HTML, json!({ "id": id, "html": html })).await
    }

    async fn clear_file_input(&mut self) -> AppResult<()> {
        self.run(ids::FILE_INPUT, CLEAR_VALUE, json!({ "id": ids::FILE_INPUT }))
            .await
    }

    async fn activate_tab(&mut self, pane_id: &str, control_id: &str) -> AppResult<()> {
        let args = json!({
            "pane": pane_id,
            "control": control_id,
            "paneClass": TAB_PANE_CLASS,
            "buttonClass": TAB_BUTTON_CLASS,
        });
        self.run(pane_id, ACTIVATE_TAB, args).await
    }

    async fn scroll_into_view(&mut self, id: &str) -> AppResult<()> {
        self.run(id, SCROLL, json!({ "id": id })).await
    }

    async fn notify(&mut self, message: &str) -> AppResult<()> {
        self.run("alert", NOTIFY, json!({ "message": message })).await
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.run("location", NAVIGATE, json!({ "url": url })).await
    }
}
