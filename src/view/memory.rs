//! 内存页面模型
//!
//! 按元素 id 保存每个渲染目标的状态，并记录提示、跳转和滚动，
//! 命令行模式用它生成 HTML 快照，测试用它检查页面状态。

use async_trait::async_trait;

use super::node::{self, Node};
use super::{ids, tab_pane_id, DocumentView, TAB_BUTTON_CLASS, TAB_PANE_CLASS};
use crate::error::{AppError, AppResult};

/// 默认的标签页
pub const DEFAULT_TABS: [&str; 5] = ["summary", "entities", "statistics", "tables", "policies"];

const ACTIVE_CLASS: &str = "active";

/// 单个元素的状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementState {
    pub id: String,
    pub classes: Vec<String>,
    pub hidden: bool,
    pub disabled: bool,
    pub text: Option<String>,
    pub children: Vec<Node>,
    pub width_percent: Option<u8>,
    pub value: Option<String>,
}

impl ElementState {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// 文本内容：设置过文本时返回文本，否则拼接子节点文本
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.children.iter().map(Node::text_content).collect(),
        }
    }
}

/// 内存页面
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    elements: Vec<ElementState>,
    notices: Vec<String>,
    navigations: Vec<String>,
    scrolls: Vec<String>,
}

impl MemoryView {
    /// 空页面，没有任何元素
    pub fn empty() -> Self {
        Self::default()
    }

    /// 分析页面的初始布局
    pub fn with_default_layout() -> Self {
        Self::with_tabs(&DEFAULT_TABS)
    }

    /// 指定标签页的初始布局，第一个标签页处于激活状态
    pub fn with_tabs(tabs: &[&str]) -> Self {
        let mut elements = vec![
            ElementState::new(ids::UPLOAD_AREA),
            ElementState::new(ids::FILE_INPUT),
            ElementState::new(ids::FILE_INFO).hidden(),
            ElementState::new(ids::FILE_NAME),
            ElementState::new(ids::PROCESS_BTN).disabled(),
            ElementState::new(ids::PROGRESS_SECTION).hidden(),
            ElementState::new(ids::PROGRESS_FILL),
            ElementState::new(ids::PROGRESS_TEXT),
            ElementState::new(ids::RESULTS_SECTION).hidden(),
            ElementState::new(ids::SUMMARY_TEXT),
            ElementState::new(ids::DOC_TYPE),
            ElementState::new(ids::EDUCATION_LEVELS),
            ElementState::new(ids::STATES_MENTIONED),
            ElementState::new(ids::ENTITIES_LIST),
            ElementState::new(ids::STATISTICS_LIST),
            ElementState::new(ids::TABLES_LIST),
            ElementState::new(ids::POLICIES_LIST),
        ];

        for (index, name) in tabs.iter().enumerate() {
            let mut pane = ElementState::new(&tab_pane_id(name)).with_class(TAB_PANE_CLASS);
            let mut button = ElementState::new(&tab_button_id(name)).with_class(TAB_BUTTON_CLASS);
            if index == 0 {
                pane.add_class(ACTIVE_CLASS);
                button.add_class(ACTIVE_CLASS);
            }
            elements.push(pane);
            elements.push(button);
        }

        Self {
            elements,
            ..Default::default()
        }
    }

    /// 添加一个元素
    pub fn insert(&mut self, state: ElementState) {
        self.elements.retain(|e| e.id != state.id);
        self.elements.push(state);
    }

    /// 模拟用户在文件选择框中选了文件
    pub fn choose_file(&mut self, name: &str) -> AppResult<()> {
        self.element_mut(ids::FILE_INPUT)?.value = Some(name.to_string());
        Ok(())
    }

    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: &str) -> AppResult<&mut ElementState> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::element_not_found(id))
    }

    /// 元素是否隐藏；不存在的元素视为隐藏
    pub fn is_hidden(&self, id: &str) -> bool {
        self.element(id).map_or(true, |e| e.hidden)
    }

    /// 控件是否禁用；不存在的元素视为禁用
    pub fn is_disabled(&self, id: &str) -> bool {
        self.element(id).map_or(true, |e| e.disabled)
    }

    pub fn text(&self, id: &str) -> String {
        self.element(id).map(ElementState::text_content).unwrap_or_default()
    }

    pub fn children(&self, id: &str) -> &[Node] {
        self.element(id).map(|e| e.children.as_slice()).unwrap_or_default()
    }

    /// 元素内带指定 class 的后代数量
    pub fn count_class(&self, id: &str, class: &str) -> usize {
        let mut found = Vec::new();
        for child in self.children(id) {
            child.find_by_class(class, &mut found);
        }
        found.len()
    }

    pub fn width_percent(&self, id: &str) -> Option<u8> {
        self.element(id).and_then(|e| e.width_percent)
    }

    pub fn file_input_value(&self) -> Option<&str> {
        self.element(ids::FILE_INPUT).and_then(|e| e.value.as_deref())
    }

    /// 处于激活状态的面板 id
    pub fn active_panes(&self) -> Vec<&str> {
        self.active_with_class(TAB_PANE_CLASS)
    }

    /// 处于激活状态的标签按钮 id
    pub fn active_controls(&self) -> Vec<&str> {
        self.active_with_class(TAB_BUTTON_CLASS)
    }

    fn active_with_class(&self, class: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|e| e.has_class(class) && e.has_class(ACTIVE_CLASS))
            .map(|e| e.id.as_str())
            .collect()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn scrolls(&self) -> &[String] {
        &self.scrolls
    }

    /// 生成整页 HTML 快照
    pub fn to_html_document(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
        out.push_str(&node::escape_html(title));
        out.push_str("</title>\n</head>\n<body>\n");
        for element in &self.elements {
            out.push_str("<div id=\"");
            out.push_str(&node::escape_html(&element.id));
            out.push('"');
            if !element.classes.is_empty() {
                out.push_str(" class=\"");
                out.push_str(&node::escape_html(&element.classes.join(" ")));
                out.push('"');
            }
            if element.hidden {
                out.push_str(" hidden");
            }
            if let Some(percent) = element.width_percent {
                out.push_str(&format!(" style=\"width: {}%\"", percent));
            }
            out.push('>');
            match &element.text {
                Some(text) => out.push_str(&node::escape_html(text)),
                None => out.push_str(&node::to_html(&element.children)),
            }
            out.push_str("</div>\n");
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// 标签页按钮 id
pub fn tab_button_id(name: &str) -> String {
    format!("{}TabBtn", name)
}

#[async_trait]
impl DocumentView for MemoryView {
    async fn set_text(&mut self, id: &str, text: &str) -> AppResult<()> {
        let element = self.element_mut(id)?;
        element.children.clear();
        element.text = Some(text.to_string());
        Ok(())
    }

    async fn set_hidden(&mut self, id: &str, hidden: bool) -> AppResult<()> {
        self.element_mut(id)?.hidden = hidden;
        Ok(())
    }

    async fn set_disabled(&mut self, id: &str, disabled: bool) -> AppResult<()> {
        self.element_mut(id)?.disabled = disabled;
        Ok(())
    }

    async fn set_width_percent(&mut self, id: &str, percent: u8) -> AppResult<()> {
        self.element_mut(id)?.width_percent = Some(percent.min(100));
        Ok(())
    }

    async fn replace_children(&mut self, id: &str, nodes: Vec<Node>) -> AppResult<()> {
        let element = self.element_mut(id)?;
        element.text = None;
        element.children = nodes;
        Ok(())
    }

    async fn clear_file_input(&mut self) -> AppResult<()> {
        self.element_mut(ids::FILE_INPUT)?.value = None;
        Ok(())
    }

    async fn activate_tab(&mut self, pane_id: &str, control_id: &str) -> AppResult<()> {
        // 先确认目标存在，避免全部取消后没有任何激活项
        self.element_mut(pane_id)?;
        self.element_mut(control_id)?;

        for element in &mut self.elements {
            if element.has_class(TAB_PANE_CLASS) || element.has_class(TAB_BUTTON_CLASS) {
                element.remove_class(ACTIVE_CLASS);
            }
        }
        self.element_mut(pane_id)?.add_class(ACTIVE_CLASS);
        self.element_mut(control_id)?.add_class(ACTIVE_CLASS);
        Ok(())
    }

    async fn scroll_into_view(&mut self, id: &str) -> AppResult<()> {
        self.element_mut(id)?;
        self.scrolls.push(id.to_string());
        Ok(())
    }

    async fn notify(&mut self, message: &str) -> AppResult<()> {
        self.notices.push(message.to_string());
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.navigations.push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Element;

    #[tokio::test]
    async fn test_default_layout_initial_state() {
        let view = MemoryView::with_default_layout();

        assert!(!view.is_hidden(ids::UPLOAD_AREA));
        assert!(view.is_hidden(ids::FILE_INFO));
        assert!(view.is_hidden(ids::RESULTS_SECTION));
        assert!(view.is_disabled(ids::PROCESS_BTN));
        assert_eq!(view.active_panes(), vec!["summaryTab"]);
        assert_eq!(view.active_controls(), vec!["summaryTabBtn"]);
    }

    #[tokio::test]
    async fn test_unknown_element_is_an_error() {
        let mut view = MemoryView::empty();
        let err = view.set_text("missing", "x").await.unwrap_err();
        assert!(matches!(err, AppError::View(_)));
    }

    #[tokio::test]
    async fn test_unknown_tab_keeps_current_activation() {
        let mut view = MemoryView::with_default_layout();
        assert!(view.activate_tab("nopeTab", "nopeTabBtn").await.is_err());
        assert_eq!(view.active_panes(), vec!["summaryTab"]);
    }

    #[tokio::test]
    async fn test_set_text_replaces_children() {
        let mut view = MemoryView::with_default_layout();
        view.replace_children(ids::ENTITIES_LIST, vec![Element::new("p").with_text("a").into()])
            .await
            .unwrap();
        view.set_text(ids::ENTITIES_LIST, "b").await.unwrap();

        assert!(view.children(ids::ENTITIES_LIST).is_empty());
        assert_eq!(view.text(ids::ENTITIES_LIST), "b");
    }

    #[tokio::test]
    async fn test_html_snapshot_marks_hidden_and_escapes() {
        let mut view = MemoryView::with_default_layout();
        view.set_text(ids::SUMMARY_TEXT, "<script>").await.unwrap();
        let html = view.to_html_document("report.pdf");

        assert!(html.contains(r#"<div id="fileInfo" hidden></div>"#));
        assert!(html.contains("&lt;script&gt;"));
    }
}
