//! 页面片段
//!
//! 渲染结果先构造成节点树，再由具体的页面实现落地。
//! 序列化为 HTML 时所有文本都会转义。

/// 页面节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// 元素节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class == Some(class)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    /// 文本内容（等价于 DOM 的 `textContent`）
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// 深度优先查找带指定 class 的元素（包含自身）
    pub fn find_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if let Node::Element(element) = self {
            if element.has_class(class) {
                out.push(element);
            }
            for child in &element.children {
                child.find_by_class(class, out);
            }
        }
    }

    /// 深度优先查找指定标签的元素（包含自身）
    pub fn find_by_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if let Node::Element(element) = self {
            if element.tag == tag {
                out.push(element);
            }
            for child in &element.children {
                child.find_by_tag(tag, out);
            }
        }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                if let Some(class) = element.class {
                    out.push_str(" class=\"");
                    out.push_str(class);
                    out.push('"');
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(element.tag);
                out.push('>');
            }
        }
    }
}

/// 把节点列表序列化为 HTML
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

/// HTML 文本转义
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escapes_text() {
        let card: Node = Element::new("div")
            .with_class("entity-card")
            .with_child(Element::new("div").with_class("entity-text").with_text("<b>R&D</b>"))
            .into();

        assert_eq!(
            to_html(&[card]),
            r#"<div class="entity-card"><div class="entity-text">&lt;b&gt;R&amp;D&lt;/b&gt;</div></div>"#
        );
    }

    #[test]
    fn test_text_content_and_lookup() {
        let node: Node = Element::new("tr")
            .with_child(Element::new("td").with_text("Kerala"))
            .with_child(Element::new("td").with_text(""))
            .into();

        assert_eq!(node.text_content(), "Kerala");
        let mut cells = Vec::new();
        node.find_by_tag("td", &mut cells);
        assert_eq!(cells.len(), 2);
    }
}
