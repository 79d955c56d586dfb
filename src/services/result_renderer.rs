//! 结果渲染服务 - 业务能力层
//!
//! 只负责把 `AnalysisResult` 转换成各个区域的页面片段，不接触页面本身。
//! 每个区域独立渲染，缺失或为空时给出固定的占位文本。

use serde_json::Value as JsonValue;

use crate::models::analysis::non_empty;
use crate::models::lenient::value_text;
use crate::models::{AnalysisResult, KeyStatistic, NamedEntity, PolicyScheme, TableEntry};
use crate::view::{Element, Node};

/// 占位文本
pub mod placeholders {
    pub const NO_SUMMARY: &str = "No summary available";
    pub const NOT_AVAILABLE: &str = "N/A";
    pub const NO_EDUCATION_LEVELS: &str = "No education levels found";
    pub const NO_STATES: &str = "No states mentioned";
    pub const NO_ENTITIES: &str = "No entities found";
    pub const NO_STATISTICS: &str = "No statistics found";
    pub const NO_TABLES: &str = "No tables found";
    pub const NO_TABLE_DATA: &str = "No table data available";
    pub const NO_POLICIES: &str = "No policies or schemes found";
    pub const NO_DESCRIPTION: &str = "No description available";
}

/// 占位元素的 class
pub const PLACEHOLDER_CLASS: &str = "placeholder";

/// 渲染后的各区域内容
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub summary: String,
    pub document_type: String,
    pub education_levels: Vec<Node>,
    pub states_mentioned: Vec<Node>,
    pub entities: Vec<Node>,
    pub statistics: Vec<Node>,
    pub tables: Vec<Node>,
    pub policies: Vec<Node>,
}

/// 结果渲染服务
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultRenderer;

impl ResultRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 渲染全部区域
    pub fn render(&self, data: &AnalysisResult) -> RenderedResult {
        RenderedResult {
            summary: non_empty(&data.summary)
                .unwrap_or(placeholders::NO_SUMMARY)
                .to_string(),
            document_type: non_empty(&data.document_type)
                .unwrap_or(placeholders::NOT_AVAILABLE)
                .to_string(),
            education_levels: self.tags(&data.education_levels, placeholders::NO_EDUCATION_LEVELS),
            states_mentioned: self.tags(&data.states_mentioned, placeholders::NO_STATES),
            entities: self.cards(&data.named_entities, entity_card, placeholders::NO_ENTITIES),
            statistics: self.cards(&data.key_statistics, statistic_card, placeholders::NO_STATISTICS),
            tables: self.tables(&data.tables),
            policies: self.cards(&data.policies_schemes, policy_card, placeholders::NO_POLICIES),
        }
    }

    fn tags(&self, labels: &[String], empty: &str) -> Vec<Node> {
        if labels.is_empty() {
            return vec![placeholder("span", empty)];
        }
        labels
            .iter()
            .map(|label| Element::new("span").with_class("tag").with_text(label).into())
            .collect()
    }

    fn cards<T>(&self, items: &[T], card: fn(&T) -> Node, empty: &str) -> Vec<Node> {
        if items.is_empty() {
            return vec![placeholder("p", empty)];
        }
        items.iter().map(card).collect()
    }

    fn tables(&self, tables: &[TableEntry]) -> Vec<Node> {
        if tables.is_empty() {
            return vec![placeholder("p", placeholders::NO_TABLES)];
        }
        tables
            .iter()
            .enumerate()
            .map(|(index, table)| render_table(index, table))
            .collect()
    }
}

fn placeholder(tag: &'static str, text: &str) -> Node {
    Element::new(tag)
        .with_class(PLACEHOLDER_CLASS)
        .with_text(text)
        .into()
}

fn or_na(value: &Option<String>) -> &str {
    non_empty(value).unwrap_or(placeholders::NOT_AVAILABLE)
}

fn entity_card(entity: &NamedEntity) -> Node {
    Element::new("div")
        .with_class("entity-card")
        .with_child(Element::new("div").with_class("entity-text").with_text(or_na(&entity.text)))
        .with_child(Element::new("div").with_class("entity-label").with_text(or_na(&entity.label)))
        .into()
}

fn statistic_card(stat: &KeyStatistic) -> Node {
    Element::new("div")
        .with_class("stat-card")
        .with_child(Element::new("div").with_class("stat-metric").with_text(or_na(&stat.metric)))
        .with_child(Element::new("div").with_class("stat-value").with_text(or_na(&stat.value)))
        .with_child(
            Element::new("div")
                .with_class("stat-context")
                .with_text(non_empty(&stat.context).unwrap_or_default()),
        )
        .into()
}

fn policy_card(policy: &PolicyScheme) -> Node {
    Element::new("div")
        .with_class("policy-card")
        .with_child(Element::new("div").with_class("policy-name").with_text(or_na(&policy.name)))
        .with_child(
            Element::new("div")
                .with_class("policy-description")
                .with_text(non_empty(&policy.description).unwrap_or(placeholders::NO_DESCRIPTION)),
        )
        .with_child(
            Element::new("div")
                .with_class("policy-target")
                .with_text(format!("Target: {}", or_na(&policy.target_audience))),
        )
        .into()
}

/// 单个表格：标题 + 表格容器
///
/// 表头取第一行的键；之后的行缺少某个键时输出空单元格。
fn render_table(index: usize, table: &TableEntry) -> Node {
    let title = non_empty(&table.title)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Table {}", index + 1));

    let headers = table.headers();
    let body: Node = match table.rows() {
        Some(rows) if !headers.is_empty() => {
            let head_row = Element::new("tr").with_children(
                headers
                    .iter()
                    .map(|header| Element::new("th").with_text(*header)),
            );
            let body_rows = rows.iter().map(|row| {
                Element::new("tr").with_children(
                    headers
                        .iter()
                        .map(|header| Element::new("td").with_text(cell_text(row, header))),
                )
            });
            Element::new("table")
                .with_child(Element::new("thead").with_child(head_row))
                .with_child(Element::new("tbody").with_children(body_rows))
                .into()
        }
        _ => placeholder("p", placeholders::NO_TABLE_DATA),
    };

    Element::new("div")
        .with_class("table-block")
        .with_child(Element::new("h4").with_text(title))
        .with_child(Element::new("div").with_class("table-container").with_child(body))
        .into()
}

fn cell_text(row: &JsonValue, header: &str) -> String {
    row.get(header).map(value_text).unwrap_or_default()
}
