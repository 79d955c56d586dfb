//! 分析结果数据结构
//!
//! 所有字段都可能缺失或为 `null`，渲染时按各自的占位文本处理。

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use super::lenient;

/// 文档分析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub document_type: Option<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub education_levels: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub states_mentioned: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub named_entities: Vec<NamedEntity>,
    #[serde(deserialize_with = "lenient::list")]
    pub key_statistics: Vec<KeyStatistic>,
    #[serde(deserialize_with = "lenient::list")]
    pub tables: Vec<TableEntry>,
    #[serde(deserialize_with = "lenient::list")]
    pub policies_schemes: Vec<PolicyScheme>,

    // 页面不展示，本地导出和命令行摘要使用
    #[serde(deserialize_with = "lenient::text_list")]
    pub organizations: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub key_dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_object")]
    pub budget_financials: Option<BudgetFinancials>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text_groups")]
    pub entities_by_type: Option<BTreeMap<String, Vec<String>>>,
}

/// 命名实体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedEntity {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub label: Option<String>,
}

impl NamedEntity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            label: Some(label.into()),
        }
    }
}

/// 关键统计数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStatistic {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub metric: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub value: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub context: Option<String>,
}

/// 提取出的表格
///
/// `data` 保留原始 JSON：正常情况下是行对象数组，但服务有时返回字符串。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableEntry {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub title: Option<String>,
    pub data: JsonValue,
}

impl TableEntry {
    /// 非空的行数组；`data` 不是数组或为空时返回 `None`
    pub fn rows(&self) -> Option<&[JsonValue]> {
        self.data
            .as_array()
            .filter(|rows| !rows.is_empty())
            .map(Vec::as_slice)
    }

    /// 以第一行的键（按出现顺序）作为表头
    pub fn headers(&self) -> Vec<&str> {
        self.rows()
            .and_then(|rows| rows.first())
            .and_then(JsonValue::as_object)
            .map(|first| first.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// 政策 / 项目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyScheme {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub target_audience: Option<String>,
}

/// 预算信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetFinancials {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub total_budget: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub breakdown: Option<String>,
}

/// 空字符串与缺失同等对待
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_missing_fields_default() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "summary": null,
            "education_levels": null,
            "named_entities": null,
            "tables": null
        }))
        .unwrap();

        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn test_statistic_value_may_be_numeric() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "key_statistics": [
                { "metric": "GER", "value": 27.1, "context": "Higher education" }
            ]
        }))
        .unwrap();

        assert_eq!(result.key_statistics[0].value.as_deref(), Some("27.1"));
    }

    #[test]
    fn test_table_headers_keep_first_row_order() {
        let table: TableEntry = serde_json::from_value(json!({
            "title": "Enrollment",
            "data": [
                { "State": "Kerala", "Year": "2021", "Rate": "96%" },
                { "Year": "2022", "State": "Goa" }
            ]
        }))
        .unwrap();

        assert_eq!(table.headers(), vec!["State", "Year", "Rate"]);
        assert_eq!(table.rows().map(<[JsonValue]>::len), Some(2));
    }

    #[test]
    fn test_table_with_string_data_has_no_rows() {
        let table: TableEntry = serde_json::from_value(json!({
            "title": "Chart",
            "data": "see figure 3"
        }))
        .unwrap();

        assert!(table.rows().is_none());
        assert!(table.headers().is_empty());
    }

    #[test]
    fn test_supplementary_fields() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "organizations": ["NCERT"],
            "key_dates": ["2020-07-29"],
            "budget_financials": { "total_budget": 99300, "currency": "INR", "breakdown": null },
            "entities_by_type": { "organizations": ["NCERT"] }
        }))
        .unwrap();

        assert_eq!(result.organizations, vec!["NCERT"]);
        let budget = result.budget_financials.unwrap();
        assert_eq!(budget.total_budget.as_deref(), Some("99300"));
        assert_eq!(budget.breakdown, None);
        assert_eq!(
            result.entities_by_type.unwrap().get("organizations"),
            Some(&vec!["NCERT".to_string()])
        );
    }

    #[test]
    fn test_unexpected_shapes_do_not_fail_parsing() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "budget_financials": "N/A",
            "entities_by_type": ["ORG"],
            "policies_schemes": { "name": "Samagra Shiksha" }
        }))
        .unwrap();

        assert!(result.budget_financials.is_none());
        assert!(result.entities_by_type.is_none());
        assert!(result.policies_schemes.is_empty());
    }

    #[test]
    fn test_non_empty_treats_blank_as_missing() {
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("x".to_string())), Some("x"));
        assert_eq!(non_empty(&None), None);
    }
}
