//! 本地导出服务 - 业务能力层
//!
//! 只负责"把当前结果写成 CSV"能力，不关心流程

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::analysis::non_empty;
use crate::models::lenient::value_text;
use crate::models::AnalysisResult;

/// 本地导出服务
///
/// 输出按区域分段的 CSV：摘要、实体、每个表格、关键统计。
pub struct ExportWriter {
    path: PathBuf,
}

impl ExportWriter {
    /// 使用指定文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入 CSV 文件，父目录不存在时自动创建
    pub async fn write(&self, data: &AnalysisResult) -> AppResult<()> {
        let content = render_csv(data);
        debug!(
            "写入本地导出: {} ({} 字节)",
            self.path.display(),
            content.len()
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;
        Ok(())
    }
}

/// 生成分段 CSV 文本
pub fn render_csv(data: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str("=== SUMMARY ===\n");
    out.push_str(non_empty(&data.summary).unwrap_or("N/A"));
    out.push_str("\n\n");

    if !data.named_entities.is_empty() {
        out.push_str("=== NAMED ENTITIES ===\n");
        push_row(&mut out, ["text", "label"]);
        for entity in &data.named_entities {
            push_row(
                &mut out,
                [
                    entity.text.as_deref().unwrap_or_default(),
                    entity.label.as_deref().unwrap_or_default(),
                ],
            );
        }
        out.push('\n');
    }

    for (index, table) in data.tables.iter().enumerate() {
        let title = non_empty(&table.title)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Table {}", index + 1));
        out.push_str(&format!("=== {} ===\n", title));

        if let Some(rows) = table.rows() {
            let columns = union_columns(rows);
            push_row(&mut out, columns.iter().map(String::as_str));
            for row in rows {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|column| row.get(column).map(value_text).unwrap_or_default())
                    .collect();
                push_row(&mut out, cells.iter().map(String::as_str));
            }
        }
        out.push('\n');
    }

    if !data.key_statistics.is_empty() {
        out.push_str("=== KEY STATISTICS ===\n");
        push_row(&mut out, ["metric", "value", "context"]);
        for stat in &data.key_statistics {
            push_row(
                &mut out,
                [
                    stat.metric.as_deref().unwrap_or_default(),
                    stat.value.as_deref().unwrap_or_default(),
                    stat.context.as_deref().unwrap_or_default(),
                ],
            );
        }
        out.push('\n');
    }

    out
}

/// 所有行的列名并集，按首次出现的顺序
fn union_columns(rows: &[JsonValue]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows.iter().filter_map(JsonValue::as_object) {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let line: Vec<String> = fields.into_iter().map(quote_field).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// 含逗号、引号或换行的字段加双引号，内部引号加倍
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyStatistic, NamedEntity, TableEntry};
    use serde_json::json;

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_sections() {
        let data = AnalysisResult {
            summary: Some("Enrollment rose.".to_string()),
            named_entities: vec![NamedEntity::new("Ministry of Education, GoI", "ORG")],
            tables: vec![TableEntry {
                title: None,
                data: json!([
                    { "State": "Kerala", "Rate": "96%" },
                    { "State": "Goa", "Year": 2021 }
                ]),
            }],
            key_statistics: vec![KeyStatistic {
                metric: Some("GER".to_string()),
                value: Some("27.1".to_string()),
                context: None,
            }],
            ..Default::default()
        };

        let csv = render_csv(&data);
        assert_eq!(
            csv,
            "=== SUMMARY ===\nEnrollment rose.\n\n\
             === NAMED ENTITIES ===\ntext,label\n\"Ministry of Education, GoI\",ORG\n\n\
             === Table 1 ===\nState,Rate,Year\nKerala,96%,\nGoa,,2021\n\n\
             === KEY STATISTICS ===\nmetric,value,context\nGER,27.1,\n\n"
        );
    }

    #[test]
    fn test_render_empty_result() {
        assert_eq!(render_csv(&AnalysisResult::default()), "=== SUMMARY ===\nN/A\n\n");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::with_path(dir.path().join("nested").join("result.csv"));

        writer.write(&AnalysisResult::default()).await.unwrap();
        let written = tokio::fs::read_to_string(writer.path()).await.unwrap();
        assert!(written.starts_with("=== SUMMARY ==="));
    }
}
