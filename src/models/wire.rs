//! 分析服务的请求 / 响应结构

use serde::{Deserialize, Serialize};
use std::fmt;

use super::analysis::AnalysisResult;

/// `/upload` 成功时的响应
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `/process` 的请求体
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest<'a> {
    pub session_id: &'a str,
}

/// `/process` 成功时的响应；`data` 缺失或为 `null` 时按空结果处理
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub data: Option<AnalysisResult>,
}

impl ProcessResponse {
    pub fn into_result(self) -> AnalysisResult {
        self.data.unwrap_or_default()
    }
}

/// 服务的业务结果：正常返回数据，或者响应体里带了 `error` 字段
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply<T> {
    Accepted(T),
    Rejected(String),
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Csv,
    Pdf,
}

impl ExportKind {
    /// 下载地址中的路径段
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Pdf => "pdf",
        }
    }

    /// 保存到本地时的扩展名
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
