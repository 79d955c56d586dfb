//! 用户选择的文件

use std::path::Path;

use crate::error::{AppError, AppResult};

/// PDF 的媒体类型
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// 用户选择或拖入的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// 原始文件名
    pub name: String,
    /// 声明的媒体类型
    pub media_type: String,
    /// 文件内容
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件，媒体类型按扩展名推断
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for(path);
        Ok(Self::new(name, media_type, bytes))
    }

    /// 声明的类型是否恰好是 PDF
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_by_extension() {
        assert_eq!(media_type_for(Path::new("report.pdf")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("REPORT.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(media_type_for(Path::new("table.csv")), "text/csv");
        assert_eq!(media_type_for(Path::new("scan.gif")), "image/gif");
        assert_eq!(media_type_for(Path::new("archive")), "application/octet-stream");
    }

    #[test]
    fn test_is_pdf_is_exact() {
        assert!(SelectedFile::new("a.pdf", "application/pdf", vec![]).is_pdf());
        assert!(!SelectedFile::new("a.pdf", "application/x-pdf", vec![]).is_pdf());
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = SelectedFile::from_path(Path::new("/nonexistent/report.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::File(_)));
    }
}
