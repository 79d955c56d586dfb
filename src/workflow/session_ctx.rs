//! 会话上下文
//!
//! 封装"当前正在分析哪个文件"这一信息

use std::fmt::Display;

/// 会话上下文
///
/// 由上传创建，供处理和导出使用，移除文件时丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCtx {
    /// 服务端分配的会话ID
    pub session_id: String,

    /// 文件名
    pub filename: String,
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new(session_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            filename: filename.into(),
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 #{} 文件 {}]", self.session_id, self.filename)
    }
}
