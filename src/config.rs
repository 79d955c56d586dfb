use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, FileError};

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 分析服务地址
    pub analysis_base_url: String,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 页面地址（浏览器模式下打开）
    pub target_url: String,
    /// 无头模式使用的浏览器可执行文件
    pub browser_executable: Option<String>,
    /// 处理完成后进度条保留的时间（毫秒）
    pub render_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 导出文件存放目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_base_url: "http://localhost:5000".to_string(),
            browser_debug_port: 9222,
            target_url: "http://localhost:5000/".to_string(),
            browser_executable: None,
            render_delay_ms: 500,
            request_timeout_secs: 300,
            output_dir: "outputs".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件，所有字段均可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    analysis_base_url: Option<String>,
    browser_debug_port: Option<u16>,
    target_url: Option<String>,
    browser_executable: Option<String>,
    render_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    output_dir: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 默认配置叠加环境变量
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// 读取 TOML 配置文件，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            analysis_base_url: file.analysis_base_url.unwrap_or(default.analysis_base_url),
            browser_debug_port: file.browser_debug_port.unwrap_or(default.browser_debug_port),
            target_url: file.target_url.unwrap_or(default.target_url),
            browser_executable: file.browser_executable.or(default.browser_executable),
            render_delay_ms: file.render_delay_ms.unwrap_or(default.render_delay_ms),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(default.request_timeout_secs),
            output_dir: file.output_dir.unwrap_or(default.output_dir),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    /// 用环境变量覆盖当前配置；无法解析的值保持原样
    pub fn apply_env(self) -> Self {
        Self::apply_vars(self, |name| std::env::var(name).ok())
    }

    fn apply_vars(self, var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            analysis_base_url: var("ANALYSIS_BASE_URL").unwrap_or(self.analysis_base_url),
            browser_debug_port: var("BROWSER_DEBUG_PORT").and_then(|v| v.parse().ok()).unwrap_or(self.browser_debug_port),
            target_url: var("TARGET_URL").unwrap_or(self.target_url),
            browser_executable: var("BROWSER_EXECUTABLE").or(self.browser_executable),
            render_delay_ms: var("RENDER_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(self.render_delay_ms),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            output_dir: var("OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging: var("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_partial_keys_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            analysis_base_url = "http://analysis.internal:8080"
            render_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis_base_url, "http://analysis.internal:8080");
        assert_eq!(config.render_delay_ms, 0);
        assert_eq!(config.output_dir, Config::default().output_dir);
        assert_eq!(config.browser_debug_port, 9222);
    }

    #[test]
    fn test_env_overrides_and_ignores_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("OUTPUT_DIR", "exports"),
            ("BROWSER_DEBUG_PORT", "not-a-port"),
            ("VERBOSE_LOGGING", "true"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.output_dir, "exports");
        assert_eq!(config.browser_debug_port, 9222);
        assert!(config.verbose_logging);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = Config::from_toml_str("render_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::File(FileError::TomlParseFailed { .. })));
    }
}
