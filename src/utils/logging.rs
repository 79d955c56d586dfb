/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{non_empty, AnalysisResult};
use crate::orchestrator::SessionStats;
use crate::services::entity_groups;

/// 摘要在日志中最多显示的字符数
const SUMMARY_PREVIEW_CHARS: usize = 80;

/// 初始化日志输出
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定默认级别。重复调用不会报错。
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 分析服务: {}", config.analysis_base_url);
    info!("📂 导出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录分析结果摘要
pub fn log_session_summary(data: &AnalysisResult) {
    info!("\n{}", "─".repeat(60));
    info!("📄 文档类型: {}", non_empty(&data.document_type).unwrap_or("N/A"));
    if let Some(summary) = non_empty(&data.summary) {
        info!("📝 摘要: {}", truncate_text(summary, SUMMARY_PREVIEW_CHARS));
    }
    info!(
        "📊 统计 {} 项, 表格 {} 个, 政策 {} 项",
        data.key_statistics.len(),
        data.tables.len(),
        data.policies_schemes.len()
    );

    let groups = entity_groups(data);
    let counts = groups
        .counts()
        .iter()
        .map(|(name, n)| format!("{} {}", name, n))
        .collect::<Vec<_>>()
        .join(", ");
    info!("🏷️ 实体 {} 个 ({})", data.named_entities.len(), counts);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &SessionStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部事件处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", stats.completed, stats.handled);
    info!("⚠️ 拒绝: {}", stats.rejected);
    info!("❌ 失败: {}", stats.failed);
    info!("⏭️ 忽略: {}", stats.ignored);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("教育部年度报告", 3), "教育部...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
