//! 会话流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 选择 / 拖入文件 → 校验类型 → 上传 → 持有会话
//! 2. 处理 → 进度条 → 保存结果 → 渲染
//! 3. 导出（跳转到下载地址）
//!
//! 控制器以 `&mut self` 执行每个动作，同一时间只会有一个动作在进行。

use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::clients::AnalysisService;
use crate::config::Config;
use crate::error::{AppResult, WorkflowError};
use crate::models::{AnalysisResult, ExportKind, SelectedFile, ServiceReply};
use crate::services::{ExportWriter, ResultRenderer};
use crate::view::{ids, tab_pane_id, DocumentView};
use crate::workflow::session_ctx::SessionCtx;

/// 用户提示
pub mod notices {
    pub const SELECT_PDF_ONLY: &str = "Please select a PDF file";
    pub const DROP_PDF_ONLY: &str = "Please drop a PDF file";
    pub const UPLOAD_FAILED: &str = "Error uploading file";
    pub const UPLOAD_FIRST: &str = "Please upload a file first";
    pub const PROCESS_FAILED: &str = "Error processing document";
    pub const NOTHING_TO_DOWNLOAD: &str = "No data to download";
}

/// 进度条文本
pub mod progress {
    pub const STARTED: (u8, &str) = (10, "Uploading file...");
    pub const COMPLETE: (u8, &str) = (100, "Processing complete!");
}

/// 动作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 动作完成
    Completed,
    /// 校验失败或服务返回了错误信息
    Rejected,
    /// 网络失败或响应无法解析
    Failed,
    /// 没有可执行的操作（未选择文件、按钮已禁用）
    Ignored,
}

/// 会话流程控制器
///
/// - 持有当前会话和最近一次的分析结果
/// - 决定何时上传、何时处理、何时渲染
/// - 通过 `AnalysisService` 访问服务，通过 `DocumentView` 更新页面
pub struct SessionController<S, V> {
    service: S,
    view: V,
    renderer: ResultRenderer,
    session: Option<SessionCtx>,
    current_data: Option<AnalysisResult>,
    process_enabled: bool,
    active_tab: Option<String>,
    render_delay: Duration,
}

impl<S, V> SessionController<S, V>
where
    S: AnalysisService,
    V: DocumentView,
{
    /// 创建新的会话流程
    pub fn new(service: S, view: V, config: &Config) -> Self {
        Self {
            service,
            view,
            renderer: ResultRenderer::new(),
            session: None,
            current_data: None,
            process_enabled: false,
            active_tab: None,
            render_delay: Duration::from_millis(config.render_delay_ms),
        }
    }

    pub fn session(&self) -> Option<&SessionCtx> {
        self.session.as_ref()
    }

    pub fn current_data(&self) -> Option<&AnalysisResult> {
        self.current_data.as_ref()
    }

    pub fn is_process_enabled(&self) -> bool {
        self.process_enabled
    }

    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    // ========== 文件选择 ==========

    /// 文件选择框变化；`None` 表示用户取消了选择
    pub async fn select_file(&mut self, file: Option<SelectedFile>) -> AppResult<ActionOutcome> {
        let Some(file) = file else {
            debug!("未选择文件");
            return Ok(ActionOutcome::Ignored);
        };

        if !file.is_pdf() {
            warn!("⚠️ 拒绝非 PDF 文件: {} ({})", file.name, file.media_type);
            self.view.notify(notices::SELECT_PDF_ONLY).await?;
            return Ok(ActionOutcome::Rejected);
        }

        self.upload(file).await
    }

    /// 拖入文件，只看第一个
    pub async fn drop_files(&mut self, files: Vec<SelectedFile>) -> AppResult<ActionOutcome> {
        match files.into_iter().next() {
            Some(file) if file.is_pdf() => self.upload(file).await,
            other => {
                warn!(
                    "⚠️ 拖入的不是 PDF 文件: {:?}",
                    other.map(|f| f.media_type)
                );
                self.view.notify(notices::DROP_PDF_ONLY).await?;
                Ok(ActionOutcome::Rejected)
            }
        }
    }

    async fn upload(&mut self, file: SelectedFile) -> AppResult<ActionOutcome> {
        info!("📤 正在上传文件: {} ({} 字节)", file.name, file.bytes.len());

        match self.service.upload(&file).await {
            Ok(ServiceReply::Accepted(response)) => {
                let filename = response
                    .filename
                    .filter(|name| !name.is_empty())
                    .unwrap_or(file.name);
                let ctx = SessionCtx::new(response.session_id, filename);
                info!("✓ 上传成功 {}", ctx);
                self.adopt_session(ctx).await?;
                Ok(ActionOutcome::Completed)
            }
            Ok(ServiceReply::Rejected(message)) => {
                warn!("⚠️ 服务拒绝上传: {}", message);
                self.view.notify(&message).await?;
                Ok(ActionOutcome::Rejected)
            }
            Err(e) => {
                error!("❌ 上传失败: {}", e);
                self.view.notify(notices::UPLOAD_FAILED).await?;
                Ok(ActionOutcome::Failed)
            }
        }
    }

    /// 新会话替换旧会话，旧会话的结果不再显示
    async fn adopt_session(&mut self, ctx: SessionCtx) -> AppResult<()> {
        let filename = ctx.filename.clone();
        self.session = Some(ctx);
        self.process_enabled = true;

        self.hide_results().await?;
        self.view.set_text(ids::FILE_NAME, &filename).await?;
        self.view.set_hidden(ids::FILE_INFO, false).await?;
        self.view.set_hidden(ids::UPLOAD_AREA, true).await?;
        self.view.set_disabled(ids::PROCESS_BTN, false).await?;
        Ok(())
    }

    /// 移除文件，回到初始状态
    pub async fn remove_file(&mut self) -> AppResult<()> {
        if let Some(ctx) = self.session.take() {
            info!("🗑️ 移除文件 {}", ctx);
        }
        self.process_enabled = false;

        self.view.clear_file_input().await?;
        self.view.set_hidden(ids::FILE_INFO, true).await?;
        self.view.set_hidden(ids::UPLOAD_AREA, false).await?;
        self.view.set_disabled(ids::PROCESS_BTN, true).await?;
        self.hide_results().await
    }

    // ========== 处理 ==========

    /// 处理当前会话的文件并渲染结果
    pub async fn process_document(&mut self) -> AppResult<ActionOutcome> {
        let Some(ctx) = self.session.clone() else {
            warn!("⚠️ 尚未上传文件");
            self.view.notify(notices::UPLOAD_FIRST).await?;
            return Ok(ActionOutcome::Rejected);
        };

        if !self.process_enabled {
            debug!("处理按钮已禁用，忽略 {}", ctx);
            return Ok(ActionOutcome::Ignored);
        }

        self.process_enabled = false;
        self.view.set_hidden(ids::PROGRESS_SECTION, false).await?;
        self.view.set_disabled(ids::PROCESS_BTN, true).await?;
        self.update_progress(progress::STARTED).await?;

        info!("🔍 正在处理 {}", ctx);

        match self.service.process(&ctx.session_id).await {
            Ok(ServiceReply::Accepted(response)) => {
                self.update_progress(progress::COMPLETE).await?;
                let data = response.into_result();
                info!("✓ 处理完成 {}", ctx);
                self.current_data = Some(data.clone());

                // 让完成状态的进度条停留片刻
                sleep(self.render_delay).await;

                self.hide_progress().await?;
                self.render_result(&data).await?;
                Ok(ActionOutcome::Completed)
            }
            Ok(ServiceReply::Rejected(message)) => {
                warn!("⚠️ 服务处理失败 {}: {}", ctx, message);
                self.view.notify(&format!("Error: {}", message)).await?;
                self.reset_processing().await?;
                Ok(ActionOutcome::Rejected)
            }
            Err(e) => {
                error!("❌ 处理请求失败 {}: {}", ctx, e);
                self.view.notify(notices::PROCESS_FAILED).await?;
                self.reset_processing().await?;
                Ok(ActionOutcome::Failed)
            }
        }
    }

    async fn update_progress(&mut self, (percent, label): (u8, &str)) -> AppResult<()> {
        self.view.set_width_percent(ids::PROGRESS_FILL, percent).await?;
        self.view.set_text(ids::PROGRESS_TEXT, label).await
    }

    async fn hide_progress(&mut self) -> AppResult<()> {
        self.view.set_hidden(ids::PROGRESS_SECTION, true).await
    }

    /// 失败后隐藏进度条并允许重试
    async fn reset_processing(&mut self) -> AppResult<()> {
        self.hide_progress().await?;
        self.process_enabled = true;
        self.view.set_disabled(ids::PROCESS_BTN, false).await
    }

    // ========== 渲染 ==========

    /// 渲染分析结果；每个区域先清空再填充，可以重复调用
    pub async fn render_result(&mut self, data: &AnalysisResult) -> AppResult<()> {
        let rendered = self.renderer.render(data);
        debug!(
            "渲染结果: {} 个实体, {} 个表格",
            data.named_entities.len(),
            data.tables.len()
        );

        self.view.set_hidden(ids::RESULTS_SECTION, false).await?;
        self.view.set_text(ids::SUMMARY_TEXT, &rendered.summary).await?;
        self.view.set_text(ids::DOC_TYPE, &rendered.document_type).await?;
        self.view
            .replace_children(ids::EDUCATION_LEVELS, rendered.education_levels)
            .await?;
        self.view
            .replace_children(ids::STATES_MENTIONED, rendered.states_mentioned)
            .await?;
        self.view
            .replace_children(ids::ENTITIES_LIST, rendered.entities)
            .await?;
        self.view
            .replace_children(ids::STATISTICS_LIST, rendered.statistics)
            .await?;
        self.view
            .replace_children(ids::TABLES_LIST, rendered.tables)
            .await?;
        self.view
            .replace_children(ids::POLICIES_LIST, rendered.policies)
            .await?;
        self.view.scroll_into_view(ids::RESULTS_SECTION).await
    }

    async fn hide_results(&mut self) -> AppResult<()> {
        self.current_data = None;
        self.view.set_hidden(ids::RESULTS_SECTION, true).await
    }

    // ========== 标签页 / 导出 ==========

    /// 切换标签页，`control_id` 是触发切换的按钮
    pub async fn switch_tab(&mut self, name: &str, control_id: &str) -> AppResult<()> {
        self.view.activate_tab(&tab_pane_id(name), control_id).await?;
        self.active_tab = Some(name.to_string());
        Ok(())
    }

    /// 跳转到导出地址，由浏览器完成下载
    pub async fn download(&mut self, kind: ExportKind) -> AppResult<ActionOutcome> {
        let Some(ctx) = self.session.as_ref() else {
            warn!("⚠️ 没有可导出的会话");
            self.view.notify(notices::NOTHING_TO_DOWNLOAD).await?;
            return Ok(ActionOutcome::Rejected);
        };

        let url = self.service.export_url(&ctx.session_id, kind)?;
        info!("📥 导出 {} {}", kind, ctx);
        self.view.navigate(&url).await?;
        Ok(ActionOutcome::Completed)
    }

    /// 把当前结果写成本地 CSV
    pub async fn export_local_csv(&self, path: &Path) -> AppResult<()> {
        let data = self
            .current_data
            .as_ref()
            .ok_or(WorkflowError::NoResultData)?;
        ExportWriter::with_path(path).write(data).await?;
        info!("💾 已写入本地导出: {}", path.display());
        Ok(())
    }
}
