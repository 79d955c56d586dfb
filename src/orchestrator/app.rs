//! 页面事件循环 - 编排层
//!
//! ## 职责
//!
//! 1. **事件接收**：页面交互以 `UiEvent` 的形式进入同一个通道
//! 2. **串行执行**：一次只执行一个动作，前一个动作完成后才处理下一个
//! 3. **错误隔离**：单个动作失败只记录日志，不会结束事件循环
//! 4. **全局统计**：汇总本次运行的动作结果
//!
//! 串行执行保证了"处理中"期间到达的重复点击只会在处理结束后被看到，
//! 此时处理按钮已禁用，重复请求会被忽略。

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::clients::AnalysisService;
use crate::error::AppResult;
use crate::models::{ExportKind, SelectedFile};
use crate::utils::logging;
use crate::view::DocumentView;
use crate::workflow::{ActionOutcome, SessionController};

/// 事件通道容量
const EVENT_QUEUE_SIZE: usize = 32;

/// 页面交互事件
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// 文件选择框变化，`None` 表示取消选择
    FileSelected(Option<SelectedFile>),
    /// 拖入文件
    FilesDropped(Vec<SelectedFile>),
    /// 点击移除文件
    RemoveFile,
    /// 点击处理按钮
    ProcessDocument,
    /// 点击标签页按钮
    SwitchTab { name: String, control_id: String },
    /// 点击导出按钮
    Download(ExportKind),
    /// 结束事件循环
    Shutdown,
}

/// 应用主结构
pub struct App<S, V> {
    controller: SessionController<S, V>,
    events: mpsc::Receiver<UiEvent>,
    stats: SessionStats,
}

impl<S, V> App<S, V>
where
    S: AnalysisService,
    V: DocumentView,
{
    /// 创建应用，返回用于投递事件的发送端
    pub fn new(controller: SessionController<S, V>) -> (Self, mpsc::Sender<UiEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);
        let app = Self {
            controller,
            events: rx,
            stats: SessionStats::default(),
        };
        (app, tx)
    }

    /// 运行事件循环，直到收到 `Shutdown` 或所有发送端关闭
    pub async fn run(mut self) -> Result<(SessionController<S, V>, SessionStats)> {
        info!("🚀 事件循环启动");

        while let Some(event) = self.events.recv().await {
            if matches!(event, UiEvent::Shutdown) {
                debug!("收到结束事件");
                break;
            }
            self.dispatch(event).await;
        }

        logging::print_final_stats(&self.stats);
        Ok((self.controller, self.stats))
    }

    /// 执行单个事件并记录结果
    async fn dispatch(&mut self, event: UiEvent) {
        let label = event_label(&event);
        debug!("处理事件: {}", label);

        let result: AppResult<ActionOutcome> = match event {
            UiEvent::FileSelected(file) => self.controller.select_file(file).await,
            UiEvent::FilesDropped(files) => self.controller.drop_files(files).await,
            UiEvent::RemoveFile => self
                .controller
                .remove_file()
                .await
                .map(|_| ActionOutcome::Completed),
            UiEvent::ProcessDocument => self.controller.process_document().await,
            UiEvent::SwitchTab { name, control_id } => self
                .controller
                .switch_tab(&name, &control_id)
                .await
                .map(|_| ActionOutcome::Completed),
            UiEvent::Download(kind) => self.controller.download(kind).await,
            UiEvent::Shutdown => Ok(ActionOutcome::Ignored),
        };

        match result {
            Ok(outcome) => self.stats.record(outcome),
            Err(e) => {
                error!("❌ 事件 {} 执行失败: {}", label, e);
                self.stats.record(ActionOutcome::Failed);
            }
        }
    }
}

fn event_label(event: &UiEvent) -> &'static str {
    match event {
        UiEvent::FileSelected(_) => "选择文件",
        UiEvent::FilesDropped(_) => "拖入文件",
        UiEvent::RemoveFile => "移除文件",
        UiEvent::ProcessDocument => "处理文档",
        UiEvent::SwitchTab { .. } => "切换标签页",
        UiEvent::Download(_) => "导出",
        UiEvent::Shutdown => "结束",
    }
}

/// 动作统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub handled: usize,
    pub completed: usize,
    pub rejected: usize,
    pub failed: usize,
    pub ignored: usize,
}

impl SessionStats {
    fn record(&mut self, outcome: ActionOutcome) {
        self.handled += 1;
        match outcome {
            ActionOutcome::Completed => self.completed += 1,
            ActionOutcome::Rejected => self.rejected += 1,
            ActionOutcome::Failed => self.failed += 1,
            ActionOutcome::Ignored => self.ignored += 1,
        }
    }
}
