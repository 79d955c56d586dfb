use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use doc_insight_client::error::WorkflowError;
use doc_insight_client::utils::logging;
use doc_insight_client::{
    connect_to_browser_and_page, launch_headless_browser, AnalysisClient, App, Config,
    DocumentView, ExportKind, JsExecutor, MemoryView, PageView, SelectedFile, SessionController,
    UiEvent,
};

/// 上传 PDF 到分析服务并查看结果
#[derive(Debug, Parser)]
#[command(name = "doc-insight", version, about)]
struct Cli {
    /// 要分析的 PDF 文件
    file: PathBuf,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 分析服务地址，覆盖配置文件和环境变量
    #[arg(long)]
    base_url: Option<String>,

    /// 连接调试端口上的浏览器，在真实页面中展示结果
    #[arg(long, conflicts_with = "headless")]
    browser: bool,

    /// 启动无头浏览器展示结果
    #[arg(long)]
    headless: bool,

    /// 处理完成后下载的导出格式，可重复
    #[arg(long = "export", value_enum)]
    exports: Vec<ExportArg>,

    /// 把结果写成本地 CSV
    #[arg(long)]
    local_csv: Option<PathBuf>,

    /// 把渲染后的页面写成 HTML（仅内存页面模式）
    #[arg(long)]
    html: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportArg {
    Csv,
    Pdf,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => ExportKind::Csv,
            ExportArg::Pdf => ExportKind::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：文件 → 环境变量 → 命令行参数
    let config = load_config(&cli)?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let client = AnalysisClient::new(&config).context("创建分析服务客户端失败")?;
    let file = SelectedFile::from_path(&cli.file)
        .await
        .with_context(|| format!("读取文件失败: {}", cli.file.display()))?;

    if cli.browser || cli.headless {
        let (_browser, page) = if cli.browser {
            connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url), None)
                .await?
        } else {
            launch_headless_browser(&config.target_url, config.browser_executable.as_deref())
                .await?
        };
        let view = PageView::new(JsExecutor::new(page));
        let controller = run_session(client, view, file, &config).await?;
        finish_session(&controller, &cli, &config).await
    } else {
        let view = MemoryView::with_default_layout();
        let controller = run_session(client, view, file, &config).await?;

        if let Some(path) = &cli.html {
            let html = controller.view().to_html_document(&cli.file.display().to_string());
            tokio::fs::write(path, html)
                .await
                .with_context(|| format!("写入 HTML 失败: {}", path.display()))?;
            info!("🖼️ 页面快照已保存至: {}", path.display());
        }
        finish_session(&controller, &cli, &config).await
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
        None => Config::default(),
    };

    let mut config = base.apply_env();
    if let Some(url) = &cli.base_url {
        config.analysis_base_url = url.clone();
    }
    if cli.verbose {
        config.verbose_logging = true;
    }
    Ok(config)
}

/// 依次投递"选择文件 → 处理"，等待事件循环结束
async fn run_session<V: DocumentView>(
    client: AnalysisClient,
    view: V,
    file: SelectedFile,
    config: &Config,
) -> Result<SessionController<AnalysisClient, V>> {
    let controller = SessionController::new(client, view, config);
    let (app, tx) = App::new(controller);

    let script = vec![
        UiEvent::FileSelected(Some(file)),
        UiEvent::ProcessDocument,
        UiEvent::Shutdown,
    ];
    let feeder = tokio::spawn(async move {
        for event in script {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let (controller, _stats) = app.run().await?;
    feeder.await.context("事件投递任务异常结束")?;
    Ok(controller)
}

/// 输出摘要并写出导出文件
async fn finish_session<V: DocumentView>(
    controller: &SessionController<AnalysisClient, V>,
    cli: &Cli,
    config: &Config,
) -> Result<()> {
    let Some(data) = controller.current_data() else {
        warn!("⚠️ 没有得到分析结果");
        bail!("文档处理失败: {}", cli.file.display());
    };
    logging::log_session_summary(data);

    if let Some(path) = &cli.local_csv {
        controller.export_local_csv(path).await?;
    }

    for kind in cli.exports.iter().copied().map(ExportKind::from) {
        let path = fetch_export(controller, kind, Path::new(&config.output_dir)).await?;
        info!("📥 {} 导出已保存至: {}", kind, path.display());
    }

    Ok(())
}

async fn fetch_export<V: DocumentView>(
    controller: &SessionController<AnalysisClient, V>,
    kind: ExportKind,
    output_dir: &Path,
) -> Result<PathBuf> {
    let session = controller.session().ok_or(WorkflowError::NoSession)?;
    let bytes = controller
        .service()
        .fetch_export(&session.session_id, kind)
        .await?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("创建导出目录失败: {}", output_dir.display()))?;
    let path = output_dir.join(format!(
        "extracted_data_{}.{}",
        session.session_id,
        kind.extension()
    ));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("写入导出文件失败: {}", path.display()))?;
    Ok(path)
}
