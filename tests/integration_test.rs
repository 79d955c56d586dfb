use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use doc_insight_client::error::{ApiError, AppError};
use doc_insight_client::models::{ProcessResponse, ServiceReply, UploadResponse};
use doc_insight_client::utils::logging;
use doc_insight_client::view::{ids, DocumentView};
use doc_insight_client::view::memory::tab_button_id;
use doc_insight_client::{
    connect_to_browser_and_page, launch_headless_browser, ActionOutcome, AnalysisClient,
    AnalysisService, App, AppResult, Config, ExportKind, JsExecutor, MemoryView, PageView,
    SelectedFile, SessionController, UiEvent,
};

/// 固定返回一个会话和一份分析结果的服务
struct ScriptedService {
    session_id: String,
    data: serde_json::Value,
    process_calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(session_id: &str, data: serde_json::Value) -> Self {
        Self {
            session_id: session_id.to_string(),
            data,
            process_calls: Mutex::new(Vec::new()),
        }
    }

    fn process_calls(&self) -> Vec<String> {
        self.process_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn upload(&self, file: &SelectedFile) -> AppResult<ServiceReply<UploadResponse>> {
        let body = json!({ "session_id": self.session_id, "filename": file.name });
        Ok(ServiceReply::Accepted(serde_json::from_value(body)?))
    }

    async fn process(&self, session_id: &str) -> AppResult<ServiceReply<ProcessResponse>> {
        self.process_calls.lock().unwrap().push(session_id.to_string());
        if session_id != self.session_id {
            return Err(AppError::Api(ApiError::BadStatus {
                endpoint: "/process".to_string(),
                status: 404,
            }));
        }
        let body = json!({ "success": true, "session_id": session_id, "data": self.data });
        Ok(ServiceReply::Accepted(serde_json::from_value(body)?))
    }

    fn export_url(&self, session_id: &str, kind: ExportKind) -> AppResult<String> {
        Ok(format!("/download/{}?session_id={}", kind, session_id))
    }
}

fn quick_config() -> Config {
    Config {
        render_delay_ms: 0,
        ..Config::default()
    }
}

fn report_pdf() -> SelectedFile {
    SelectedFile::new("report.pdf", "application/pdf", b"%PDF-1.7\n".to_vec())
}

fn report_data() -> serde_json::Value {
    json!({
        "summary": "Annual report of the education department.",
        "document_type": "Annual Report",
        "education_levels": ["Primary", "Secondary"],
        "states_mentioned": ["Kerala"],
        "named_entities": [{ "text": "Dept. of Ed.", "label": "ORG" }],
        "key_statistics": [{ "metric": "GER", "value": 27.1, "context": "Higher education" }],
        "tables": [{
            "title": "Enrollment",
            "data": [
                { "State": "Kerala", "Students": 1200 },
                { "State": "Goa" }
            ]
        }],
        "policies_schemes": []
    })
}

#[tokio::test]
async fn test_report_upload_process_and_download() {
    logging::init(false);

    let service = ScriptedService::new("abc123", report_data());
    let mut ctl = SessionController::new(service, MemoryView::with_default_layout(), &quick_config());

    assert_eq!(
        assert_ok!(ctl.select_file(Some(report_pdf())).await),
        ActionOutcome::Completed
    );
    assert_eq!(ctl.view().text(ids::FILE_NAME), "report.pdf");
    assert!(ctl.is_process_enabled());

    assert_eq!(
        assert_ok!(ctl.process_document().await),
        ActionOutcome::Completed
    );

    let view = ctl.view();
    assert_eq!(view.count_class(ids::ENTITIES_LIST, "entity-card"), 1);
    assert!(view.text(ids::ENTITIES_LIST).contains("Dept. of Ed."));
    assert!(view.text(ids::ENTITIES_LIST).contains("ORG"));
    assert!(view.text(ids::STATISTICS_LIST).contains("27.1"));
    assert_eq!(view.text(ids::DOC_TYPE), "Annual Report");
    assert_eq!(view.count_class(ids::EDUCATION_LEVELS, "tag"), 2);
    assert_eq!(view.count_class(ids::TABLES_LIST, "table-block"), 1);
    assert!(!view.is_hidden(ids::RESULTS_SECTION));

    assert_ok!(ctl.download(ExportKind::Csv).await);
    assert_eq!(
        ctl.view().navigations(),
        &["/download/csv?session_id=abc123".to_string()]
    );
    assert_eq!(ctl.service().process_calls(), vec!["abc123"]);
}

#[tokio::test]
async fn test_event_loop_serializes_and_ignores_duplicate_process() {
    let service = ScriptedService::new("abc123", report_data());
    let ctl = SessionController::new(service, MemoryView::with_default_layout(), &quick_config());
    let (app, tx) = App::new(ctl);

    for event in [
        UiEvent::FileSelected(Some(report_pdf())),
        UiEvent::ProcessDocument,
        UiEvent::ProcessDocument,
        UiEvent::SwitchTab {
            name: "entities".to_string(),
            control_id: tab_button_id("entities"),
        },
        UiEvent::Download(ExportKind::Pdf),
        UiEvent::Shutdown,
    ] {
        tx.send(event).await.unwrap();
    }

    let (ctl, stats) = app.run().await.unwrap();

    assert_eq!(ctl.service().process_calls().len(), 1);
    assert_eq!(stats.handled, 5);
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.ignored, 1);
    assert_eq!(ctl.active_tab(), Some("entities"));
    assert_eq!(ctl.view().active_panes(), vec!["entitiesTab"]);
    assert_eq!(
        ctl.view().navigations(),
        &["/download/pdf?session_id=abc123".to_string()]
    );
}

#[tokio::test]
async fn test_event_loop_stops_when_senders_drop() {
    let service = ScriptedService::new("abc123", report_data());
    let ctl = SessionController::new(service, MemoryView::with_default_layout(), &quick_config());
    let (app, tx) = App::new(ctl);

    tx.send(UiEvent::RemoveFile).await.unwrap();
    tx.send(UiEvent::ProcessDocument).await.unwrap();
    drop(tx);

    let (ctl, stats) = app.run().await.unwrap();
    assert_eq!(stats.handled, 2);
    assert_eq!(stats.rejected, 1);
    assert!(ctl.service().process_calls().is_empty());
    assert_eq!(
        ctl.view().last_notice(),
        Some("Please upload a file first")
    );
}

#[tokio::test]
async fn test_missing_view_element_is_counted_as_failure() {
    let service = ScriptedService::new("abc123", report_data());
    let ctl = SessionController::new(service, MemoryView::empty(), &quick_config());
    let (app, tx) = App::new(ctl);

    tx.send(UiEvent::FileSelected(Some(report_pdf()))).await.unwrap();
    tx.send(UiEvent::Shutdown).await.unwrap();

    let (_ctl, stats) = app.run().await.unwrap();
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_service_text_is_escaped_in_snapshot() {
    let data = json!({
        "summary": "<script>alert(1)</script>",
        "named_entities": [{ "text": "A & B", "label": "<b>ORG</b>" }]
    });
    let service = ScriptedService::new("s1", data);
    let mut ctl = SessionController::new(service, MemoryView::with_default_layout(), &quick_config());

    assert_ok!(ctl.select_file(Some(report_pdf())).await);
    assert_ok!(ctl.process_document().await);

    let html = ctl.into_view().to_html_document("report.pdf");
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("A &amp; B"));
    assert!(!html.contains("<script>"));
    assert!(!html.contains("<b>ORG</b>"));
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let config = Config {
        analysis_base_url: "not a url".to_string(),
        ..Config::default()
    };
    assert_err!(AnalysisClient::new(&config));
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    logging::init(true);

    let config = Config::from_env();
    let result =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url), None)
            .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_render_into_live_page() {
    logging::init(true);

    let config = Config::from_env();
    let (_browser, page) =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url), None)
            .await
            .expect("连接浏览器失败");

    let service = ScriptedService::new("abc123", report_data());
    let view = PageView::new(JsExecutor::new(page));
    let mut ctl = SessionController::new(service, view, &quick_config());

    assert_ok!(ctl.select_file(Some(report_pdf())).await);
    assert_eq!(
        assert_ok!(ctl.process_document().await),
        ActionOutcome::Completed
    );
}

#[tokio::test]
#[ignore] // 需要本机安装 Chrome / Chromium
async fn test_headless_notice_does_not_block_page() {
    logging::init(true);

    let config = Config::from_env();
    let (_browser, page) =
        launch_headless_browser("about:blank", config.browser_executable.as_deref())
            .await
            .expect("启动无头浏览器失败");

    let executor = JsExecutor::new(page);
    executor
        .eval(r#"document.body.innerHTML = '<div id="summaryText"></div>'; true"#)
        .await
        .expect("初始化页面失败");
    let mut view = PageView::new(executor);

    view.notify("Error: File not found").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let update = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        view.set_text(ids::SUMMARY_TEXT, "still responsive"),
    )
    .await;
    assert!(matches!(update, Ok(Ok(()))), "弹窗之后页面应该仍可操作");
}
