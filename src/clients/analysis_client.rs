/// 分析服务客户端
///
/// 封装与分析服务的三个接口以及导出地址
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::models::lenient::value_text;
use crate::models::{
    ExportKind, ProcessRequest, ProcessResponse, SelectedFile, ServiceReply, UploadResponse,
};

/// 分析服务能力
///
/// `Err` 表示网络失败或响应无法解析，`Ok(ServiceReply::Rejected)` 表示服务返回了 `error` 字段。
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// 上传文件，创建会话
    async fn upload(&self, file: &SelectedFile) -> AppResult<ServiceReply<UploadResponse>>;

    /// 处理会话中的文件
    async fn process(&self, session_id: &str) -> AppResult<ServiceReply<ProcessResponse>>;

    /// 会话结果的导出地址
    fn export_url(&self, session_id: &str, kind: ExportKind) -> AppResult<String>;
}

/// 基于 reqwest 的分析服务客户端
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    base_url: Url,
}

impl AnalysisClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = parse_base_url(&config.analysis_base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(base_url.as_str(), e))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::invalid_url(format!("{}{}", self.base_url, path), e))
    }

    /// 下载导出文件
    ///
    /// 浏览器模式下由页面跳转完成下载，命令行模式没有浏览器，直接取回内容。
    pub async fn fetch_export(&self, session_id: &str, kind: ExportKind) -> AppResult<Vec<u8>> {
        let url = self.export_url(session_id, kind)?;
        debug!("下载导出文件: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(message) = error_message(&body) {
                warn!("导出失败 ({}): {}", kind, message);
            }
            return Err(AppError::Api(ApiError::BadStatus {
                endpoint: url,
                status: status.as_u16(),
            }));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn upload(&self, file: &SelectedFile) -> AppResult<ServiceReply<UploadResponse>> {
        let url = self.endpoint("upload")?;
        debug!("上传文件 {} ({} 字节)", file.name, file.bytes.len());

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;

        read_reply(url.as_str(), response).await
    }

    async fn process(&self, session_id: &str) -> AppResult<ServiceReply<ProcessResponse>> {
        let url = self.endpoint("process")?;
        debug!("请求处理会话 {}", session_id);

        let response = self
            .http
            .post(url.clone())
            .json(&ProcessRequest { session_id })
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;

        read_reply(url.as_str(), response).await
    }

    fn export_url(&self, session_id: &str, kind: ExportKind) -> AppResult<String> {
        let mut url = self.endpoint(&format!("download/{}", kind.as_str()))?;
        url.query_pairs_mut().append_pair("session_id", session_id);
        Ok(url.into())
    }
}

/// 服务地址统一以 `/` 结尾，保证 `join` 追加而不是替换最后一段路径
fn parse_base_url(raw: &str) -> AppResult<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| {
        AppError::Config(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            source: Box::new(e),
        })
    })
}

async fn read_reply<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> AppResult<ServiceReply<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::api_request_failed(endpoint, e))?;
    debug!("{} 返回 HTTP {} ({} 字节)", endpoint, status, body.len());
    parse_reply(endpoint, status.as_u16(), &body)
}

/// 解析服务响应：响应体里的 `error` 优先于 HTTP 状态
pub(crate) fn parse_reply<T: DeserializeOwned>(
    endpoint: &str,
    status: u16,
    body: &str,
) -> AppResult<ServiceReply<T>> {
    let success = (200..300).contains(&status);

    let value: JsonValue = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !success => {
            return Err(AppError::Api(ApiError::BadStatus {
                endpoint: endpoint.to_string(),
                status,
            }))
        }
        Err(e) => return Err(AppError::json_parse_failed(endpoint, e)),
    };

    if let Some(message) = value.get("error").filter(|v| !v.is_null()) {
        return Ok(ServiceReply::Rejected(value_text(message)));
    }

    if !success {
        return Err(AppError::Api(ApiError::BadStatus {
            endpoint: endpoint.to_string(),
            status,
        }));
    }

    serde_json::from_value(value)
        .map(ServiceReply::Accepted)
        .map_err(|e| AppError::json_parse_failed(endpoint, e))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("error").filter(|e| !e.is_null()).map(value_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn client(base: &str) -> AnalysisClient {
        let config = Config {
            analysis_base_url: base.to_string(),
            ..Config::default()
        };
        assert_ok!(AnalysisClient::new(&config))
    }

    #[test]
    fn test_export_url_contains_session_and_kind() {
        let client = client("http://localhost:5000");

        assert_eq!(
            client.export_url("abc123", ExportKind::Csv).unwrap(),
            "http://localhost:5000/download/csv?session_id=abc123"
        );
        assert_eq!(
            client.export_url("abc123", ExportKind::Pdf).unwrap(),
            "http://localhost:5000/download/pdf?session_id=abc123"
        );
    }

    #[test]
    fn test_export_url_encodes_session_and_keeps_base_path() {
        let client = client("http://example.org/analysis");

        assert_eq!(
            client.export_url("a b&c", ExportKind::Csv).unwrap(),
            "http://example.org/analysis/download/csv?session_id=a+b%26c"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            analysis_base_url: "not a url".to_string(),
            ..Config::default()
        };
        let err = assert_err!(AnalysisClient::new(&config));
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_parse_upload_success() {
        let reply: ServiceReply<UploadResponse> = parse_reply(
            "/upload",
            200,
            r#"{"session_id":"abc123","filename":"report.pdf","message":"File uploaded successfully"}"#,
        )
        .unwrap();

        assert_eq!(
            reply,
            ServiceReply::Accepted(UploadResponse {
                session_id: "abc123".to_string(),
                filename: Some("report.pdf".to_string()),
            })
        );
    }

    #[test]
    fn test_error_body_wins_over_status() {
        let reply: ServiceReply<UploadResponse> = parse_reply(
            "/upload",
            400,
            r#"{"error":"Invalid file type. Please upload a PDF file."}"#,
        )
        .unwrap();

        assert_eq!(
            reply,
            ServiceReply::Rejected("Invalid file type. Please upload a PDF file.".to_string())
        );
    }

    #[test]
    fn test_non_json_is_transport_failure() {
        let err = parse_reply::<ProcessResponse>("/process", 200, "<html>oops</html>").unwrap_err();
        assert!(err.is_transport());

        let err = parse_reply::<ProcessResponse>("/process", 502, "Bad Gateway").unwrap_err();
        assert!(matches!(
            err,
            AppError::Api(ApiError::BadStatus { status: 502, .. })
        ));
    }

    #[test]
    fn test_missing_session_id_is_malformed() {
        let err = parse_reply::<UploadResponse>("/upload", 200, r#"{"filename":"a.pdf"}"#)
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_process_reply_ignores_extra_fields() {
        let reply: ServiceReply<ProcessResponse> = parse_reply(
            "/process",
            200,
            r#"{"success":true,"session_id":"abc123","data":{"summary":"ok"}}"#,
        )
        .unwrap();

        match reply {
            ServiceReply::Accepted(response) => {
                assert_eq!(response.into_result().summary.as_deref(), Some("ok"))
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
