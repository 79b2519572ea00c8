//! 외부 리포트 합성 클라이언트.
//!
//! Gemini generateContent API를 호출하여 프레임별 분석 텍스트 묶음을
//! 하나의 코칭 리포트로 합성한다. 합성은 파이프라인 전체에서 단일
//! 시도만 수행한다 — 실패하면 호출 측이 열화 리포트로 대체한다.

use async_trait::async_trait;
use tracing::{debug, warn};

use hunsu_core::config::SynthesisEndpoint;
use hunsu_core::error::CoreError;
use hunsu_core::ports::synthesis_backend::SynthesisBackend;

use crate::status::{map_status_error, parse_retry_after};

// ============================================================
// RemoteSynthesisBackend — 외부 합성 API 클라이언트
// ============================================================

/// 외부 합성 API 클라이언트 — 최종 리포트 생성용
///
/// 지원 API:
/// - Gemini: `POST /v1beta/models/{model}:generateContent`
///
/// API 키는 URL이 아니라 `x-goog-api-key` 헤더로 전달한다.
/// URL에 실린 키는 로그와 프록시에 남는다.
#[derive(Debug)]
pub struct RemoteSynthesisBackend {
    /// HTTP 클라이언트
    http_client: reqwest::Client,
    /// API 베이스 URL (끝 슬래시 제거됨)
    base_url: String,
    /// API 키 (메모리에만 유지)
    api_key: String,
    /// 모델 이름
    model: String,
    /// 요청 타임아웃 (초) — 타임아웃 오류 매핑에 사용
    timeout_secs: u64,
}

impl RemoteSynthesisBackend {
    /// 새 RemoteSynthesisBackend 생성
    pub fn new(config: &SynthesisEndpoint) -> Result<Self, CoreError> {
        if config.api_key.is_empty() {
            return Err(CoreError::Config(
                "합성 API 키 미설정. 설정 파일 또는 HUNSU_SYNTHESIS_API_KEY로 지정하세요."
                    .into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout = config.timeout_secs,
            "RemoteSynthesisBackend 초기화"
        );

        Ok(Self {
            http_client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// reqwest 전송 오류를 CoreError로 매핑
    fn map_request_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout {
                timeout_ms: self.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            CoreError::Network(format!("합성 API 연결 실패: {}", e))
        } else {
            CoreError::Network(format!("합성 API 호출 실패: {}", e))
        }
    }

    /// 응답 파싱: candidates[0].content.parts[0].text
    fn parse_response(body: &str) -> Result<String, CoreError> {
        let response: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| CoreError::Parse(format!("합성 응답 JSON 파싱 실패: {}", e)))?;

        let text = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|cand| cand.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .and_then(|arr| arr.first())
            .and_then(|part| part.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                CoreError::Parse("합성 응답에서 텍스트를 찾을 수 없음".to_string())
            })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Parse("합성 응답 텍스트가 비어 있음".to_string()));
        }

        Ok(text.to_string())
    }
}

#[async_trait]
impl SynthesisBackend for RemoteSynthesisBackend {
    async fn summarize(&self, prompt: &str) -> Result<String, CoreError> {
        let url = self.request_url();

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "합성 API 호출"
        );

        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("합성 API 응답 읽기 실패: {}", e)))?;

        if !status.is_success() {
            warn!(status = %status, "합성 API 오류 응답");
            return Err(map_status_error(status.as_u16(), retry_after, &body));
        }

        let text = Self::parse_response(&body)?;
        debug!(chars = text.len(), "리포트 합성 완료");
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        &self.model
    }
}

// ============================================================
// 테스트
// ============================================================
