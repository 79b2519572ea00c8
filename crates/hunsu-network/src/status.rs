//! HTTP 오류 응답 → CoreError 매핑.
//!
//! 비전/합성 클라이언트가 공유하는 상태 코드 분류. 5xx만 일시
//! 오류로 분류되어 재시도 대상이 된다.

use hunsu_core::error::CoreError;

/// HTTP 상태 코드를 CoreError로 매핑
///
/// 401/403 → Auth, 429 → RateLimit, 503 → ServiceUnavailable,
/// 나머지는 상태 코드를 보존하는 Server
pub(crate) fn map_status_error(status: u16, retry_after_secs: u64, body: &str) -> CoreError {
    let snippet: String = body.chars().take(200).collect();
    match status {
        401 | 403 => CoreError::Auth(format!("인증 실패 ({}): {}", status, snippet)),
        429 => CoreError::RateLimit { retry_after_secs },
        503 => CoreError::ServiceUnavailable(snippet),
        _ => CoreError::Server {
            status,
            message: snippet,
        },
    }
}

/// Retry-After 헤더 파싱 (없거나 초 단위가 아니면 기본 60초)
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(60)
}
