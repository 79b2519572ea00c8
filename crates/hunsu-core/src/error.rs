//! HUNSU 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 전송/인프라 실패를 `CoreError`로 표현한다.
//! 재시도 계층은 [`CoreError::is_transient`]로 일시 장애 여부를 판정한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 캡처, 원격 백엔드 호출 등 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 화면 캡처 실패 (백엔드 에러, 빈 프레임 모두 포함)
    #[error("캡처 에러: {0}")]
    Capture(String),

    /// 인증 실패 (API 키 오류, 권한 거부)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 네트워크 에러 (연결 실패)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("타임아웃: {timeout_ms}ms 초과")]
    Timeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 원격 서버 에러 응답
    #[error("서버 에러 ({status}): {message}")]
    Server {
        /// HTTP 상태 코드
        status: u16,
        /// 서버가 돌려준 메시지
        message: String,
    },

    /// 응답 본문 파싱 실패 (기대한 필드 누락 등)
    #[error("응답 파싱 에러: {0}")]
    Parse(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 일시 장애 여부.
    ///
    /// 연결 실패, 타임아웃, 한도 초과, 5xx 서버 에러는 재시도 대상이고
    /// 인증 실패, 파싱 실패, 설정 오류는 재시도해도 결과가 같으므로 종결 처리한다.
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Network(_)
            | CoreError::Timeout { .. }
            | CoreError::RateLimit { .. }
            | CoreError::ServiceUnavailable(_) => true,
            CoreError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
