//! 지수 백오프 재시도 정책.
//!
//! 일시 오류(`CoreError::is_transient`)만 재시도하고, 터미널 오류는
//! 즉시 반환한다. RateLimit 응답은 서버 지정 대기 시간을 우선한다.

use hunsu_core::error::CoreError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// 기본 총 시도 횟수 (최초 1회 + 재시도 2회)
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// 기본 초기 백오프
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(4);
/// 백오프 상한
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// 재시도 정책 — 값 타입으로 복사해서 쓴다
///
/// exponential backoff: 4s → 8s (상한 10s)
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 총 시도 횟수 (재시도가 아니라 시도 — 1이면 재시도 없음)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간
    pub initial_delay: Duration,
    /// 백오프 상한
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// 재시도 없는 정책 (단일 시도)
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// 총 시도 횟수 설정
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// 초기 백오프 설정
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// 재시도가 포함된 비동기 작업 실행
    ///
    /// 일시 오류만 재시도하며, 터미널 오류 또는 시도 횟수 소진 시
    /// 마지막 오류를 그대로 반환한다.
    pub async fn execute<F, Fut, T>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{operation_name} 재시도 성공 (시도 {attempt}/{max_attempts})");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !e.is_transient() || attempt == max_attempts {
                        return Err(e);
                    }

                    warn!(
                        "{operation_name} 실패 (시도 {attempt}/{max_attempts}): {e}, {delay:?} 후 재시도"
                    );

                    // RateLimit은 서버 지정 대기 시간 우선 (상한 적용)
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs).min(self.max_delay);
                    }

                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.max_delay);
                }
            }
        }

        Err(CoreError::Internal(format!(
            "{operation_name}: 재시도 한도 도달"
        )))
    }
}
