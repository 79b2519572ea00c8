//! 프로세스 생존 탐지 포트.
//!
//! 지정한 이름의 외부 프로세스가 실행 중인지 시점 조회한다.

use async_trait::async_trait;

/// 프로세스 생존 탐지
///
/// 구현체: `ProcessLivenessProbe` (sysinfo 기반)
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// 프로세스 실행 중 여부.
    ///
    /// 계약:
    /// - 이름이 비어 있거나 센티널(`unknown`)이면 true — 검증 불가, 낙관적 진행
    /// - 탐지 메커니즘 자체가 실패하면 false — 에러를 올리지 않는다
    ///   (생존 탐지 실패가 캡처 루프를 죽여서는 안 된다)
    async fn is_running(&self, process_name: &str) -> bool;
}
