//! 프레임 소스 포트.
//!
//! 설정된 화면 영역의 스냅샷 한 장을 떠 오는 인터페이스.
//! 영역/모니터 선택은 구현체 생성 시점에 주입되고, 호출은 무인자다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::PixelBuffer;

/// 화면 영역 스냅샷 공급자
///
/// 구현체: `RegionCapturer` (xcap 기반)
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 영역 스냅샷 1회 캡처.
    ///
    /// 백엔드가 데이터를 못 돌려준 경우와 백엔드 자체가 실패한 경우 모두
    /// `CoreError::Capture`로 수렴한다. 면적 0 프레임도 실패이며,
    /// 부분/쓰레기 프레임은 절대 유효 데이터로 반환되지 않는다.
    async fn capture_once(&self) -> Result<PixelBuffer, CoreError>;
}
