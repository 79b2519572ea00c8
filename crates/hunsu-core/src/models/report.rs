//! 최종 리포트 모델.
//!
//! 종합 백엔드가 생성한 마크다운 본문과 실행 통계를 담는다.
//! 하류(UI/CLI)는 이 타입 또는 실패 메시지 문자열 하나만 받는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 한 번의 실행 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// 캡처에 성공한 프레임 수
    pub frames_captured: u64,
    /// 실패(스킵)한 캡처 시도 수
    pub failed_captures: u64,
    /// 샘플로 추출된 프레임 수
    pub frames_sampled: usize,
    /// 분석 성공 수
    pub successes: usize,
    /// 일시 장애 수 (재시도 소진)
    pub transient_failures: usize,
    /// 종결 장애 수
    pub terminal_failures: usize,
}

impl AnalysisStats {
    /// 샘플 전체가 실패했는지 여부 (샘플이 있을 때만 의미 있음)
    pub fn all_failed(&self) -> bool {
        self.frames_sampled > 0 && self.successes == 0
    }
}

/// 최종 분석 리포트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// 분석 대상 게임명
    pub game_name: String,
    /// 마크다운 리포트 본문
    pub markdown: String,
    /// 리포트 생성 시각 (UTC)
    pub generated_at: DateTime<Utc>,
    /// 실행 통계
    pub stats: AnalysisStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failed_requires_samples() {
        let empty = AnalysisStats::default();
        assert!(!empty.all_failed());

        let degraded = AnalysisStats {
            frames_sampled: 5,
            transient_failures: 3,
            terminal_failures: 2,
            ..Default::default()
        };
        assert!(degraded.all_failed());

        let partial = AnalysisStats {
            frames_sampled: 5,
            successes: 1,
            transient_failures: 4,
            ..Default::default()
        };
        assert!(!partial.all_failed());
    }
}
