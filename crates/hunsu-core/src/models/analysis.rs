//! 프레임 분석 결과 모델.
//!
//! 샘플 프레임 하나당 결과 하나. 실패도 예외가 아닌 데이터로 표현되어
//! 배치 전체를 중단시키지 않는다 — 실패한 프레임은 진단 메시지를 담은
//! 플레이스홀더로 종합 단계까지 흘러간다.

/// 프레임 분석 결과 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// 비전 백엔드가 코멘트를 반환
    Success,
    /// 일시 장애로 재시도 한도 소진 (연결/타임아웃/5xx)
    TransientFailure,
    /// 종결 장애 — 재시도 없이 즉시 실패 처리 (인증/파싱 등)
    TerminalFailure,
}

/// 샘플 프레임 한 장의 분석 결과
#[derive(Debug, Clone)]
pub struct FrameAnalysisResult {
    /// 샘플 세트 내 위치 (0부터)
    pub sample_index: usize,
    /// 원본 프레임 시퀀스 인덱스
    pub frame_index: u64,
    /// 결과 분류
    pub outcome: AnalysisOutcome,
    /// 성공 시 코멘트 텍스트, 실패 시 진단 메시지
    pub text: String,
}

impl FrameAnalysisResult {
    /// 성공 결과 생성
    pub fn success(sample_index: usize, frame_index: u64, text: String) -> Self {
        Self {
            sample_index,
            frame_index,
            outcome: AnalysisOutcome::Success,
            text,
        }
    }

    /// 일시 장애 결과 생성 (재시도 소진 후)
    pub fn transient(sample_index: usize, frame_index: u64, diagnostic: String) -> Self {
        Self {
            sample_index,
            frame_index,
            outcome: AnalysisOutcome::TransientFailure,
            text: diagnostic,
        }
    }

    /// 종결 장애 결과 생성
    pub fn terminal(sample_index: usize, frame_index: u64, diagnostic: String) -> Self {
        Self {
            sample_index,
            frame_index,
            outcome: AnalysisOutcome::TerminalFailure,
            text: diagnostic,
        }
    }

    /// 성공 여부
    pub fn is_success(&self) -> bool {
        self.outcome == AnalysisOutcome::Success
    }
}
