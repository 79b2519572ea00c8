//! 리포트 합성기.
//!
//! 프레임별 결과 전체를 하나의 합성 요청으로 묶어 최종 마크다운
//! 리포트를 만든다. 프레임 분석과 달리 합성 실패는 실행 전체에
//! 치명적이다 — 열화 경로 없이 단일 시도만 수행하고, 실패는
//! 호출 측에서 파이프라인 오류로 변환된다.

use std::sync::Arc;
use tracing::info;

use hunsu_core::error::CoreError;
use hunsu_core::models::analysis::FrameAnalysisResult;
use hunsu_core::models::report::{AnalysisStats, Report};
use hunsu_core::ports::synthesis_backend::SynthesisBackend;

use crate::prompt;

/// 리포트 합성기 — 결과 목록을 단일 요청으로 요약
pub struct ReportSynthesizer {
    backend: Arc<dyn SynthesisBackend>,
}

impl ReportSynthesizer {
    /// 새 합성기 생성
    pub fn new(backend: Arc<dyn SynthesisBackend>) -> Self {
        Self { backend }
    }

    /// 결과 목록을 리포트로 합성.
    ///
    /// 프롬프트 구성은 입력의 순수 함수이므로 같은 결과 목록과 게임
    /// 이름이면 백엔드에 항상 같은 요청이 나간다. 생성 시각만 호출
    /// 시점을 따른다.
    pub async fn synthesize(
        &self,
        results: &[FrameAnalysisResult],
        game_name: &str,
        stats: AnalysisStats,
    ) -> Result<Report, CoreError> {
        let prompt = prompt::synthesis_prompt(results, game_name);

        info!(
            "리포트 합성 요청: 결과 {}건, 성공 {}건 ({})",
            results.len(),
            stats.successes,
            self.backend.backend_name()
        );

        let markdown = self.backend.summarize(&prompt).await?;

        info!(chars = markdown.len(), "리포트 합성 완료");

        Ok(Report {
            game_name: game_name.to_string(),
            markdown,
            generated_at: chrono::Utc::now(),
            stats,
        })
    }
}
