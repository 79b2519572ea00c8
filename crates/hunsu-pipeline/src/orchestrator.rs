//! 파이프라인 오케스트레이터.
//!
//! 캡처 → 샘플링 → 분석 → 합성을 순서대로 구동하고, 단계별 가드를
//! 적용한다. 출력은 항상 리포트 하나 또는 파이프라인 오류 하나다.
//! 프레임 시퀀스는 캡처 루프만 쓰고 샘플링 이후에는 읽기 전용이며,
//! 실행이 끝나면 소유권 규칙에 따라 해제된다.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use hunsu_core::config::{AllFailedPolicy, PipelineConfig};
use hunsu_core::models::analysis::AnalysisOutcome;
use hunsu_core::models::report::{AnalysisStats, Report};
use hunsu_core::ports::frame_source::FrameSource;
use hunsu_core::ports::process_probe::ProcessProbe;
use hunsu_core::ports::synthesis_backend::SynthesisBackend;
use hunsu_core::ports::vision_backend::VisionBackend;
use hunsu_network::retry::RetryPolicy;
use hunsu_vision::sample_frames;
use hunsu_vision::session::{CaptureSession, SessionEnd};

use crate::analyzer::FrameAnalyzer;
use crate::error::PipelineError;
use crate::synthesizer::ReportSynthesizer;

/// 분석 실행 요청
///
/// 게임 이름과 분석 프롬프트는 상류(게임 식별, 프롬프트 생성)가
/// 공급하는 불투명 문자열이다 — 여기서는 비어 있지 않은지만 본다.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// 분석 대상 게임명 (리포트에 그대로 실림)
    pub game_name: String,
    /// 프레임 분석에 사용할 지시 프롬프트
    pub instruction_prompt: String,
}

/// 게임플레이 분석 파이프라인
///
/// 포트 구현체를 주입받아 한 번의 실행 동안 소유한다. 백엔드
/// 자격 증명과 엔드포인트는 읽기 전용 설정으로, 실행 중 변경되지
/// 않는다.
pub struct GameplayPipeline {
    config: PipelineConfig,
    source: Arc<dyn FrameSource>,
    probe: Arc<dyn ProcessProbe>,
    vision: Arc<dyn VisionBackend>,
    synthesis: Arc<dyn SynthesisBackend>,
    retry: RetryPolicy,
    progress_tx: Option<watch::Sender<f32>>,
}

impl GameplayPipeline {
    /// 새 파이프라인 생성
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn FrameSource>,
        probe: Arc<dyn ProcessProbe>,
        vision: Arc<dyn VisionBackend>,
        synthesis: Arc<dyn SynthesisBackend>,
    ) -> Self {
        Self {
            config,
            source,
            probe,
            vision,
            synthesis,
            retry: RetryPolicy::default(),
            progress_tx: None,
        }
    }

    /// 분석 재시도 정책 교체
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 캡처 진행률(0~100) 발행 채널 연결
    pub fn with_progress(mut self, tx: watch::Sender<f32>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// 파이프라인 실행: 캡처 → 샘플링 → 분석 → 합성.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Report, PipelineError> {
        let game_name = request.game_name.trim();
        if game_name.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "게임 이름이 비어 있습니다".to_string(),
            ));
        }
        let instruction_prompt = request.instruction_prompt.trim();
        if instruction_prompt.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "분석 프롬프트가 비어 있습니다".to_string(),
            ));
        }

        info!("게임플레이 분석 시작: {game_name}");

        // 1. 캡처 세션
        let mut session = CaptureSession::new(
            self.config.capture.clone(),
            self.source.clone(),
            self.probe.clone(),
        );
        if let Some(tx) = &self.progress_tx {
            session = session.with_progress(tx.clone());
        }
        let outcome = session.run().await;

        if let SessionEnd::Aborted { reason } = outcome.end {
            return Err(PipelineError::SessionAborted { reason });
        }

        // 2. 프레임 0장 가드 — 샘플링/분석/합성 진입 전 중단
        if outcome.frames.is_empty() {
            warn!(
                "캡처된 프레임 없음 ({}회 시도, {}회 실패)",
                outcome.attempted, outcome.failed
            );
            return Err(PipelineError::NoFramesCaptured);
        }

        // 3. 샘플링
        let samples = sample_frames(&outcome.frames, self.config.analysis.sample_size);

        // 4. 프레임 분석 (실패는 플레이스홀더로 흡수됨)
        let analyzer =
            FrameAnalyzer::new(self.vision.clone(), &self.config.analysis).with_retry_policy(self.retry);
        let results = analyzer.analyze(&samples, instruction_prompt).await;

        let stats = AnalysisStats {
            frames_captured: outcome.frames.len() as u64,
            failed_captures: outcome.failed,
            frames_sampled: results.len(),
            successes: results.iter().filter(|r| r.is_success()).count(),
            transient_failures: results
                .iter()
                .filter(|r| r.outcome == AnalysisOutcome::TransientFailure)
                .count(),
            terminal_failures: results
                .iter()
                .filter(|r| r.outcome == AnalysisOutcome::TerminalFailure)
                .count(),
        };

        // 5. 전량 실패 정책
        if stats.all_failed() {
            match self.config.analysis.on_all_failed {
                AllFailedPolicy::Abort => {
                    return Err(PipelineError::AllFramesFailed {
                        sampled: stats.frames_sampled,
                    });
                }
                AllFailedPolicy::SynthesizeDegraded => {
                    warn!(
                        "샘플 {}장 전량 분석 실패 — 열화 리포트 합성 진행",
                        stats.frames_sampled
                    );
                }
            }
        }

        // 6. 합성 (단일 시도, 실패는 치명적)
        let synthesizer = ReportSynthesizer::new(self.synthesis.clone());
        let report = synthesizer
            .synthesize(&results, game_name, stats)
            .await
            .map_err(PipelineError::Synthesis)?;

        info!(
            "게임플레이 분석 완료: 성공 {}/{}, 리포트 {}자",
            stats.successes,
            stats.frames_sampled,
            report.markdown.len()
        );

        Ok(report)
    }
}
