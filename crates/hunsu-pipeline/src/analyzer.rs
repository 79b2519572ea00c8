//! 프레임 분석기.
//!
//! 샘플된 프레임 각각을 인코딩해 비전 백엔드에 독립적으로 질의한다.
//! 개별 실패는 플레이스홀더 결과로 흡수되어 배치 전체를 절대
//! 중단시키지 않으며, 결과는 요청과 무관하게 샘플 순서 그대로
//! 반환된다.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use hunsu_core::config::{AnalysisConfig, WebPQuality};
use hunsu_core::models::analysis::FrameAnalysisResult;
use hunsu_core::models::frame::{SampleSet, SampledFrame};
use hunsu_core::ports::vision_backend::VisionBackend;
use hunsu_network::retry::RetryPolicy;
use hunsu_vision::encoder::encode_frame;

/// 프레임 분석기 — 샘플 단위 비전 질의 + 재시도 + 순서 보존
pub struct FrameAnalyzer {
    vision: Arc<dyn VisionBackend>,
    retry: RetryPolicy,
    quality: WebPQuality,
    max_edge: Option<u32>,
    max_tokens: u32,
    parallel_requests: usize,
}

impl FrameAnalyzer {
    /// 새 프레임 분석기 생성 (기본 재시도 정책 사용)
    pub fn new(vision: Arc<dyn VisionBackend>, config: &AnalysisConfig) -> Self {
        Self {
            vision,
            retry: RetryPolicy::default(),
            quality: config.quality,
            max_edge: config.max_edge,
            max_tokens: config.max_tokens,
            parallel_requests: config.parallel_requests,
        }
    }

    /// 재시도 정책 교체
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 샘플 세트 전체 분석.
    ///
    /// 동시 요청 수는 샘플 수를 상한으로 제한되고, 결과는 완료
    /// 순서가 아니라 입력(샘플) 순서로 재조립된다. 이 함수는 절대
    /// 오류를 반환하지 않는다 — 실패는 결과 데이터로 표현된다.
    pub async fn analyze(
        &self,
        samples: &SampleSet<'_>,
        instruction_prompt: &str,
    ) -> Vec<FrameAnalysisResult> {
        if samples.is_empty() {
            return Vec::new();
        }

        let parallel = self.parallel_requests.clamp(1, samples.len());
        info!(
            "프레임 분석 시작: 샘플 {}장, 동시 요청 {} ({})",
            samples.len(),
            parallel,
            self.vision.backend_name()
        );

        let results: Vec<FrameAnalysisResult> = stream::iter(
            samples
                .iter()
                .enumerate()
                .map(|(pos, sample)| self.analyze_one(pos, *sample, instruction_prompt)),
        )
        .buffered(parallel)
        .collect()
        .await;

        let successes = results.iter().filter(|r| r.is_success()).count();
        info!("프레임 분석 완료: 성공 {}/{}", successes, results.len());

        results
    }

    /// 샘플 한 장 분석: 인코딩 → 질의(재시도 포함) → 결과 분류
    async fn analyze_one(
        &self,
        pos: usize,
        sample: SampledFrame<'_>,
        instruction_prompt: &str,
    ) -> FrameAnalysisResult {
        let frame_index = sample.frame_index;

        let encoded = match encode_frame(&sample.frame.pixels, self.quality, self.max_edge) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("프레임 {frame_index} 인코딩 실패: {e}");
                return FrameAnalysisResult::terminal(
                    pos,
                    frame_index,
                    format!("프레임 {} 분석 불가 (인코딩 실패): {}", frame_index, e),
                );
            }
        };

        debug!(
            frame = frame_index,
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.byte_len,
            "프레임 분석 요청"
        );

        let outcome = self
            .retry
            .execute("프레임 분석", || {
                self.vision.describe_frame(
                    instruction_prompt,
                    &encoded.base64,
                    encoded.media_type,
                    self.max_tokens,
                )
            })
            .await;

        match outcome {
            Ok(text) => FrameAnalysisResult::success(pos, frame_index, text),
            Err(e) if e.is_transient() => {
                warn!("프레임 {frame_index} 분석 실패 (일시 오류, 재시도 소진): {e}");
                FrameAnalysisResult::transient(
                    pos,
                    frame_index,
                    format!(
                        "프레임 {} 분석 불가 (일시 오류, 재시도 소진): {}",
                        frame_index, e
                    ),
                )
            }
            Err(e) => {
                warn!("프레임 {frame_index} 분석 실패 (터미널 오류): {e}");
                FrameAnalysisResult::terminal(
                    pos,
                    frame_index,
                    format!("프레임 {} 분석 불가: {}", frame_index, e),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hunsu_core::error::CoreError;
    use hunsu_core::models::analysis::AnalysisOutcome;
    use hunsu_core::models::frame::{Frame, PixelBuffer};
    use hunsu_vision::sample_frames;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    enum Behavior {
        /// 호출 순번을 담아 즉시 성공
        Ok,
        /// 늦게 시작한 호출일수록 빨리 완료 (순서 보존 검증용)
        ReverseDelay { total: u32 },
        /// 항상 타임아웃 (일시 오류)
        AlwaysTimeout,
        /// 항상 인증 실패 (터미널 오류)
        AlwaysAuth,
        /// n번째 호출만 터미널 실패
        FailNth(u32),
        /// 처음 n번 일시 실패 후 성공
        TransientFirst(u32),
    }

    struct MockVision {
        calls: AtomicU32,
        behavior: Behavior,
    }

    impl MockVision {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                behavior,
            })
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VisionBackend for MockVision {
        async fn describe_frame(
            &self,
            _prompt: &str,
            _image_base64: &str,
            _media_type: &str,
            _max_tokens: u32,
        ) -> Result<String, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.behavior {
                Behavior::Ok => Ok(format!("응답 {n}")),
                Behavior::ReverseDelay { total } => {
                    let delay_ms = (total.saturating_sub(n)) as u64 * 100;
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(format!("응답 {n}"))
                }
                Behavior::AlwaysTimeout => Err(CoreError::Timeout { timeout_ms: 30_000 }),
                Behavior::AlwaysAuth => Err(CoreError::Auth("잘못된 API 키".to_string())),
                Behavior::FailNth(target) => {
                    if n == *target {
                        Err(CoreError::Parse("응답 형식 오류".to_string()))
                    } else {
                        Ok(format!("응답 {n}"))
                    }
                }
                Behavior::TransientFirst(count) => {
                    if n <= *count {
                        Err(CoreError::Network("연결 끊김".to_string()))
                    } else {
                        Ok(format!("응답 {n}"))
                    }
                }
            }
        }

        fn backend_name(&self) -> &str {
            "mock-vision"
        }
    }

    fn make_frames(count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame {
                index: i as u64,
                offset: Duration::from_millis(i as u64 * 100),
                captured_at: chrono::Utc::now(),
                pixels: PixelBuffer::new(8, 8, vec![128u8; 8 * 8 * 4]).unwrap(),
            })
            .collect()
    }

    fn test_config(parallel: usize) -> AnalysisConfig {
        AnalysisConfig {
            sample_size: 5,
            max_tokens: 500,
            parallel_requests: parallel,
            quality: WebPQuality::Low,
            max_edge: None,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_sample_set_returns_empty() {
        let frames: Vec<Frame> = Vec::new();
        let samples = sample_frames(&frames, 5);
        let vision = MockVision::new(Behavior::Ok);
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(3));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert!(results.is_empty());
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn results_preserve_sample_order_under_concurrency() {
        // 늦게 발사된 요청이 먼저 완료되어도 결과는 샘플 순서
        let frames = make_frames(5);
        let samples = sample_frames(&frames, 5);
        let vision = MockVision::new(Behavior::ReverseDelay { total: 5 });
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(5));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert_eq!(results.len(), 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.sample_index, i);
            assert_eq!(result.frame_index, i as u64);
            // 현재 스레드 런타임에서 버퍼드 스트림은 입력 순서로 폴링 시작
            assert_eq!(result.text, format!("응답 {}", i + 1));
            assert!(result.is_success());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_exhaustion_degrades_to_placeholder() {
        let frames = make_frames(2);
        let samples = sample_frames(&frames, 2);
        let vision = MockVision::new(Behavior::AlwaysTimeout);
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(2));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.outcome, AnalysisOutcome::TransientFailure);
            assert!(result.text.contains("재시도 소진"));
        }
        // 샘플당 3회 시도
        assert_eq!(vision.call_count(), 6);
    }

    #[tokio::test]
    async fn terminal_failure_not_retried() {
        let frames = make_frames(3);
        let samples = sample_frames(&frames, 3);
        let vision = MockVision::new(Behavior::AlwaysAuth);
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(1));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.outcome, AnalysisOutcome::TerminalFailure);
            assert!(result.text.contains("분석 불가"));
        }
        // 터미널 오류는 재시도 없이 샘플당 1회
        assert_eq!(vision.call_count(), 3);
    }

    #[tokio::test]
    async fn one_bad_frame_does_not_stop_batch() {
        let frames = make_frames(5);
        let samples = sample_frames(&frames, 5);
        let vision = MockVision::new(Behavior::FailNth(2));
        // 순차 실행으로 호출 순번 == 샘플 순번 보장
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(1));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert_eq!(results.len(), 5);
        assert_eq!(results[1].outcome, AnalysisOutcome::TerminalFailure);
        let successes = results.iter().filter(|r| r.is_success()).count();
        assert_eq!(successes, 4);
        // 순서는 그대로
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.sample_index, i);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_recovers_before_attempts_exhausted() {
        let frames = make_frames(1);
        let samples = sample_frames(&frames, 1);
        let vision = MockVision::new(Behavior::TransientFirst(2));
        let analyzer = FrameAnalyzer::new(vision.clone(), &test_config(1));

        let results = analyzer.analyze(&samples, "프롬프트").await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());
        assert_eq!(vision.call_count(), 3);
    }
}
