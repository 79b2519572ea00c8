//! 캡처 세션.
//!
//! 프레임 소스를 페이싱 루프로 구동해서 순서 있는 프레임 시퀀스를
//! 생산한다. 상태 전이:
//!
//! Idle → Probing → (WaitingForGame →) Capturing → Completed | Aborted
//!
//! 페이싱은 모노토닉 클록 기반 interval로, 고정 sleep 누적 드리프트를
//! 피한다. 캡처 1회 실패는 스킵일 뿐 세션을 멈추지 않는다.
//! 게이트 대기 시간은 캡처 시간에 포함되지 않는다 — 캡처 클록은
//! Capturing 진입 시점에 시작한다.

use hunsu_core::config::{CaptureConfig, ProcessGatePolicy};
use hunsu_core::models::frame::Frame;
use hunsu_core::ports::frame_source::FrameSource;
use hunsu_core::ports::process_probe::ProcessProbe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 시작 전
    Idle,
    /// 게임 프로세스 생존 확인 중
    Probing,
    /// fail-closed 정책으로 프로세스 출현 대기 중
    WaitingForGame,
    /// 캡처 루프 실행 중
    Capturing,
    /// 설정 시간 경과로 정상 종료
    Completed,
    /// 게이트/정책에 의한 중단
    Aborted,
}

/// 세션 종료 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// 설정 시간을 모두 채우고 종료 (프레임 0장이어도 Completed)
    Completed,
    /// 중단 — 사유 포함
    Aborted {
        /// 사람이 읽을 중단 사유
        reason: String,
    },
}

/// 세션 실행 결과
#[derive(Debug)]
pub struct CaptureOutcome {
    /// 캡처 순서대로 인덱스가 붙은 프레임들 (0부터 빈틈 없이)
    pub frames: Vec<Frame>,
    /// 종료 방식
    pub end: SessionEnd,
    /// 캡처 시도 횟수
    pub attempted: u64,
    /// 실패(스킵)한 시도 횟수
    pub failed: u64,
    /// Capturing 상태에서 보낸 시간 (게이트 대기 제외)
    pub elapsed: Duration,
}

/// 캡처 세션 — 단일 쓰기 주체 캡처 루프
///
/// `run`이 self를 소비하므로 한 세션은 정확히 한 번 실행된다.
/// 프레임 시퀀스는 결과로 이동(move)되고, 세션이 잡고 있던 리소스는
/// 모든 종료 경로에서 스코프 이탈로 정확히 한 번 해제된다.
pub struct CaptureSession {
    config: CaptureConfig,
    source: Arc<dyn FrameSource>,
    probe: Arc<dyn ProcessProbe>,
    progress_tx: Option<watch::Sender<f32>>,
    state: SessionState,
}

impl CaptureSession {
    /// 새 캡처 세션 생성. `config`는 호출 전에 검증되어 있어야 한다.
    pub fn new(
        config: CaptureConfig,
        source: Arc<dyn FrameSource>,
        probe: Arc<dyn ProcessProbe>,
    ) -> Self {
        Self {
            config,
            source,
            probe,
            progress_tx: None,
            state: SessionState::Idle,
        }
    }

    /// 진행률(0~100) 발행 채널 연결 (관측용 — 동작에는 영향 없음)
    pub fn with_progress(mut self, tx: watch::Sender<f32>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// 현재 상태
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!("세션 상태 전이: {:?} → {:?}", self.state, next);
        self.state = next;
    }

    /// 세션 실행: 게이트 확인 → 캡처 루프 → 결과 반환.
    pub async fn run(mut self) -> CaptureOutcome {
        self.transition(SessionState::Probing);

        if let Some(target) = self.config.gate_target().map(str::to_owned) {
            if !self.probe.is_running(&target).await {
                match self.config.gate_policy {
                    ProcessGatePolicy::WarnAndProceed => {
                        warn!("게임 프로세스 미탐지, 정책에 따라 캡처 진행: {target}");
                    }
                    ProcessGatePolicy::FailClosed => {
                        info!(
                            "게임 프로세스 대기: {target} (한도 {}초)",
                            self.config.process_wait_timeout_secs
                        );
                        self.transition(SessionState::WaitingForGame);
                        if !self.wait_for_process(&target).await {
                            self.transition(SessionState::Aborted);
                            let reason = format!(
                                "게임 프로세스 대기 한도 초과: {target} ({}초)",
                                self.config.process_wait_timeout_secs
                            );
                            warn!("{reason}");
                            return CaptureOutcome {
                                frames: Vec::new(),
                                end: SessionEnd::Aborted { reason },
                                attempted: 0,
                                failed: 0,
                                elapsed: Duration::ZERO,
                            };
                        }
                        info!("게임 프로세스 탐지됨: {target}");
                    }
                }
            }
        }

        self.transition(SessionState::Capturing);
        self.capture_loop().await
    }

    /// 프로세스 출현 대기. 재탐지 주기로 폴링하고 대기 한도에서 포기한다.
    /// true = 탐지 성공, false = 한도 초과.
    async fn wait_for_process(&self, target: &str) -> bool {
        let deadline = Instant::now() + self.config.process_wait_timeout();
        let mut reprobe = tokio::time::interval(self.config.reprobe_interval());
        reprobe.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // 첫 tick은 즉시 발화 — 방금 탐지에 실패했으므로 버린다
        reprobe.tick().await;

        loop {
            tokio::select! {
                _ = reprobe.tick() => {
                    if self.probe.is_running(target).await {
                        return true;
                    }
                    debug!("재탐지 실패, 계속 대기: {target}");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return false;
                }
            }
        }
    }

    /// 페이싱 캡처 루프. 종료 조건은 설정 시간 경과(또는 중도 게이트 상실)뿐이다.
    async fn capture_loop(mut self) -> CaptureOutcome {
        let duration = self.config.duration();
        let capture_timeout = self.config.capture_timeout();
        let reprobe_interval = self.config.reprobe_interval();

        info!(
            "캡처 시작: {}초 @ {:.1}fps (간격 {}ms)",
            self.config.duration_secs,
            self.config.target_fps,
            self.config.frame_interval().as_millis()
        );

        let started = Instant::now();
        let deadline = started + duration;

        let mut frames: Vec<Frame> = Vec::new();
        let mut attempted: u64 = 0;
        let mut failed: u64 = 0;
        let mut last_probe = started;

        let mut ticker = tokio::time::interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline_sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline_sleep);

        let end = loop {
            tokio::select! {
                _ = &mut deadline_sleep => {
                    break SessionEnd::Completed;
                }
                _ = ticker.tick() => {
                    // tick과 deadline이 같은 시점에 준비되면 종료가 우선
                    if Instant::now() >= deadline {
                        break SessionEnd::Completed;
                    }

                    // 중도 생존 재탐지 (재탐지 주기 간격으로)
                    if let Some(target) = self.config.gate_target() {
                        if last_probe.elapsed() >= reprobe_interval {
                            last_probe = Instant::now();
                            if !self.probe.is_running(target).await {
                                match self.config.gate_policy {
                                    ProcessGatePolicy::FailClosed => {
                                        let reason =
                                            format!("게임 프로세스 중도 종료: {target}");
                                        warn!("{reason} — 세션 중단");
                                        break SessionEnd::Aborted { reason };
                                    }
                                    ProcessGatePolicy::WarnAndProceed => {
                                        warn!("게임 프로세스 미탐지 — 캡처 계속: {target}");
                                    }
                                }
                            }
                        }
                    }

                    attempted += 1;
                    let offset = started.elapsed();

                    match tokio::time::timeout(capture_timeout, self.source.capture_once()).await {
                        Ok(Ok(pixels)) if !pixels.is_empty() => {
                            frames.push(Frame {
                                index: frames.len() as u64,
                                offset,
                                captured_at: chrono::Utc::now(),
                                pixels,
                            });
                        }
                        Ok(Ok(_)) => {
                            failed += 1;
                            warn!("빈 프레임 수신 — 스킵");
                        }
                        Ok(Err(e)) => {
                            failed += 1;
                            warn!("캡처 실패 — 스킵: {e}");
                        }
                        Err(_) => {
                            failed += 1;
                            warn!(
                                "캡처 타임아웃({}ms) — 스킵",
                                capture_timeout.as_millis()
                            );
                        }
                    }

                    self.publish_progress(started.elapsed(), duration);
                }
            }
        };

        let elapsed = started.elapsed().min(duration);

        match &end {
            SessionEnd::Completed => {
                self.transition(SessionState::Completed);
                self.publish_progress(duration, duration);
                info!(
                    "캡처 완료: {}장 성공, {}장 스킵 ({}회 시도, {:.1}초)",
                    frames.len(),
                    failed,
                    attempted,
                    elapsed.as_secs_f64()
                );
            }
            SessionEnd::Aborted { reason } => {
                self.transition(SessionState::Aborted);
                warn!("캡처 중단: {reason} ({}장 캡처됨)", frames.len());
            }
        }

        CaptureOutcome {
            frames,
            end,
            attempted,
            failed,
            elapsed,
        }
    }

    fn publish_progress(&self, elapsed: Duration, duration: Duration) {
        if let Some(tx) = &self.progress_tx {
            let pct = ((elapsed.as_secs_f64() / duration.as_secs_f64()) * 100.0).min(100.0);
            let _ = tx.send(pct as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hunsu_core::config::CaptureRegion;
    use hunsu_core::error::CoreError;
    use hunsu_core::models::frame::PixelBuffer;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 호출 횟수를 세는 모의 프레임 소스
    struct MockSource {
        calls: AtomicU32,
        /// n의 배수 번째 호출을 실패시킴 (None이면 항상 성공)
        fail_every: Option<u32>,
        /// true면 응답 대신 오래 잠들어 타임아웃 유발
        hang: bool,
    }

    impl MockSource {
        fn ok() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_every: None,
                hang: false,
            }
        }

        fn failing_every(n: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_every: Some(n),
                hang: false,
            }
        }

        fn hanging() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_every: None,
                hang: true,
            }
        }
    }

    #[async_trait]
    impl FrameSource for MockSource {
        async fn capture_once(&self) -> Result<PixelBuffer, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.hang {
                tokio::time::sleep(Duration::from_secs(600)).await;
            }
            if let Some(every) = self.fail_every {
                if n % every == 0 {
                    return Err(CoreError::Capture("모의 캡처 실패".to_string()));
                }
            }
            Ok(PixelBuffer::new(4, 4, vec![0u8; 64]).unwrap())
        }
    }

    /// 호출 순번대로 대본을 따라 답하는 모의 생존 탐지기
    struct ScriptedProbe {
        calls: AtomicU32,
        script: Vec<bool>,
        default: bool,
    }

    impl ScriptedProbe {
        fn new(script: Vec<bool>, default: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script,
                default,
            }
        }

        fn always(value: bool) -> Self {
            Self::new(Vec::new(), value)
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProcessProbe for ScriptedProbe {
        async fn is_running(&self, _process_name: &str) -> bool {
            let i = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            self.script.get(i).copied().unwrap_or(self.default)
        }
    }

    fn test_config(duration_secs: u64, target_fps: f64) -> CaptureConfig {
        CaptureConfig {
            region: CaptureRegion::default(),
            target_fps,
            duration_secs,
            target_process: None,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn paced_loop_frame_count() {
        // 10초 @ 10fps, 항상 성공하는 소스 → 프레임 수 [90, 101], ceil 한도 100 이하
        let config = test_config(10, 10.0);
        let session = CaptureSession::new(
            config,
            Arc::new(MockSource::ok()),
            Arc::new(ScriptedProbe::always(true)),
        );

        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!(
            (90..=100).contains(&outcome.frames.len()),
            "프레임 수: {}",
            outcome.frames.len()
        );
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.attempted, outcome.frames.len() as u64);

        // 인덱스는 0부터 빈틈 없이 증가
        for (i, frame) in outcome.frames.iter().enumerate() {
            assert_eq!(frame.index, i as u64);
        }
        // 오프셋은 단조 증가
        assert!(outcome
            .frames
            .windows(2)
            .all(|w| w[0].offset <= w[1].offset));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_captures_are_skipped() {
        // 3의 배수 번째 캡처가 실패해도 루프는 계속, 인덱스는 빈틈 없음
        let source = Arc::new(MockSource::failing_every(3));
        let config = test_config(2, 10.0);
        let session =
            CaptureSession::new(config, source, Arc::new(ScriptedProbe::always(true)));

        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!(outcome.failed > 0);
        assert!(!outcome.frames.is_empty());
        assert_eq!(
            outcome.attempted,
            outcome.frames.len() as u64 + outcome.failed
        );
        for (i, frame) in outcome.frames.iter().enumerate() {
            assert_eq!(frame.index, i as u64);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_capture_times_out_and_skips() {
        // 응답 없는 소스는 타임아웃 실패로 스킵되고 세션은 정상 종료
        let mut config = test_config(1, 10.0);
        config.capture_timeout_ms = 50;
        let session = CaptureSession::new(
            config,
            Arc::new(MockSource::hanging()),
            Arc::new(ScriptedProbe::always(true)),
        );

        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!(outcome.frames.is_empty());
        assert!(outcome.attempted > 0);
        assert_eq!(outcome.failed, outcome.attempted);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_closed_aborts_after_wait_timeout() {
        let probe = Arc::new(ScriptedProbe::always(false));
        let mut config = test_config(10, 10.0);
        config.target_process = Some("game.exe".to_string());
        config.gate_policy = ProcessGatePolicy::FailClosed;
        config.reprobe_interval_secs = 5;
        config.process_wait_timeout_secs = 12;

        let session = CaptureSession::new(config, Arc::new(MockSource::ok()), probe.clone());
        let outcome = session.run().await;

        assert!(matches!(outcome.end, SessionEnd::Aborted { ref reason } if reason.contains("대기 한도")));
        assert!(outcome.frames.is_empty());
        assert_eq!(outcome.elapsed, Duration::ZERO);
        // 최초 1회 + 5초/10초 재탐지 2회
        assert_eq!(probe.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_closed_wait_does_not_consume_duration() {
        // 세 번째 탐지에서 프로세스 출현 → 전체 2초 캡처가 온전히 수행됨
        let probe = Arc::new(ScriptedProbe::new(vec![false, false], true));
        let mut config = test_config(2, 10.0);
        config.target_process = Some("game.exe".to_string());
        config.gate_policy = ProcessGatePolicy::FailClosed;
        config.reprobe_interval_secs = 5;
        config.process_wait_timeout_secs = 60;

        let session = CaptureSession::new(config, Arc::new(MockSource::ok()), probe.clone());
        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        // 대기 10초 후에도 캡처 시간 2초를 전부 사용 (≈20장)
        assert!(
            (18..=21).contains(&outcome.frames.len()),
            "프레임 수: {}",
            outcome.frames.len()
        );
        assert!(outcome.elapsed <= Duration::from_millis(2_200));
        assert_eq!(probe.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn warn_and_proceed_captures_without_process() {
        let probe = Arc::new(ScriptedProbe::always(false));
        let mut config = test_config(1, 10.0);
        config.target_process = Some("game.exe".to_string());
        config.gate_policy = ProcessGatePolicy::WarnAndProceed;

        let session = CaptureSession::new(config, Arc::new(MockSource::ok()), probe);
        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!((9..=11).contains(&outcome.frames.len()));
    }

    #[tokio::test(start_paused = true)]
    async fn mid_run_process_loss_aborts_fail_closed() {
        // 최초 탐지 성공, 이후 상실 → 재탐지 주기에서 중단
        let probe = Arc::new(ScriptedProbe::new(vec![true], false));
        let mut config = test_config(10, 10.0);
        config.target_process = Some("game.exe".to_string());
        config.gate_policy = ProcessGatePolicy::FailClosed;
        config.reprobe_interval_secs = 1;

        let session = CaptureSession::new(config, Arc::new(MockSource::ok()), probe);
        let outcome = session.run().await;

        assert!(matches!(outcome.end, SessionEnd::Aborted { ref reason } if reason.contains("중도 종료")));
        // 중단 전까지 캡처한 프레임은 존재
        assert!(!outcome.frames.is_empty());
        assert!(outcome.frames.len() < 20, "프레임 수: {}", outcome.frames.len());
        assert!(outcome.elapsed < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_reaches_completion() {
        let (tx, rx) = watch::channel(0.0f32);
        let config = test_config(1, 10.0);
        let session = CaptureSession::new(
            config,
            Arc::new(MockSource::ok()),
            Arc::new(ScriptedProbe::always(true)),
        )
        .with_progress(tx);

        let outcome = session.run().await;

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert_eq!(*rx.borrow(), 100.0);
    }
}
