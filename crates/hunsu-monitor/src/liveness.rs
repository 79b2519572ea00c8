//! 프로세스 생존 탐지.
//!
//! `ProcessProbe` 포트 구현. 프로세스 목록을 시점 조회해서
//! 대상 이름이 실행 중인지 확인한다.

use async_trait::async_trait;
use hunsu_core::config::UNKNOWN_EXECUTABLE;
use hunsu_core::error::CoreError;
use hunsu_core::ports::process_probe::ProcessProbe;
use std::sync::Mutex;
use sysinfo::System;
use tracing::{debug, warn};

/// 프로세스 생존 탐지기 — `ProcessProbe` 포트 구현
///
/// 대조는 대소문자 무시 부분 일치다: "game"은 "Game.exe"와 "mygame"
/// 모두에 일치한다. 실행 파일명 표기가 플랫폼마다 달라서 정확 일치는
/// 오탐지(미탐)가 잦다.
pub struct ProcessLivenessProbe {
    sys: Mutex<System>,
}

impl ProcessLivenessProbe {
    /// 새 생존 탐지기 생성
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new_all()),
        }
    }

    /// 프로세스 목록 갱신 후 이름 대조.
    /// 잠금 실패 등 메커니즘 에러는 호출자가 false로 수렴시킨다.
    fn query(&self, needle: &str) -> Result<bool, CoreError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CoreError::Internal(format!("시스템 잠금 실패: {e}")))?;
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let needle_lower = needle.to_lowercase();
        let found = sys.processes().values().any(|p| {
            p.name()
                .to_string_lossy()
                .to_lowercase()
                .contains(&needle_lower)
        });
        Ok(found)
    }
}

impl Default for ProcessLivenessProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessProbe for ProcessLivenessProbe {
    async fn is_running(&self, process_name: &str) -> bool {
        let name = process_name.trim();

        // 검증 불가 — 낙관적 진행
        if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_EXECUTABLE) {
            debug!("프로세스명 미지정/센티널 — 생존 탐지 생략");
            return true;
        }

        match self.query(name) {
            Ok(found) => {
                debug!("생존 탐지: {name} → {found}");
                found
            }
            Err(e) => {
                // 탐지 실패는 캡처 루프를 죽이지 않는다
                warn!("생존 탐지 실패, 미실행으로 간주: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unverifiable_names_are_optimistic() {
        let probe = ProcessLivenessProbe::new();
        assert!(probe.is_running("").await);
        assert!(probe.is_running("   ").await);
        assert!(probe.is_running("unknown").await);
        assert!(probe.is_running("UNKNOWN").await);
    }

    #[tokio::test]
    async fn absent_process_not_running() {
        let probe = ProcessLivenessProbe::new();
        assert!(
            !probe
                .is_running("hunsu-definitely-absent-process-xyz.exe")
                .await
        );
    }

    #[tokio::test]
    async fn finds_own_process_case_insensitive() {
        let mut sys = System::new_all();
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
        let pid = sysinfo::get_current_pid().expect("현재 PID 조회 실패");
        let own_name = sys
            .process(pid)
            .expect("자기 프로세스는 목록에 있어야 함")
            .name()
            .to_string_lossy()
            .to_string();

        let probe = ProcessLivenessProbe::new();
        assert!(probe.is_running(&own_name).await);
        assert!(probe.is_running(&own_name.to_uppercase()).await);
    }
}
