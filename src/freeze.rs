//! 冻结会话
//!
//! 挂起目标程序，倒计时结束（或收到中断）后恢复

use crate::config::MAX_EXTRA_MILLIS;
use crate::core::{FreezeState, Target};
use crate::settings::Settings;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 一次冻结的时间安排
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePlan {
    /// 冻结时长
    pub duration: Duration,
    /// 倒计时刷新间隔
    pub refresh: Duration,
    /// 挂起前的等待
    pub lock_delay: Duration,
}

impl FreezePlan {
    /// 根据配置生成计划；未指定固定时长时在暂停窗口内随机取值
    pub fn from_settings(settings: &Settings, rng: &mut impl Rng) -> Self {
        let duration = settings
            .fixed_pause
            .unwrap_or_else(|| random_pause(settings, rng));

        Self {
            duration,
            refresh: settings.refresh,
            lock_delay: settings.lock_delay,
        }
    }
}

fn random_pause(settings: &Settings, rng: &mut impl Rng) -> Duration {
    let window = settings.window;
    let secs = if window.min_secs < window.max_secs {
        rng.gen_range(window.min_secs..window.max_secs)
    } else {
        window.min_secs
    };
    let millis = rng.gen_range(0..MAX_EXTRA_MILLIS);
    Duration::from_secs(secs) + Duration::from_millis(millis)
}

/// 冻结报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeReport {
    pub target: String,
    pub processes: usize,
    pub threads: usize,
    pub planned: Duration,
    pub frozen_for: Duration,
    pub suspended: bool,
    pub resumed: bool,
    pub interrupted: bool,
    /// 首个失败进程的 PID
    pub failed_pid: Option<u32>,
}

impl FreezeReport {
    pub fn succeeded(&self) -> bool {
        self.suspended && self.resumed
    }
}

/// 执行一次完整的冻结：等待、挂起、倒计时、恢复
///
/// `on_tick` 在每次刷新时收到剩余时间。`interrupt` 被置位后立即恢复。
/// 挂起失败时会立即尝试恢复，避免程序停留在部分挂起状态。
pub fn run(
    target: &mut Target,
    plan: &FreezePlan,
    interrupt: &AtomicBool,
    mut on_tick: impl FnMut(Duration),
) -> FreezeReport {
    let mut report = FreezeReport {
        target: target.name().to_string(),
        processes: target.processes().len(),
        threads: target.thread_count(),
        planned: plan.duration,
        frozen_for: Duration::ZERO,
        suspended: false,
        resumed: false,
        interrupted: false,
        failed_pid: None,
    };

    if !wait_interruptibly(plan.lock_delay, plan.refresh, interrupt) {
        report.interrupted = true;
        info!(target_name = target.name(), "interrupted before suspending");
        return report;
    }

    let started = Instant::now();
    let sweep = target.suspend_report();
    report.suspended = sweep.succeeded();

    if let Some(index) = sweep.failed_at {
        report.failed_pid = target.processes().get(index).map(|p| p.id());
        warn!(
            target_name = target.name(),
            "suspend failed, resuming whatever was already suspended"
        );
    } else {
        info!(
            target_name = target.name(),
            planned_ms = plan.duration.as_millis() as u64,
            "target suspended"
        );

        loop {
            let elapsed = started.elapsed();
            if elapsed >= plan.duration {
                break;
            }
            if interrupt.load(Ordering::SeqCst) {
                report.interrupted = true;
                break;
            }
            let remaining = plan.duration - elapsed;
            thread::sleep(remaining.min(plan.refresh));
            on_tick(plan.duration.saturating_sub(started.elapsed()));
        }
    }

    let resume = target.resume_report();
    report.resumed = resume.succeeded();
    report.frozen_for = started.elapsed();
    if report.failed_pid.is_none() {
        if let Some(index) = resume.failed_at {
            report.failed_pid = target.processes().get(index).map(|p| p.id());
        }
    }
    on_tick(Duration::ZERO);

    if target.state() == FreezeState::Resumed {
        info!(
            target_name = target.name(),
            frozen_ms = report.frozen_for.as_millis() as u64,
            interrupted = report.interrupted,
            "target resumed"
        );
    } else {
        warn!(target_name = target.name(), "resume did not complete");
    }

    report
}

/// 等待指定时长；期间收到中断返回 false
fn wait_interruptibly(total: Duration, step: Duration, interrupt: &AtomicBool) -> bool {
    let started = Instant::now();
    loop {
        if interrupt.load(Ordering::SeqCst) {
            return false;
        }
        let elapsed = started.elapsed();
        if elapsed >= total {
            return true;
        }
        thread::sleep((total - elapsed).min(step));
    }
}

/// 以 ss.ff 格式显示剩余时间
pub fn format_remaining(remaining: Duration) -> String {
    let centis = remaining.as_millis() / 10;
    format!("{:02}.{:02}", centis / 100, centis % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::simulated::SimulatedOs;
    use crate::settings::PauseWindow;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn quick_plan(duration_ms: u64) -> FreezePlan {
        FreezePlan {
            duration: Duration::from_millis(duration_ms),
            refresh: Duration::from_millis(5),
            lock_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_random_plan_stays_in_window() {
        let settings = Settings::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let plan = FreezePlan::from_settings(&settings, &mut rng);
            assert!(plan.duration >= Duration::from_secs(9));
            assert!(plan.duration < Duration::from_secs(11));
            assert_eq!(plan.refresh, Duration::from_millis(75));
        }
    }

    #[test]
    fn test_degenerate_window_uses_min() {
        let settings = Settings {
            window: PauseWindow {
                min_secs: 3,
                max_secs: 3,
            },
            ..Settings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let plan = FreezePlan::from_settings(&settings, &mut rng);
        assert!(plan.duration >= Duration::from_secs(3));
        assert!(plan.duration < Duration::from_secs(4));
    }

    #[test]
    fn test_fixed_pause_wins() {
        let settings = Settings {
            fixed_pause: Some(Duration::from_millis(1234)),
            ..Settings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let plan = FreezePlan::from_settings(&settings, &mut rng);
        assert_eq!(plan.duration, Duration::from_millis(1234));
    }

    #[test]
    fn test_full_cycle_thaws_target() {
        let os = Arc::new(SimulatedOs::new().with_process("Foo", 1, &[10, 11]));
        let mut target = Target::attach("Foo", os.clone()).unwrap();
        let interrupt = AtomicBool::new(false);
        let mut ticks = Vec::new();

        let report = run(&mut target, &quick_plan(30), &interrupt, |left| ticks.push(left));

        assert!(report.succeeded());
        assert!(!report.interrupted);
        assert!(report.frozen_for >= Duration::from_millis(30));
        assert_eq!(os.suspend_log(), vec![10, 11]);
        assert_eq!(os.count_of(10), 0);
        assert_eq!(os.count_of(11), 0);
        assert_eq!(ticks.last(), Some(&Duration::ZERO));
    }

    #[test]
    fn test_interrupt_resumes_early() {
        let os = Arc::new(SimulatedOs::new().with_process("Foo", 1, &[10]));
        let mut target = Target::attach("Foo", os.clone()).unwrap();
        let interrupt = AtomicBool::new(false);

        let report = run(&mut target, &quick_plan(60_000), &interrupt, |_| {
            interrupt.store(true, Ordering::SeqCst)
        });

        assert!(report.interrupted);
        assert!(report.resumed);
        assert!(report.frozen_for < Duration::from_secs(5));
        assert_eq!(os.count_of(10), 0);
    }

    #[test]
    fn test_interrupt_during_lock_delay_never_suspends() {
        let os = Arc::new(SimulatedOs::new().with_process("Foo", 1, &[10]));
        let mut target = Target::attach("Foo", os.clone()).unwrap();
        let interrupt = AtomicBool::new(true);
        let plan = FreezePlan {
            lock_delay: Duration::from_secs(5),
            ..quick_plan(10)
        };

        let report = run(&mut target, &plan, &interrupt, |_| {});
        assert!(report.interrupted);
        assert!(!report.suspended);
        assert!(os.suspend_log().is_empty());
    }

    #[test]
    fn test_failed_suspend_is_rolled_back() {
        let os = Arc::new(
            SimulatedOs::new()
                .with_process("Foo", 1, &[10])
                .with_process("Foo", 2, &[20]),
        );
        os.refuse_open(20);
        let mut target = Target::attach("Foo", os.clone()).unwrap();
        let interrupt = AtomicBool::new(false);

        let report = run(&mut target, &quick_plan(60_000), &interrupt, |_| {});
        assert!(!report.suspended);
        assert!(!report.succeeded());
        assert_eq!(report.failed_pid, Some(2));
        assert_eq!(os.count_of(10), 0, "partially suspended process is thawed");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_millis(9_870)), "09.87");
        assert_eq!(format_remaining(Duration::ZERO), "00.00");
        assert_eq!(format_remaining(Duration::from_millis(10_005)), "10.00");
    }
}
