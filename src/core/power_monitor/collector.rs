//! The power collector loop.
//!
//! One dedicated thread repeatedly fetches the battery report, parses it,
//! merges the result into the shared snapshot, refreshes the slow fields
//! every 30 seconds, notifies the consumer and sleeps for the interval of
//! the current sampling mode.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::{Condvar, Mutex};

use crate::error::{Result, VoltError};

use super::command::{CommandRunner, DiagnosticCommand};
use super::extract::{BatteryReading, SlowReading};
use super::notifier::ChangeNotifier;
use super::state::SharedSnapshot;

pub const DEFAULT_SLOW_PATH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the collector loop
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// How often condition and low power mode are refreshed.
    pub slow_path_interval: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            slow_path_interval: DEFAULT_SLOW_PATH_INTERVAL,
        }
    }
}

/// Cooperative stop flag that can also cut a sleep short.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        let (flag, wake) = &*self.inner;
        *flag.lock() = true;
        wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `duration` unless stopped first. Returns true if stopped.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut stopped = flag.lock();
        while !*stopped {
            if wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }
}

/// Collects power metrics into a [`SharedSnapshot`].
pub struct PowerCollector<R: CommandRunner> {
    runner: R,
    snapshot: SharedSnapshot,
    notifier: Box<dyn ChangeNotifier>,
    config: CollectorConfig,
    last_slow_check: Option<Instant>,
    cycles: u64,
}

impl<R: CommandRunner> PowerCollector<R> {
    pub fn new(
        runner: R,
        snapshot: SharedSnapshot,
        notifier: impl ChangeNotifier + 'static,
    ) -> Self {
        Self::with_config(runner, snapshot, notifier, CollectorConfig::default())
    }

    pub fn with_config(
        runner: R,
        snapshot: SharedSnapshot,
        notifier: impl ChangeNotifier + 'static,
        config: CollectorConfig,
    ) -> Self {
        Self {
            runner,
            snapshot,
            notifier: Box::new(notifier),
            config,
            last_slow_check: None,
            cycles: 0,
        }
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one fetch, parse, update and notify pass.
    ///
    /// Returns how long to sleep before the next cycle, read from the
    /// snapshot after the update so a mode change made during the cycle
    /// applies to this sleep.
    pub fn run_cycle(&mut self) -> Duration {
        let text = self.runner.run_diagnostic(&DiagnosticCommand::BATTERY_INFO);
        let reading = BatteryReading::parse(&text);

        let now = Utc::now();
        let applied = self.snapshot.update(|s| s.apply_reading(&reading, now));
        if !applied {
            log::debug!("Battery report had no readable fields, keeping previous values");
        }

        if self.slow_path_due() {
            self.run_slow_path();
        }

        self.notify();
        self.cycles += 1;

        let interval = self.snapshot.poll_interval();
        log::trace!("Cycle {} done, sleeping {:?}", self.cycles, interval);
        interval
    }

    fn slow_path_due(&self) -> bool {
        self.last_slow_check
            .map_or(true, |last| last.elapsed() >= self.config.slow_path_interval)
    }

    /// Refresh condition and low power mode, then restart the slow timer.
    pub fn run_slow_path(&mut self) {
        let profile = self.runner.run_diagnostic(&DiagnosticCommand::POWER_PROFILE);
        let settings = self.runner.run_diagnostic(&DiagnosticCommand::POWER_SETTINGS);
        let reading = SlowReading::parse(&profile, &settings);

        self.snapshot.update(|s| s.apply_slow_reading(&reading));
        self.last_slow_check = Some(Instant::now());
    }

    fn notify(&self) {
        if let Err(e) = self.notifier.notify() {
            log::debug!("Change notifier failed: {:#}", e);
        }
    }

    /// Loop until `stop` is signalled. The flag is checked before every fetch.
    pub fn run(mut self, stop: &StopSignal) {
        log::info!(
            "Power collector started ({} mode)",
            self.snapshot.mode()
        );

        while !stop.is_stopped() {
            let interval = self.run_cycle();
            if stop.sleep(interval) {
                break;
            }
        }

        log::info!("Power collector stopped after {} cycles", self.cycles);
    }
}

impl<R: CommandRunner + 'static> PowerCollector<R> {
    /// Start the loop on its own thread.
    pub fn spawn(self) -> Result<CollectorHandle> {
        let stop = StopSignal::new();
        let thread_stop = stop.clone();

        let thread = thread::Builder::new()
            .name("power-collector".to_string())
            .spawn(move || self.run(&thread_stop))?;

        Ok(CollectorHandle {
            stop,
            thread: Some(thread),
        })
    }
}

/// Handle to a running collector thread.
///
/// Dropping the handle asks the collector to stop without waiting for it.
pub struct CollectorHandle {
    stop: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl CollectorHandle {
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Stop the collector and wait for its thread to exit.
    pub fn join(mut self) -> Result<()> {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| VoltError::collector("Collector thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for CollectorHandle {
    fn drop(&mut self) {
        self.stop.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::power_monitor::{NoopNotifier, SamplingMode, TimeRemaining};
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Hook = Arc<dyn Fn(&str) + Send + Sync>;

    /// Returns canned output per program and records every call.
    #[derive(Clone, Default)]
    struct ScriptedRunner {
        outputs: HashMap<&'static str, String>,
        calls: Arc<Mutex<Vec<String>>>,
        on_run: Option<Hook>,
    }

    impl ScriptedRunner {
        fn with_output(mut self, program: &'static str, output: &str) -> Self {
            self.outputs.insert(program, output.to_string());
            self
        }

        fn calls_to(&self, program: &str) -> usize {
            self.calls.lock().iter().filter(|p| *p == program).count()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, _args: &[&str]) -> String {
            self.calls.lock().push(program.to_string());
            if let Some(hook) = &self.on_run {
                hook(program);
            }
            self.outputs.get(program).cloned().unwrap_or_default()
        }
    }

    const BATTERY: &str = r#"
      "ExternalConnected" = No
      "IsCharging" = No
      "FullyCharged" = No
      "CurrentCapacity" = 64
      "TimeRemaining" = 245
      "Temperature" = 3012
      "Voltage" = 11800
      "InstantAmperage" = 18446744073709550116
      "CycleCount" = 312
      "DesignCapacity" = 5000
      "AppleRawMaxCapacity" = 4500
"#;

    fn runner() -> ScriptedRunner {
        ScriptedRunner::default()
            .with_output("ioreg", BATTERY)
            .with_output("system_profiler", "Condition: Normal")
            .with_output("pmset", " lowpowermode         1")
    }

    #[test]
    fn test_cycle_updates_snapshot() {
        let shared = SharedSnapshot::default();
        let mut collector = PowerCollector::new(runner(), shared.clone(), NoopNotifier);

        let sleep = collector.run_cycle();

        let snapshot = shared.snapshot();
        assert_eq!(sleep, Duration::from_secs(2));
        assert_eq!(snapshot.battery_percent, 64);
        assert_eq!(snapshot.amperage_ma, -1500);
        assert_eq!(snapshot.power_watts, 17.7);
        assert_eq!(snapshot.power_history.latest(), 17.7);
        assert_eq!(
            snapshot.time_remaining,
            TimeRemaining::Remaining {
                hours: 4,
                minutes: 5
            }
        );
        assert_eq!(snapshot.max_capacity_percent, 90.0);
        assert_eq!(snapshot.condition, "Normal");
        assert!(snapshot.low_power_mode);
        assert!(snapshot.last_update.is_some());
        assert_eq!(collector.cycles(), 1);
    }

    #[test]
    fn test_slow_path_runs_first_cycle_then_waits() {
        let runner = runner();
        let probe = runner.clone();
        let mut collector = PowerCollector::new(runner, SharedSnapshot::default(), NoopNotifier);

        collector.run_cycle();
        collector.run_cycle();
        collector.run_cycle();

        assert_eq!(probe.calls_to("ioreg"), 3);
        assert_eq!(probe.calls_to("system_profiler"), 1);
        assert_eq!(probe.calls_to("pmset"), 1);
    }

    #[test]
    fn test_slow_path_repeats_after_interval() {
        let runner = runner();
        let probe = runner.clone();
        let config = CollectorConfig {
            slow_path_interval: Duration::ZERO,
        };
        let mut collector =
            PowerCollector::with_config(runner, SharedSnapshot::default(), NoopNotifier, config);

        collector.run_cycle();
        collector.run_cycle();

        assert_eq!(probe.calls_to("system_profiler"), 2);
    }

    #[test]
    fn test_empty_output_leaves_snapshot_untouched() {
        let shared = SharedSnapshot::default();
        let mut warm = PowerCollector::new(runner(), shared.clone(), NoopNotifier);
        warm.run_cycle();
        let before = shared.snapshot();

        let config = CollectorConfig {
            slow_path_interval: Duration::from_secs(3600),
        };
        let mut cold =
            PowerCollector::with_config(ScriptedRunner::default(), shared.clone(), NoopNotifier, config);
        cold.last_slow_check = Some(Instant::now());
        cold.run_cycle();

        assert_eq!(shared.snapshot(), before);
    }

    #[test]
    fn test_failed_slow_path_keeps_condition() {
        let shared = SharedSnapshot::default();
        shared.update(|s| s.condition = "Normal".to_string());

        let runner = ScriptedRunner::default().with_output("ioreg", BATTERY);
        let mut collector = PowerCollector::new(runner, shared.clone(), NoopNotifier);
        collector.run_cycle();

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.condition, "Normal");
        assert!(!snapshot.low_power_mode);
    }

    #[test]
    fn test_notifier_called_once_per_cycle() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut collector = PowerCollector::new(runner(), SharedSnapshot::default(), move || -> anyhow::Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        for _ in 0..4 {
            collector.run_cycle();
        }
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_notifier_failure_is_swallowed() {
        let shared = SharedSnapshot::default();
        let mut collector = PowerCollector::new(runner(), shared.clone(), || -> anyhow::Result<()> {
            Err(anyhow!("consumer not ready"))
        });

        collector.run_cycle();
        collector.run_cycle();

        assert_eq!(collector.cycles(), 2);
        assert_eq!(shared.snapshot().battery_percent, 64);
    }

    #[test]
    fn test_mode_change_during_cycle_applies_to_next_sleep() {
        let shared = SharedSnapshot::default();
        let changer = shared.clone();
        let mut runner = runner();
        runner.on_run = Some(Arc::new(move |program: &str| {
            if program == "ioreg" {
                changer.set_mode(SamplingMode::Eco);
            }
        }));

        let mut collector = PowerCollector::new(runner, shared.clone(), NoopNotifier);
        assert_eq!(shared.poll_interval(), Duration::from_secs(2));

        let sleep = collector.run_cycle();

        assert_eq!(sleep, Duration::from_secs(5));
        assert_eq!(shared.read(|s| s.poll_interval_secs), 5.0);
    }

    #[test]
    fn test_stop_signal_interrupts_sleep() {
        let stop = StopSignal::new();
        let stopper = stop.clone();
        let start = Instant::now();

        let handle = thread::spawn(move || stopper.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(50));
        stop.stop();

        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_sleep_without_stop_times_out() {
        let stop = StopSignal::new();
        assert!(!stop.sleep(Duration::from_millis(20)));
    }

    #[test]
    fn test_spawned_collector_stops_cooperatively() {
        let shared = SharedSnapshot::with_mode(SamplingMode::Performance);
        let runner = runner();
        let probe = runner.clone();

        let handle = PowerCollector::new(runner, shared.clone(), NoopNotifier)
            .spawn()
            .unwrap();
        thread::sleep(Duration::from_millis(200));
        handle.join().unwrap();

        let calls = probe.calls_to("ioreg");
        assert!(calls >= 1);
        thread::sleep(Duration::from_millis(700));
        assert_eq!(probe.calls_to("ioreg"), calls);
        assert_eq!(shared.snapshot().battery_percent, 64);
    }

    #[test]
    fn test_stopped_before_start_never_fetches() {
        let runner = runner();
        let probe = runner.clone();
        let stop = StopSignal::new();
        stop.stop();

        PowerCollector::new(runner, SharedSnapshot::default(), NoopNotifier).run(&stop);

        assert_eq!(probe.calls_to("ioreg"), 0);
    }
}
