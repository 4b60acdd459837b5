// End-to-end collector tests against scripted command output

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use voltmon::core::power_monitor::{
    ChannelNotifier, ChargingStatus, CommandRunner, NoopNotifier, PowerCollector, PowerSource,
    SamplingMode, SharedSnapshot, TimeRemaining,
};

#[derive(Clone, Default)]
struct FakeRunner {
    outputs: Arc<Mutex<HashMap<String, String>>>,
}

impl FakeRunner {
    fn set(&self, program: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(program.to_string(), output.to_string());
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, _args: &[&str]) -> String {
        self.outputs
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .unwrap_or_default()
    }
}

const CHARGING_ON_ADAPTER: &str = r#"
+-o AppleSmartBattery  <class AppleSmartBattery>
    {
      "AppleRawExternalConnected" = Yes
      "ExternalConnected" = Yes
      "IsCharging" = Yes
      "FullyCharged" = No
      "CurrentCapacity" = 80
      "TimeRemaining" = 65535
      "Temperature" = 3045
      "Voltage" = 12500
      "InstantAmperage" = 2000
      "CycleCount" = 42
      "DesignCapacity" = 6000
      "AppleRawMaxCapacity" = 5400
      "AppleRawAdapterDetails" = ({"AdapterVoltage"=20000,"Current"=3250,"Watts"=65,"Name"="USB-C"})
    }
"#;

const DISCHARGING: &str = r#"
      "ExternalConnected" = No
      "IsCharging" = No
      "FullyCharged" = No
      "CurrentCapacity" = 55
      "TimeRemaining" = 190
      "Voltage" = 11400
      "InstantAmperage" = 18446744073709550616
"#;

fn fake_mac() -> FakeRunner {
    let runner = FakeRunner::default();
    runner.set("ioreg", CHARGING_ON_ADAPTER);
    runner.set(
        "system_profiler",
        "Health Information:\n          Cycle Count: 42\n          Condition: Normal\n",
    );
    runner.set("pmset", "System-wide power settings:\n lowpowermode         0\n");
    runner
}

#[test]
fn test_charging_on_adapter() {
    let shared = SharedSnapshot::default();
    let mut collector = PowerCollector::new(fake_mac(), shared.clone(), NoopNotifier);
    collector.run_cycle();

    let snapshot = shared.snapshot();
    assert_eq!(snapshot.power_source, PowerSource::AC);
    assert_eq!(snapshot.charging_status, ChargingStatus::Charging);
    assert_eq!(snapshot.time_remaining, TimeRemaining::Calculating);
    assert_eq!(snapshot.battery_percent, 80);
    assert_eq!(snapshot.power_watts, 25.0);
    assert_eq!(snapshot.max_capacity_percent, 90.0);
    assert_eq!(snapshot.condition, "Normal");
    assert!(!snapshot.low_power_mode);

    let charger = snapshot.charger().expect("charger attached");
    assert_eq!(charger.wattage, 65);
    assert_eq!(charger.voltage, 20.0);
    assert_eq!(charger.current_ma, 3250);
}

#[test]
fn test_unplugging_switches_to_battery() {
    let runner = fake_mac();
    let shared = SharedSnapshot::default();
    let mut collector = PowerCollector::new(runner.clone(), shared.clone(), NoopNotifier);
    collector.run_cycle();

    runner.set("ioreg", DISCHARGING);
    collector.run_cycle();

    let snapshot = shared.snapshot();
    assert_eq!(snapshot.power_source, PowerSource::Battery);
    assert_eq!(snapshot.charging_status, ChargingStatus::Discharging);
    assert_eq!(snapshot.amperage_ma, -1000);
    assert_eq!(snapshot.power_watts, 11.4);
    assert!(!snapshot.is_charging_flow());
    assert!(snapshot.charger().is_none());

    // Fields absent from the second report keep their values
    assert_eq!(snapshot.cycle_count, 42);
    assert_eq!(snapshot.temperature_celsius, 3045.0 / 10.0 - 273.15);

    let history: Vec<f64> = snapshot.power_history.iter().collect();
    assert_eq!(history.len(), 100);
    assert_eq!(history[98], 25.0);
    assert_eq!(history[99], 11.4);
}

#[test]
fn test_no_commands_available() {
    let shared = SharedSnapshot::default();
    let before = shared.snapshot();

    let mut collector = PowerCollector::new(FakeRunner::default(), shared.clone(), NoopNotifier);
    let sleep = collector.run_cycle();

    assert_eq!(sleep, Duration::from_secs(2));
    assert_eq!(shared.snapshot(), before);
    assert_eq!(collector.cycles(), 1);
}

#[test]
fn test_mode_change_controls_sleep() {
    let shared = SharedSnapshot::with_mode(SamplingMode::Performance);
    let mut collector = PowerCollector::new(fake_mac(), shared.clone(), NoopNotifier);
    assert_eq!(collector.run_cycle(), Duration::from_millis(500));

    shared.set_mode(SamplingMode::Eco);
    assert_eq!(collector.run_cycle(), Duration::from_secs(5));
    assert_eq!(shared.snapshot().poll_interval_secs, 5.0);
}

#[test]
fn test_spawned_collector_notifies_and_stops() {
    let shared = SharedSnapshot::with_mode(SamplingMode::Eco);
    let (notifier, updates) = ChannelNotifier::new();

    let handle = PowerCollector::new(fake_mac(), shared.clone(), notifier)
        .spawn()
        .unwrap();

    updates
        .recv_timeout(Duration::from_secs(5))
        .expect("first cycle notification");
    assert_eq!(shared.snapshot().battery_percent, 80);

    // Eco sleeps 5s, stopping must cut that short
    let started = std::time::Instant::now();
    handle.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}
