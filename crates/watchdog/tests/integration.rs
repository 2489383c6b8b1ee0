//! Integration tests for the watchdog loop.
//!
//! Drives `Watchdog::run` end to end with real `/bin/sh` checks and an
//! in-memory display that records every mode write.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use switchres_display::{resolve_catalog, DisplayMode, DisplaySubsystem, MemoryDisplay, ModeId, Resolution};
use switchres_watchdog::{CancellationToken, Condition, PollPolicy, RunOutcome, WatchState, Watchdog};
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("switchres_watchdog=debug")
        .with_test_writer()
        .try_init();
}

fn original() -> DisplayMode {
    DisplayMode::new(ModeId(10), 1920, 1080)
}

fn requested() -> DisplayMode {
    DisplayMode::new(ModeId(20), 1280, 720)
}

fn create_display() -> Arc<MemoryDisplay> {
    Arc::new(MemoryDisplay::new(
        original(),
        vec![
            DisplayMode::new(ModeId(30), 2560, 1440),
            original(),
            requested(),
            DisplayMode::new(ModeId(40), 1280, 1024),
        ],
    ))
}

/// Resolve the catalog and build a watchdog for 1280x720, as the CLI does.
fn create_watchdog(display: &Arc<MemoryDisplay>, policy: PollPolicy) -> Watchdog<MemoryDisplay> {
    let catalog = resolve_catalog(display.as_ref()).expect("memory display is always available");
    let mode = catalog
        .select(Resolution::new(1280, 720))
        .cloned()
        .expect("1280x720 is in the 16:9 catalog");

    Watchdog::new(
        Arc::clone(display),
        catalog.display(),
        mode,
        catalog.current().clone(),
        policy,
    )
}

fn tick_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|content| content.lines().count())
        .unwrap_or(0)
}

/// Check script that reports its result and then appends one line per tick.
fn logged_check(check: &str, log: &Path) -> Condition {
    Condition::Command(format!(
        "{}; r=$?; echo tick >> '{}'; exit $r",
        check,
        log.display()
    ))
}

// =============================================================================
// One-shot
// =============================================================================

#[tokio::test]
async fn test_one_shot_applies_exactly_once() {
    init_tracing();
    let display = create_display();
    let mut watchdog = create_watchdog(&display, PollPolicy::default());

    let outcome = watchdog.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Applied);
    assert_eq!(display.writes(), vec![requested()]);
    assert_eq!(display.active_mode(), Some(requested()));
}

// =============================================================================
// Quit on failure
// =============================================================================

#[tokio::test]
async fn test_missing_flag_stops_at_first_tick() {
    init_tracing();
    let dir = tempdir().unwrap();
    let flag = dir.path().join("flag");
    let display = create_display();

    let policy = PollPolicy::default()
        .with_condition(Condition::Command(format!("test -f '{}'", flag.display())))
        .with_interval(Duration::from_secs(1));
    let mut watchdog = create_watchdog(&display, policy);

    let outcome = watchdog.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::ConditionFailed);
    assert_eq!(watchdog.ticks(), 1);
    assert_eq!(watchdog.state(), WatchState::Stopped);
    assert!(display.writes().is_empty());
}

#[tokio::test]
async fn test_quit_leaves_requested_mode_in_place() {
    init_tracing();
    let dir = tempdir().unwrap();
    let counter = dir.path().join("counter");
    let display = create_display();

    // true, true, then false forever
    let check = format!(
        "n=$(cat '{0}' 2>/dev/null || echo 0); n=$((n+1)); echo $n > '{0}'; test $n -le 2",
        counter.display()
    );
    let policy = PollPolicy::default()
        .with_condition(Condition::Command(check))
        .with_interval(Duration::from_millis(10));
    let mut watchdog = create_watchdog(&display, policy);

    let outcome = watchdog.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::ConditionFailed);
    assert_eq!(watchdog.ticks(), 3);
    assert_eq!(display.writes(), vec![requested()]);
    assert_eq!(display.active_mode(), Some(requested()));
}

// =============================================================================
// No-quit watching
// =============================================================================

#[tokio::test]
async fn test_no_quit_follows_scripted_condition() {
    init_tracing();
    let dir = tempdir().unwrap();
    let counter = dir.path().join("counter");
    let display = create_display();

    // Tick 1 false, ticks 2-3 true, false from tick 4 on
    let check = format!(
        "n=$(cat '{0}' 2>/dev/null || echo 0); n=$((n+1)); echo $n > '{0}'; test $n -ge 2 && test $n -le 3",
        counter.display()
    );
    let policy = PollPolicy::default()
        .with_condition(Condition::Command(check))
        .with_quit_on_failure(false)
        .with_interval(Duration::from_millis(10));
    let mut watchdog = create_watchdog(&display, policy);
    let shutdown = CancellationToken::new();

    let stopper = async {
        loop {
            let ticks: u32 = std::fs::read_to_string(&counter)
                .ok()
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(0);
            if ticks >= 6 {
                shutdown.cancel();
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };

    let (outcome, ()) = tokio::join!(watchdog.run(shutdown.clone()), stopper);

    // The sixth check may be killed mid-run by the shutdown
    assert_eq!(outcome.unwrap(), RunOutcome::Shutdown);
    assert!(watchdog.ticks() >= 5);
    assert_eq!(display.writes(), vec![requested(), original()]);
    assert_eq!(display.active_mode(), Some(original()));
}

#[tokio::test]
async fn test_no_quit_flag_file_toggles_mode() {
    init_tracing();
    let dir = tempdir().unwrap();
    let flag = dir.path().join("flag");
    let log = dir.path().join("ticks");
    let display = create_display();

    let policy = PollPolicy::default()
        .with_condition(logged_check(&format!("test -f '{}'", flag.display()), &log))
        .with_quit_on_failure(false)
        .with_interval(Duration::from_millis(150));
    let mut watchdog = create_watchdog(&display, policy);
    let shutdown = CancellationToken::new();

    // Flag absent on tick 1, present on tick 2, removed again for tick 3
    let driver = async {
        loop {
            match tick_count(&log) {
                1 if !flag.exists() => std::fs::write(&flag, b"").unwrap(),
                2 if flag.exists() => std::fs::remove_file(&flag).unwrap(),
                n if n >= 4 => {
                    shutdown.cancel();
                    break;
                }
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };

    let (outcome, ()) = tokio::join!(watchdog.run(shutdown.clone()), driver);

    assert_eq!(outcome.unwrap(), RunOutcome::Shutdown);
    assert_eq!(display.writes(), vec![requested(), original()]);
    assert_eq!(watchdog.state(), WatchState::Stopped);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_rejected_write_is_fatal_and_not_recorded() {
    init_tracing();
    let display = create_display();
    display.set_reject_writes(true);
    let mut watchdog = create_watchdog(&display, PollPolicy::default());

    let result = watchdog.run(CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(!watchdog.is_applied());
    let id = display.primary_display().unwrap();
    assert_eq!(display.current_mode(id), Some(original()));
}
