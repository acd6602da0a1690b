//! End-to-end scenarios for the supervisor: state machine walks, fault
//! handling, telemetry across pause/resume, and stop escalation against a
//! hung engine. All stubs are built on [`EngineFn`]; timeouts and windows
//! are shrunk so the suite runs in seconds.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::timeout;

use stepvisor::{
    Config, ControlError, Engine, EngineError, EngineFn, EngineRef, Event, EventKind, StepBudget,
    Supervisor, SupervisorState,
};

fn fast_config() -> Config {
    Config {
        target_rate: 200,
        telemetry_window: Duration::from_millis(100),
        grace: Duration::from_millis(300),
        kill_wait: Duration::from_millis(200),
        ..Config::default()
    }
}

fn instant_engine() -> EngineRef {
    EngineFn::arc("instant", |_: StepBudget| async { Ok::<_, EngineError>(()) })
}

async fn wait_for_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    timeout(Duration::from_secs(5), async {
        loop {
            let ev = rx.recv().await.expect("bus closed");
            if ev.kind == kind {
                return ev;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}

async fn collect_until_stopped(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    timeout(Duration::from_secs(5), async {
        let mut events = Vec::new();
        loop {
            let ev = rx.recv().await.expect("bus closed");
            let done = ev.kind == EventKind::Stopped;
            events.push(ev);
            if done {
                return events;
            }
        }
    })
    .await
    .expect("timed out waiting for Stopped")
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

#[tokio::test]
async fn state_machine_walk() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();

    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());

    sup.start().await.unwrap();
    assert_eq!(sup.state(), SupervisorState::Running);
    assert!(sup.is_active());
    wait_for_kind(&mut rx, EventKind::Started).await;

    sup.pause().await;
    assert_eq!(sup.state(), SupervisorState::Paused);
    assert!(sup.is_active());
    wait_for_kind(&mut rx, EventKind::Paused).await;

    sup.start().await.unwrap();
    assert_eq!(sup.state(), SupervisorState::Running);

    sup.stop().await;
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());
    wait_for_kind(&mut rx, EventKind::Stopped).await;
}

#[tokio::test]
async fn start_without_engine_spawns_nothing() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();

    let err = sup.start().await.unwrap_err();
    assert_eq!(err, ControlError::NoEngine);
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());

    let ev = wait_for_kind(&mut rx, EventKind::UnknownError).await;
    assert_eq!(ev.error.as_deref(), Some("no engine attached"));

    // No Started (or anything else) may follow.
    let silence = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(silence.is_err(), "unexpected event after rejected start");
}

#[tokio::test]
async fn pause_while_idle_is_silent_noop() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();

    sup.pause().await;
    assert_eq!(sup.state(), SupervisorState::Idle);

    let silence = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(silence.is_err(), "pause while idle must not emit events");
}

#[tokio::test]
async fn stop_while_idle_is_noop() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();

    sup.stop().await;
    assert_eq!(sup.state(), SupervisorState::Idle);

    let silence = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(silence.is_err(), "stop while idle must not emit events");
}

#[tokio::test]
async fn engine_fault_on_third_step_ends_run() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let engine = EngineFn::arc("flaky", move |_: StepBudget| {
        let seen = Arc::clone(&seen);
        async move {
            if seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                Err(EngineError::new("third step fault"))
            } else {
                Ok(())
            }
        }
    });

    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(engine).await.unwrap();
    sup.start().await.unwrap();

    let events = collect_until_stopped(&mut rx).await;
    let faults: Vec<_> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::EngineError)
        .collect();
    assert_eq!(faults.len(), 1);
    assert_eq!(
        faults[0].error.as_deref(),
        Some("engine fault: third step fault")
    );
    assert_eq!(events.last().unwrap().kind, EventKind::Stopped);

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());
}

#[tokio::test]
async fn telemetry_reports_and_pauses_with_the_run() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();
    sup.start().await.unwrap();

    let sample = wait_for_kind(&mut rx, EventKind::RateUpdated).await;
    assert!(sample.rate.unwrap() > 0);

    sup.pause().await;
    wait_for_kind(&mut rx, EventKind::Paused).await;
    // Let the iteration in flight at pause time finish, then drain it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    drain(&mut rx);

    // A parked worker produces no telemetry.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let while_paused = drain(&mut rx);
    assert!(
        while_paused
            .iter()
            .all(|ev| ev.kind != EventKind::RateUpdated),
        "telemetry emitted while paused: {while_paused:?}"
    );

    // Resume restores telemetry.
    sup.start().await.unwrap();
    let resumed = wait_for_kind(&mut rx, EventKind::RateUpdated).await;
    assert!(resumed.rate.unwrap() > 0);

    sup.stop().await;
    wait_for_kind(&mut rx, EventKind::Stopped).await;
    assert!(!sup.is_active());
}

#[tokio::test]
async fn hung_engine_falls_back_to_forced_termination() {
    let engine = EngineFn::arc("hung", |_: StepBudget| async {
        futures::future::pending::<Result<(), EngineError>>().await
    });

    let cfg = fast_config();
    let sup = Supervisor::new(cfg, vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(engine).await.unwrap();
    sup.start().await.unwrap();
    wait_for_kind(&mut rx, EventKind::Started).await;

    // Give the worker time to park inside the step call.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let begin = Instant::now();
    sup.stop().await;
    let took = begin.elapsed();

    assert!(took >= cfg.grace, "stop returned before the grace window");
    assert!(
        took < cfg.grace + cfg.kill_wait + Duration::from_millis(500),
        "stop exceeded its escalation bound: {took:?}"
    );

    let events = collect_until_stopped(&mut rx).await;
    assert!(
        events.iter().any(|ev| ev.kind == EventKind::StatusMessage
            && ev.text.as_deref().is_some_and(|t| t.contains("force-terminated"))),
        "forced termination not reported: {events:?}"
    );
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());
}

#[tokio::test]
async fn no_events_after_stop_returns() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();

    sup.start().await.unwrap();
    wait_for_kind(&mut rx, EventKind::RateUpdated).await;
    sup.stop().await;

    let events = collect_until_stopped(&mut rx).await;
    assert_eq!(events.last().unwrap().kind, EventKind::Stopped);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(
        drain(&mut rx).is_empty(),
        "events emitted after stop returned"
    );
}

#[tokio::test]
async fn supervisor_is_reusable_after_stop() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();

    for _ in 0..2 {
        sup.start().await.unwrap();
        wait_for_kind(&mut rx, EventKind::Started).await;
        sup.stop().await;
        wait_for_kind(&mut rx, EventKind::Stopped).await;
        assert_eq!(sup.state(), SupervisorState::Idle);
    }
}

#[tokio::test]
async fn attach_engine_is_rejected_while_active() {
    let sup = Supervisor::new(fast_config(), vec![]);
    sup.attach_engine(instant_engine()).await.unwrap();
    sup.start().await.unwrap();

    let err = sup.attach_engine(instant_engine()).await.unwrap_err();
    assert!(matches!(
        err,
        ControlError::InvalidState {
            op: "attach_engine",
            ..
        }
    ));

    sup.pause().await;
    let err = sup.attach_engine(instant_engine()).await.unwrap_err();
    assert_eq!(err.as_label(), "control_invalid_state");

    sup.stop().await;
    sup.attach_engine(instant_engine()).await.unwrap();
}

#[tokio::test]
async fn start_while_running_is_noop() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();

    sup.start().await.unwrap();
    sup.start().await.unwrap();
    assert_eq!(sup.state(), SupervisorState::Running);

    sup.stop().await;
    let events = collect_until_stopped(&mut rx).await;
    let started = events
        .iter()
        .filter(|ev| ev.kind == EventKind::Started)
        .count();
    assert_eq!(started, 1, "redundant start spawned a second run");
}

#[tokio::test]
async fn control_calls_complete_promptly_in_every_state() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(instant_engine()).await.unwrap();

    // Each control call must return, not wedge on its own state lock.
    timeout(Duration::from_secs(1), sup.start())
        .await
        .expect("start from idle did not return")
        .unwrap();
    wait_for_kind(&mut rx, EventKind::Started).await;

    timeout(Duration::from_secs(1), sup.pause())
        .await
        .expect("pause did not return");
    assert_eq!(sup.state(), SupervisorState::Paused);

    timeout(Duration::from_secs(1), sup.start())
        .await
        .expect("resume from paused did not return")
        .unwrap();
    assert_eq!(sup.state(), SupervisorState::Running);

    timeout(Duration::from_secs(2), sup.stop())
        .await
        .expect("stop did not return");
    assert!(!sup.is_active());
}

struct DefectiveCore;

#[async_trait]
impl Engine for DefectiveCore {
    async fn step(&self, _budget: StepBudget) -> Result<(), EngineError> {
        panic!("defective core")
    }
}

#[tokio::test]
async fn worker_defect_becomes_unknown_error_then_stopped() {
    let sup = Supervisor::new(fast_config(), vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(Arc::new(DefectiveCore)).await.unwrap();
    sup.start().await.unwrap();

    let events = collect_until_stopped(&mut rx).await;
    let defects: Vec<_> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::UnknownError)
        .collect();
    assert_eq!(defects.len(), 1);
    assert_eq!(defects[0].error.as_deref(), Some("defective core"));
    assert_eq!(events.last().unwrap().kind, EventKind::Stopped);

    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(!sup.is_active());
}

#[tokio::test]
async fn worker_receives_configured_budget() {
    let seen = Arc::new(AtomicU32::new(0));
    let probe = Arc::clone(&seen);
    let engine = EngineFn::arc("probe", move |budget: StepBudget| {
        let probe = Arc::clone(&probe);
        async move {
            probe.store(budget.0 as u32, Ordering::SeqCst);
            Ok::<_, EngineError>(())
        }
    });

    let cfg = Config {
        step_budget: StepBudget(777),
        ..fast_config()
    };
    let sup = Supervisor::new(cfg, vec![]);
    let mut rx = sup.subscribe();
    sup.attach_engine(engine).await.unwrap();
    sup.start().await.unwrap();
    wait_for_kind(&mut rx, EventKind::Started).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    sup.stop().await;
    assert_eq!(seen.load(Ordering::SeqCst), 777);
}
