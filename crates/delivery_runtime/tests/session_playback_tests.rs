mod support;

use std::time::Duration;

use delivery_core::test_helpers::FORT_WORTH_STORE;
use delivery_core::{Role, SimulationPhase};
use delivery_runtime::SessionError;
use support::{dallas_houston_ready, fast_ready_session};
use tokio::time::{sleep, Instant};

#[tokio::test(start_paused = true)]
async fn first_frame_is_the_origin() {
    let session = dallas_houston_ready().await;
    let frames = session.subscribe();
    assert!(frames.borrow().is_none());

    let run = session.start().expect("start");
    let frame = frames.borrow().clone().expect("first frame");
    assert_eq!(frame.run, run);
    assert_eq!(frame.tick, 0);
    assert_eq!(frame.position.name, "Dallas Distribution Center");
    assert!(!frame.completed);
}

#[tokio::test(start_paused = true)]
async fn playback_ticks_on_the_configured_interval_and_completes() {
    let session = dallas_houston_ready().await;
    let route = session.current_route().expect("route");

    let started = Instant::now();
    let run = session.start().expect("start");
    let last = session.wait_for_completion().await.expect("completed");

    // ceil(1 / 0.015) ticks at 100ms each.
    assert_eq!(last.run, run);
    assert_eq!(last.tick, 67);
    assert!(last.completed);
    assert_eq!(last.position, route.waypoints[1]);
    assert_eq!(started.elapsed(), Duration::from_millis(6_700));

    assert_eq!(session.current_simulation_state(), SimulationPhase::Completed);
    let stats = session.current_stats();
    assert_eq!(stats.total_distance, 64.0);
    assert_eq!(stats.fuel_saved, 8.7);
    assert_eq!(stats.co2_reduced, 26.0);
    assert_eq!(stats.time_estimate.to_string(), "2h 40m");
}

#[tokio::test(start_paused = true)]
async fn frames_stop_after_completion() {
    let session = dallas_houston_ready().await;
    session.start().expect("start");
    let last = session.wait_for_completion().await.expect("completed");

    sleep(Duration::from_secs(2)).await;
    assert_eq!(session.current_progress().ticks, last.tick);
    assert_eq!(session.subscribe().borrow().clone(), Some(last));
}

#[tokio::test(start_paused = true)]
async fn stop_discards_progress_and_silences_the_ticker() {
    let session = dallas_houston_ready().await;
    let frames = session.subscribe();
    session.start().expect("start");

    sleep(Duration::from_millis(350)).await;
    assert_eq!(session.current_progress().ticks, 3);
    assert_eq!(frames.borrow().as_ref().map(|f| f.tick), Some(3));

    assert!(session.stop());
    assert_eq!(session.current_simulation_state(), SimulationPhase::Ready);
    assert_eq!(session.current_progress().ticks, 0);
    assert!(frames.borrow().is_none());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(session.current_progress().ticks, 0);
    assert!(frames.borrow().is_none());
    assert!(session.current_route().is_some());
}

#[tokio::test(start_paused = true)]
async fn stop_when_idle_is_a_no_op() {
    let session = dallas_houston_ready().await;
    assert!(!session.stop());
    assert_eq!(session.current_simulation_state(), SimulationPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn start_while_running_keeps_the_active_run() {
    let session = dallas_houston_ready().await;
    let run = session.start().expect("start");
    sleep(Duration::from_millis(250)).await;

    assert_eq!(session.start().expect("second start"), run);
    assert_eq!(session.current_progress().ticks, 2);

    // Only one ticker drives the run.
    sleep(Duration::from_millis(100)).await;
    assert_eq!(session.current_progress().ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn start_without_route_is_rejected() {
    let session = support::dallas_houston_session();
    let err = session.start().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Engine(delivery_core::EngineError::NoRoute)
    ));
    assert!(session.subscribe().borrow().is_none());
}

#[tokio::test(start_paused = true)]
async fn selection_change_while_running_stops_playback() {
    let session = dallas_houston_ready().await;
    let frames = session.subscribe();
    session.start().expect("start");
    sleep(Duration::from_millis(500)).await;

    session
        .select(Role::Stop3, FORT_WORTH_STORE)
        .expect("select stop 3");
    assert_eq!(session.current_simulation_state(), SimulationPhase::Ready);
    assert!(session.current_route().is_none());
    assert!(frames.borrow().is_none());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(session.current_progress().ticks, 0);
    assert!(frames.borrow().is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_while_running_returns_to_idle() {
    let session = dallas_houston_ready().await;
    session.start().expect("start");
    sleep(Duration::from_millis(500)).await;

    session.reset();
    assert_eq!(session.current_simulation_state(), SimulationPhase::Idle);
    assert!(session.current_selection().is_empty());
    assert!(session.current_route().is_none());
    assert!(session.current_stats().is_zeroed());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(session.current_progress().ticks, 0);
    assert!(session.subscribe().borrow().is_none());
}

#[tokio::test(start_paused = true)]
async fn completed_run_replays_from_the_origin() {
    let session = dallas_houston_ready().await;
    let first = session.start().expect("start");
    let first_last = session.wait_for_completion().await.expect("first run");

    let second = session.start().expect("replay");
    assert_ne!(first, second);
    assert_eq!(session.current_simulation_state(), SimulationPhase::Running);
    assert_eq!(session.current_progress().ticks, 0);

    let second_last = session.wait_for_completion().await.expect("second run");
    assert_eq!(second_last.run, second);
    assert_eq!(second_last.tick, first_last.tick);
    assert_eq!(second_last.position, first_last.position);
}

#[tokio::test(start_paused = true)]
async fn wait_for_completion_returns_none_when_stopped() {
    let session = std::sync::Arc::new(dallas_houston_ready().await);
    session.start().expect("start");

    let stopper = {
        let session = std::sync::Arc::clone(&session);
        tokio::spawn(async move {
            sleep(Duration::from_millis(300)).await;
            session.stop();
        })
    };
    assert!(session.wait_for_completion().await.is_none());
    stopper.await.expect("stopper");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_cancels_playback() {
    let session = dallas_houston_ready().await;
    let mut frames = session.subscribe();
    session.start().expect("start");
    sleep(Duration::from_millis(250)).await;

    drop(session);
    sleep(Duration::from_secs(1)).await;

    let last = frames.borrow_and_update().clone().expect("last frame");
    assert_eq!(last.tick, 2);
    assert!(!last.completed);
    assert!(frames.changed().await.is_err(), "sender should be gone");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_restarts_never_leave_a_run_without_a_ticker() {
    for _ in 0..50 {
        let session = std::sync::Arc::new(fast_ready_session().await);
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let session = std::sync::Arc::clone(&session);
                tokio::task::spawn_blocking(move || {
                    for _ in 0..20 {
                        session.stop();
                        let _ = session.start();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.expect("worker");
        }

        if session.current_simulation_state() != SimulationPhase::Running {
            continue;
        }
        let before = session.current_progress().ticks;
        sleep(Duration::from_millis(200)).await;
        let advanced = session.current_progress().ticks > before
            || session.current_simulation_state() == SimulationPhase::Completed;
        assert!(advanced, "running playback stopped advancing");
    }
}
