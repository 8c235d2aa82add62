//! Driver → engine flow: ticks arrive over the channel and the owner of the
//! engine applies them, the way the demo render loop does.

use std::time::Duration;
use stepbar::driver::{DriverEvent, StepDriver};
use stepbar::{EngineOptions, Redraw, StepLayoutEngine, StepState};
use tokio::sync::mpsc;

fn checkout_engine() -> StepLayoutEngine {
    StepLayoutEngine::with_titles(
        EngineOptions::default(),
        ["Cart", "Address", "Payment", "Done"],
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn driver_walks_engine_and_wraps() {
    let mut engine = checkout_engine();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = StepDriver::new(engine.step_count(), tx)
        .with_interval(Duration::from_millis(2000))
        .spawn();

    let mut redraws = Vec::new();
    for _ in 0..5 {
        let Some(DriverEvent::Advance(index)) = rx.recv().await else {
            panic!("driver stopped early");
        };
        redraws.push(engine.update_step_state(index).unwrap());
    }

    // 0, 1, 2, 3, then back to 0
    assert_eq!(engine.current_step(), Some(0));
    assert_eq!(engine.state_of(0).unwrap(), StepState::Current);
    assert!((1..4).all(|i| engine.state_of(i).unwrap() == StepState::Future));

    assert_eq!(redraws[0], Redraw::Full);
    assert_eq!(redraws[1], Redraw::Steps(vec![0, 1]));
    assert_eq!(redraws[4], Redraw::Steps(vec![0, 1, 2, 3]));

    handle.stop().await;
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn no_ticks_after_handle_dropped() {
    let engine = checkout_engine();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = StepDriver::new(engine.step_count(), tx).spawn();

    assert_eq!(rx.recv().await, Some(DriverEvent::Advance(0)));
    drop(handle);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(rx.recv().await, None);
}
