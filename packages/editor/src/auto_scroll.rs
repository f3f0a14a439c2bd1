//! Edge auto-scroll during a drag.
//!
//! While the pointer sits within `edge_threshold` px of the scroll
//! container's top or bottom edge, a frame loop scrolls by `speed` px per
//! frame. The loop exits on its own once velocity returns to zero, and
//! [`AutoScroller::stop`] aborts it immediately. Dropping the scroller stops
//! it too, so a loop can never outlive the drag session that owns it.
//!
//! Inside a tokio runtime the loop is a spawned task ticking on an
//! interval. Without one (e.g. a host driving repaint callbacks itself) the
//! caller drives frames through [`AutoScroller::tick`].

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::config::AutoScrollConfig;
use crate::geometry::{Point, Rect};

/// Something that can be scrolled vertically
pub trait ScrollTarget: Send + Sync + 'static {
    fn scroll_by(&self, dy: f32);
}

pub struct AutoScroller {
    config: AutoScrollConfig,
    target: Arc<dyn ScrollTarget>,
    velocity: watch::Sender<f32>,
    task: Option<JoinHandle<()>>,
}

impl AutoScroller {
    pub fn new(config: AutoScrollConfig, target: Arc<dyn ScrollTarget>) -> Self {
        let (velocity, _) = watch::channel(0.0);
        Self {
            config,
            target,
            velocity,
            task: None,
        }
    }

    /// Scroll velocity (px per frame) for a pointer inside `viewport`.
    /// Negative scrolls up.
    pub fn velocity_for(&self, pointer: Point, viewport: Rect) -> f32 {
        let threshold = self.config.edge_threshold;
        if pointer.y < viewport.top() + threshold {
            -self.config.speed
        } else if pointer.y > viewport.bottom() - threshold {
            self.config.speed
        } else {
            0.0
        }
    }

    /// Recompute velocity from the pointer and start the frame loop if it
    /// became non-zero.
    pub fn update(&mut self, pointer: Point, viewport: Rect) -> f32 {
        let velocity = self.velocity_for(pointer, viewport);
        self.velocity.send_replace(velocity);

        if velocity != 0.0 && !self.is_running() {
            self.spawn_loop();
        }
        velocity
    }

    pub fn velocity(&self) -> f32 {
        *self.velocity.borrow()
    }

    /// Advance one frame by hand. Returns `false` once velocity is zero.
    pub fn tick(&self) -> bool {
        let velocity = self.velocity();
        if velocity == 0.0 {
            return false;
        }
        self.target.scroll_by(velocity);
        true
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Zero the velocity and tear down the frame loop.
    pub fn stop(&mut self) {
        self.velocity.send_replace(0.0);
        if let Some(task) = self.task.take() {
            task.abort();
            trace!("auto-scroll stopped");
        }
    }

    fn spawn_loop(&mut self) {
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let mut velocity = self.velocity.subscribe();
        let target = self.target.clone();
        let frame = Duration::from_millis(self.config.frame_interval_ms.max(1));

        self.task = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(frame);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let dy = *velocity.borrow_and_update();
                if dy == 0.0 {
                    trace!("auto-scroll idle");
                    break;
                }
                target.scroll_by(dy);
            }
        }));
        trace!("auto-scroll started");
    }
}

impl Drop for AutoScroller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Offset(Mutex<f32>);

    impl ScrollTarget for Offset {
        fn scroll_by(&self, dy: f32) {
            *self.0.lock().unwrap() += dy;
        }
    }

    impl Offset {
        fn get(&self) -> f32 {
            *self.0.lock().unwrap()
        }
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 600.0)
    }

    #[test]
    fn test_velocity_zones() {
        let scroller = AutoScroller::new(AutoScrollConfig::default(), Arc::new(Offset::default()));
        assert_eq!(scroller.velocity_for(Point::new(10.0, 30.0), viewport()), -8.0);
        assert_eq!(scroller.velocity_for(Point::new(10.0, 300.0), viewport()), 0.0);
        assert_eq!(scroller.velocity_for(Point::new(10.0, 580.0), viewport()), 8.0);
    }

    #[test]
    fn test_manual_ticks_without_runtime() {
        let offset = Arc::new(Offset::default());
        let mut scroller = AutoScroller::new(AutoScrollConfig::default(), offset.clone());

        scroller.update(Point::new(0.0, 590.0), viewport());
        assert!(!scroller.is_running());
        assert!(scroller.tick());
        assert!(scroller.tick());
        assert_eq!(offset.get(), 16.0);

        scroller.update(Point::new(0.0, 300.0), viewport());
        assert!(!scroller.tick());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_loop_scrolls_and_self_terminates() {
        let offset = Arc::new(Offset::default());
        let mut scroller = AutoScroller::new(AutoScrollConfig::default(), offset.clone());

        scroller.update(Point::new(0.0, 5.0), viewport());
        assert!(scroller.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(offset.get() < 0.0);

        scroller.update(Point::new(0.0, 300.0), viewport());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!scroller.is_running());

        let settled = offset.get();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(offset.get(), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_loop() {
        let offset = Arc::new(Offset::default());
        let mut scroller = AutoScroller::new(AutoScrollConfig::default(), offset.clone());

        scroller.update(Point::new(0.0, 595.0), viewport());
        tokio::time::sleep(Duration::from_millis(40)).await;
        scroller.stop();
        tokio::task::yield_now().await;

        let stopped_at = offset.get();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(offset.get(), stopped_at);
        assert_eq!(scroller.velocity(), 0.0);
        assert!(!scroller.is_running());
    }
}
