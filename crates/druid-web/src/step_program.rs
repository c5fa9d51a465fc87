#![forbid(unsafe_code)]

//! Step-based program runner for the web host.
//!
//! [`StepProgram`] drives a [`druid_runtime::Model`] through init / event /
//! update / view cycles without threads or blocking. The host (JavaScript)
//! controls the loop:
//!
//! 1. Push events via [`StepProgram::push_event`].
//! 2. Advance time via [`StepProgram::advance_time`].
//! 3. Call [`StepProgram::step`] to process queued events and render.
//! 4. Read requests, notifications and markup via [`StepProgram::take_outputs`].
//!
//! # Example
//!
//! ```ignore
//! use druid_web::StepProgram;
//! use druid_runtime::HostEvent;
//! use core::time::Duration;
//!
//! let mut prog = StepProgram::new(dashboard);
//! prog.init()?;
//!
//! prog.push_event(HostEvent::Focus(false));
//! prog.advance_time(Duration::from_millis(250));
//! let result = prog.step()?;
//!
//! for request in prog.take_outputs().requests {
//!     // fetch(), then push a Response event carrying request.id
//! }
//! ```

use std::collections::VecDeque;

use core::time::Duration;

use druid_runtime::{Cmd, HostEvent, Model};

use crate::{DeterministicClock, WebBackendError, WebOutputs};

/// Result of a single [`StepProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the page was re-rendered during this step.
    pub rendered: bool,
    /// Number of host events processed during this step.
    pub events_processed: u32,
    /// Whether the clock moved and a tick was delivered.
    pub ticked: bool,
    /// Current frame index (monotonically increasing).
    pub frame_idx: u64,
}

/// Host-driven, non-blocking program runner.
///
/// # Lifecycle
///
/// 1. [`StepProgram::new`]: wrap the model.
/// 2. [`StepProgram::init`]: run `Model::init` and render the first frame.
/// 3. [`StepProgram::step`]: call from the host after pushing events.
/// 4. [`StepProgram::take_outputs`]: collect side effects after each step.
pub struct StepProgram<M: Model> {
    model: M,
    clock: DeterministicClock,
    queue: VecDeque<HostEvent>,
    outputs: WebOutputs,
    initialized: bool,
    dirty: bool,
    frame_idx: u64,
    last_tick: Duration,
}

impl<M: Model> StepProgram<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            outputs: WebOutputs::default(),
            initialized: false,
            dirty: true,
            frame_idx: 0,
            last_tick: Duration::ZERO,
        }
    }

    /// Initialize the model and render the first frame.
    ///
    /// Must be called exactly once before [`step`](Self::step).
    pub fn init(&mut self) -> Result<(), WebBackendError> {
        if self.initialized {
            return Err(WebBackendError::AlreadyInitialized);
        }
        self.initialized = true;
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.render_frame();
        Ok(())
    }

    /// Process every queued event, deliver a tick if time moved, and render
    /// if anything changed.
    pub fn step(&mut self) -> Result<StepResult, WebBackendError> {
        if !self.initialized {
            return Err(WebBackendError::NotInitialized);
        }

        let mut events_processed: u32 = 0;
        while let Some(event) = self.queue.pop_front() {
            events_processed += 1;
            self.dispatch(event);
        }

        let now = self.clock.now();
        let ticked = now != self.last_tick;
        if ticked {
            self.last_tick = now;
            self.dispatch(HostEvent::Tick(now));
        }

        let rendered = if self.dirty {
            self.render_frame();
            true
        } else {
            false
        };

        Ok(StepResult {
            rendered,
            events_processed,
            ticked,
            frame_idx: self.frame_idx,
        })
    }

    /// Queue a host event for the next [`step`](Self::step).
    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Number of events waiting for the next step.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Take the captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Read the captured outputs without consuming them.
    #[must_use]
    pub fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    // --- Private helpers ---

    fn dispatch(&mut self, event: HostEvent) {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn render_frame(&mut self) {
        self.outputs.html = Some(self.model.view().to_html());
        self.dirty = false;
        self.frame_idx += 1;
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.dirty = true;
                self.execute_cmd(cmd);
            }
            Cmd::Log(text) => {
                tracing::debug!(target: "druid_web::host", "{text}");
                self.outputs.logs.push(text);
            }
            Cmd::Http(req) => {
                tracing::trace!(id = %req.id, method = %req.method, url = %req.url, "queue request");
                self.outputs.requests.push(req);
            }
            Cmd::RequestPermission(api) => self.outputs.permission_requests.push(api),
            Cmd::Subscribe { url } => self.outputs.subscriptions.push(url),
            Cmd::Notify(notification) => self.outputs.notifications.push(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use druid_runtime::http::{HttpRequest, RequestId};
    use druid_widgets::Element;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Counter {
        refreshes: u32,
        last_tick: Duration,
    }

    impl Model for Counter {
        type Message = HostEvent;

        fn init(&mut self) -> Cmd<HostEvent> {
            Cmd::batch(vec![
                Cmd::log("started"),
                Cmd::http(HttpRequest::get(RequestId(1), "/xhr/clusters/")),
            ])
        }

        fn update(&mut self, msg: HostEvent) -> Cmd<HostEvent> {
            match msg {
                HostEvent::RefreshRequested => {
                    self.refreshes += 1;
                    if self.refreshes == 2 {
                        Cmd::msg(HostEvent::Focus(true))
                    } else {
                        Cmd::none()
                    }
                }
                HostEvent::Focus(_) => Cmd::Subscribe { url: "/notify".into() },
                HostEvent::Tick(now) => {
                    self.last_tick = now;
                    Cmd::none()
                }
                _ => Cmd::none(),
            }
        }

        fn view(&self) -> Element {
            Element::new("p").with_text(self.refreshes.to_string())
        }
    }

    #[test]
    fn init_collects_startup_effects_and_renders() {
        let mut prog = StepProgram::new(Counter::default());
        prog.init().unwrap();
        let out = prog.take_outputs();
        assert_eq!(out.logs, vec!["started".to_owned()]);
        assert_eq!(out.requests.len(), 1);
        assert_eq!(out.html.as_deref(), Some("<p>0</p>"));
        assert_eq!(prog.frame_idx(), 1);
        assert!(prog.take_outputs().is_empty());
    }

    #[test]
    fn double_init_and_early_step_are_errors() {
        let mut prog = StepProgram::new(Counter::default());
        assert_eq!(prog.step().unwrap_err(), WebBackendError::NotInitialized);
        prog.init().unwrap();
        assert_eq!(prog.init().unwrap_err(), WebBackendError::AlreadyInitialized);
    }

    #[test]
    fn step_drains_queue_and_follows_messages() {
        let mut prog = StepProgram::new(Counter::default());
        prog.init().unwrap();
        prog.take_outputs();

        prog.push_event(HostEvent::RefreshRequested);
        prog.push_event(HostEvent::RefreshRequested);
        assert_eq!(prog.pending_events(), 2);
        let result = prog.step().unwrap();

        assert_eq!(result.events_processed, 2);
        assert!(result.rendered);
        assert!(!result.ticked);
        let out = prog.take_outputs();
        assert_eq!(out.subscriptions, vec!["/notify".to_owned()]);
        assert_eq!(out.html.as_deref(), Some("<p>2</p>"));
    }

    #[test]
    fn idle_step_does_not_render() {
        let mut prog = StepProgram::new(Counter::default());
        prog.init().unwrap();
        let result = prog.step().unwrap();
        assert!(!result.rendered);
        assert_eq!(result.frame_idx, 1);
    }

    #[test]
    fn moving_clock_delivers_one_tick() {
        let mut prog = StepProgram::new(Counter::default());
        prog.init().unwrap();
        prog.advance_time(Duration::from_millis(500));
        prog.advance_time(Duration::from_millis(500));

        let result = prog.step().unwrap();
        assert!(result.ticked);
        assert_eq!(prog.model().last_tick, Duration::from_secs(1));

        assert!(!prog.step().unwrap().ticked);
        prog.set_time(Duration::from_secs(5));
        assert!(prog.step().unwrap().ticked);
        assert_eq!(prog.now(), Duration::from_secs(5));
    }
}
