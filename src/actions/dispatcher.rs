use std::time::{Duration, Instant};

use super::{
    backend::{ActionError, ClickKind, InputBackend, KeyName, parse_keys},
    kind::{ActionDescriptor, ActionType},
    store::ActionStore,
};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);
pub const MIN_COOLDOWN: Duration = Duration::from_millis(100);
pub const SCROLL_NOTCHES: i32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed,
    /// The label has no mapping.
    Unmapped,
    /// Too soon after the previous dispatch; nothing happened.
    CoolingDown,
    /// The mapping names an action this build cannot perform.
    Unsupported,
    Failed(String),
}

impl DispatchOutcome {
    pub fn executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed)
    }
}

/// Executes mapped actions, never more often than once per cooldown window.
///
/// The window is shared by every gesture. Its start is taken before the
/// action runs, so a failing action still uses up the window unless
/// `consume_on_failure` is turned off.
pub struct CooldownDispatcher {
    store: ActionStore,
    backend: Box<dyn InputBackend>,
    cooldown: Duration,
    consume_on_failure: bool,
    last_dispatch: Option<Instant>,
}

impl CooldownDispatcher {
    pub fn new(store: ActionStore, backend: Box<dyn InputBackend>) -> Self {
        Self {
            store,
            backend,
            cooldown: DEFAULT_COOLDOWN,
            consume_on_failure: true,
            last_dispatch: None,
        }
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ActionStore {
        &mut self.store
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Sets the minimum interval between dispatches, never below 0.1s.
    pub fn set_cooldown_secs(&mut self, seconds: f64) -> Duration {
        // `f64::max` would turn NaN into 0.
        let requested = if seconds.is_nan() {
            None
        } else {
            Duration::try_from_secs_f64(seconds.max(0.0)).ok()
        };
        self.cooldown = match requested {
            Some(cooldown) => cooldown.max(MIN_COOLDOWN),
            None => {
                log::warn!("ignoring cooldown of {seconds}s");
                self.cooldown
            }
        };
        log::info!("action cooldown set to {:.1}s", self.cooldown.as_secs_f64());
        self.cooldown
    }

    pub fn set_consume_on_failure(&mut self, consume: bool) {
        self.consume_on_failure = consume;
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    pub fn dispatch(&mut self, label: &str, pointer: Option<(f32, f32)>) -> bool {
        self.dispatch_at(label, pointer, Instant::now())
    }

    pub fn dispatch_at(&mut self, label: &str, pointer: Option<(f32, f32)>, now: Instant) -> bool {
        self.dispatch_detailed(label, pointer, now).executed()
    }

    pub fn dispatch_detailed(
        &mut self,
        label: &str,
        pointer: Option<(f32, f32)>,
        now: Instant,
    ) -> DispatchOutcome {
        let Some(descriptor) = self.store.lookup(label).cloned() else {
            return DispatchOutcome::Unmapped;
        };

        let previous = self.last_dispatch;
        if let Some(last) = previous {
            if now.saturating_duration_since(last) < self.cooldown {
                log::debug!("skipping {label:?}: cooling down");
                return DispatchOutcome::CoolingDown;
            }
        }
        self.last_dispatch = Some(now);

        match self.execute(&descriptor, pointer) {
            Ok(()) => {
                log::info!("gesture {label:?} -> {}", descriptor.display_name());
                DispatchOutcome::Executed
            }
            Err(ActionError::Unsupported(action)) => {
                log::warn!("gesture {label:?} is mapped to unsupported action {action:?}");
                DispatchOutcome::Unsupported
            }
            Err(err) => {
                log::error!(
                    "failed to execute {} for gesture {label:?}: {err}",
                    descriptor.action_type
                );
                if !self.consume_on_failure {
                    self.last_dispatch = previous;
                }
                DispatchOutcome::Failed(err.to_string())
            }
        }
    }

    fn execute(
        &mut self,
        descriptor: &ActionDescriptor,
        pointer: Option<(f32, f32)>,
    ) -> Result<(), ActionError> {
        use KeyName::{Alt, Char, Control, F};

        let backend = &mut self.backend;
        match &descriptor.action_type {
            ActionType::None => Ok(()),
            ActionType::Click => backend.click(ClickKind::Left, pointer),
            ActionType::RightClick => backend.click(ClickKind::Right, pointer),
            ActionType::DoubleClick => backend.click(ClickKind::Double, pointer),
            ActionType::ScrollUp => backend.scroll(SCROLL_NOTCHES),
            ActionType::ScrollDown => backend.scroll(-SCROLL_NOTCHES),
            ActionType::Save => backend.press_keys(&[Control, Char('s')]),
            ActionType::Copy => backend.press_keys(&[Control, Char('c')]),
            ActionType::Paste => backend.press_keys(&[Control, Char('v')]),
            ActionType::Cut => backend.press_keys(&[Control, Char('x')]),
            ActionType::SelectAll => backend.press_keys(&[Control, Char('a')]),
            ActionType::RunCode => backend.press_keys(&[F(5)]),
            ActionType::CloseWindow => backend.press_keys(&[Alt, F(4)]),
            ActionType::Screenshot => backend.screenshot().map(|_| ()),
            ActionType::CustomHotkey => {
                let names = descriptor.params.hotkey.as_deref().unwrap_or_default();
                let keys = parse_keys(names)?;
                backend.press_keys(&keys)
            }
            ActionType::Unknown(name) => Err(ActionError::Unsupported(name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use indexmap::IndexMap;

    use super::*;
    use crate::actions::kind::ActionParams;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&mut self, call: String) -> Result<(), ActionError> {
            if self.fail {
                return Err(ActionError::Input("boom".into()));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl InputBackend for Recorder {
        fn press_keys(&mut self, keys: &[KeyName]) -> Result<(), ActionError> {
            self.record(format!("keys {keys:?}"))
        }

        fn click(&mut self, kind: ClickKind, pointer: Option<(f32, f32)>) -> Result<(), ActionError> {
            self.record(format!("click {kind:?} {pointer:?}"))
        }

        fn scroll(&mut self, notches: i32) -> Result<(), ActionError> {
            self.record(format!("scroll {notches}"))
        }

        fn screenshot(&mut self) -> Result<PathBuf, ActionError> {
            self.record("screenshot".into()).map(|_| PathBuf::new())
        }
    }

    fn dispatcher(mappings: &[(&str, ActionDescriptor)], recorder: &Recorder) -> CooldownDispatcher {
        let mappings: IndexMap<String, ActionDescriptor> = mappings
            .iter()
            .map(|(label, d)| (label.to_string(), d.clone()))
            .collect();
        let store = ActionStore::with_mappings("unused.json", mappings);
        CooldownDispatcher::new(store, Box::new(recorder.clone()))
    }

    fn plain(action: ActionType) -> ActionDescriptor {
        ActionDescriptor::new(action, ActionParams::default())
    }

    fn at(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn close_hotkey_respects_cooldown() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(&[("Close", ActionDescriptor::hotkey(["ctrl", "w"]))], &recorder);
        let t0 = Instant::now();

        assert!(dispatcher.dispatch_at("Close", None, t0));
        assert!(!dispatcher.dispatch_at("Close", None, at(t0, 500)));
        assert!(dispatcher.dispatch_at("Close", None, at(t0, 1200)));

        let expected = format!("keys {:?}", [KeyName::Control, KeyName::Char('w')]);
        assert_eq!(recorder.calls(), vec![expected.clone(), expected]);
    }

    #[test]
    fn cooldown_is_shared_across_gestures() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(
            &[("Open", plain(ActionType::Copy)), ("OK", plain(ActionType::Paste))],
            &recorder,
        );
        let t0 = Instant::now();

        assert!(dispatcher.dispatch_at("Open", None, t0));
        assert_eq!(
            dispatcher.dispatch_detailed("OK", None, at(t0, 999)),
            DispatchOutcome::CoolingDown
        );
        assert!(dispatcher.dispatch_at("OK", None, at(t0, 1000)));
        assert_eq!(recorder.calls().len(), 2);
    }

    #[test]
    fn skipped_call_does_not_move_the_window() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(&[("Open", plain(ActionType::Copy))], &recorder);
        let t0 = Instant::now();

        assert!(dispatcher.dispatch_at("Open", None, t0));
        assert!(!dispatcher.dispatch_at("Open", None, at(t0, 900)));
        assert_eq!(dispatcher.last_dispatch(), Some(t0));
        assert!(dispatcher.dispatch_at("Open", None, at(t0, 1000)));
    }

    #[test]
    fn unmapped_label_is_a_no_op() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(&[], &recorder);
        assert_eq!(
            dispatcher.dispatch_detailed("Wave", None, Instant::now()),
            DispatchOutcome::Unmapped
        );
        assert_eq!(dispatcher.last_dispatch(), None);
    }

    #[test]
    fn none_action_succeeds_but_still_throttles() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(
            &[("Fist", plain(ActionType::None)), ("Open", plain(ActionType::Copy))],
            &recorder,
        );
        let t0 = Instant::now();

        assert!(dispatcher.dispatch_at("Fist", None, t0));
        assert!(!dispatcher.dispatch_at("Fist", None, at(t0, 100)));
        assert!(!dispatcher.dispatch_at("Open", None, at(t0, 100)));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn failure_consumes_the_window_by_default() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut dispatcher = dispatcher(&[("Open", plain(ActionType::Click))], &recorder);
        let t0 = Instant::now();

        assert!(matches!(
            dispatcher.dispatch_detailed("Open", None, t0),
            DispatchOutcome::Failed(_)
        ));
        assert_eq!(
            dispatcher.dispatch_detailed("Open", None, at(t0, 10)),
            DispatchOutcome::CoolingDown
        );
    }

    #[test]
    fn failure_can_leave_the_window_open() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut dispatcher = dispatcher(&[("Open", plain(ActionType::Click))], &recorder);
        dispatcher.set_consume_on_failure(false);
        let t0 = Instant::now();

        assert!(!dispatcher.dispatch_at("Open", None, t0));
        assert!(matches!(
            dispatcher.dispatch_detailed("Open", None, at(t0, 10)),
            DispatchOutcome::Failed(_)
        ));
        assert_eq!(dispatcher.last_dispatch(), None);
    }

    #[test]
    fn unknown_action_and_bad_hotkey_fail_cleanly() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(
            &[
                ("Fist", plain(ActionType::Unknown("app_execute".into()))),
                ("Open", plain(ActionType::CustomHotkey)),
                ("OK", ActionDescriptor::hotkey(["ctrl", "hyper"])),
            ],
            &recorder,
        );
        let t0 = Instant::now();

        assert_eq!(
            dispatcher.dispatch_detailed("Fist", None, t0),
            DispatchOutcome::Unsupported
        );
        // The unsupported action still took the cooldown slot.
        assert_eq!(
            dispatcher.dispatch_detailed("Open", None, at(t0, 10)),
            DispatchOutcome::CoolingDown
        );
        assert_eq!(dispatcher.last_dispatch(), Some(t0));
        assert!(matches!(
            dispatcher.dispatch_detailed("Open", None, at(t0, 1000)),
            DispatchOutcome::Failed(_)
        ));
        assert!(matches!(
            dispatcher.dispatch_detailed("OK", None, at(t0, 2000)),
            DispatchOutcome::Failed(_)
        ));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn fixed_actions_reach_the_backend() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(
            &[
                ("a", plain(ActionType::DoubleClick)),
                ("b", plain(ActionType::ScrollDown)),
                ("c", plain(ActionType::CloseWindow)),
            ],
            &recorder,
        );
        let t0 = Instant::now();

        assert!(dispatcher.dispatch_at("a", Some((0.5, 0.25)), t0));
        assert!(dispatcher.dispatch_at("b", None, at(t0, 1000)));
        assert!(dispatcher.dispatch_at("c", None, at(t0, 2000)));
        assert_eq!(
            recorder.calls(),
            vec![
                "click Double Some((0.5, 0.25))".to_string(),
                format!("scroll {}", -SCROLL_NOTCHES),
                format!("keys {:?}", [KeyName::Alt, KeyName::F(4)]),
            ]
        );
    }

    #[test]
    fn cooldown_is_clamped() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(&[], &recorder);
        assert_eq!(dispatcher.set_cooldown_secs(0.0), MIN_COOLDOWN);
        assert_eq!(dispatcher.set_cooldown_secs(2.5), Duration::from_millis(2500));
        assert_eq!(dispatcher.set_cooldown_secs(f64::NAN), Duration::from_millis(2500));
    }

    #[test]
    fn out_of_range_cooldown_keeps_previous() {
        let recorder = Recorder::default();
        let mut dispatcher = dispatcher(&[], &recorder);
        dispatcher.set_cooldown_secs(2.0);
        assert_eq!(dispatcher.set_cooldown_secs(1e30), Duration::from_secs(2));
        assert_eq!(dispatcher.set_cooldown_secs(f64::MAX), Duration::from_secs(2));
        assert_eq!(dispatcher.set_cooldown_secs(f64::INFINITY), Duration::from_secs(2));
        assert_eq!(dispatcher.set_cooldown_secs(-5.0), MIN_COOLDOWN);
    }
}
