//! Scenario state for launch behavioural tests.

use std::cell::RefCell;

use rkt_launch::api::{CommandOutcome, ExecutionMode};
use rkt_launch::engine::ScriptRunner;
use rkt_launch::error::ProcessError;
use rkt_launch::oneshot::OneshotRequest;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

pub(crate) const SINGLE_APP_MANIFEST: &str = "apps:\n  - image: image\n    name: app\n";

pub(crate) const SINGLE_APP_COMMAND: &str =
    "rkt \\\n  run \\\n    docker://image \\\n      --name=app";

pub(crate) const TEMPLATED_MANIFEST: &str = "apps:\n  - image: image\n    name: {{ .name }}\n";

pub(crate) const EMPTY_MANIFEST: &str = "apps: []\n";

pub(crate) const ONESHOT_MANIFEST: &str = concat!(
    "__meta__:\n",
    "  oneshot:\n",
    "    unit_test: run_tests\n",
    "apps:\n",
    "  - image: image\n",
    "    name: app\n",
);

/// Launch identifier used by every scenario.
pub(crate) const LAUNCH_TOKEN: &str = "bdd";

/// High-level outcome from an `up` or `oneshot` call.
#[derive(Debug, Clone)]
pub(crate) enum LaunchOutcome {
    /// The call returned a `CommandOutcome`.
    Ok(CommandOutcome),
    /// The call returned an error.
    Err(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct LaunchState {
    pub(crate) manifest_text: Slot<String>,
    pub(crate) vars: Slot<Vec<String>>,
    pub(crate) mode: Slot<ExecutionMode>,
    pub(crate) background: Slot<bool>,
    pub(crate) exit_code: Slot<i32>,
    pub(crate) request: Slot<OneshotRequest>,
    pub(crate) printed: Slot<String>,
    pub(crate) executed: Slot<Vec<String>>,
    pub(crate) result: Slot<LaunchOutcome>,
}

#[fixture]
pub(crate) fn launch_state() -> LaunchState {
    let state = LaunchState::default();
    state.vars.set(Vec::new());
    state.mode.set(ExecutionMode::Normal);
    state.background.set(false);
    state.exit_code.set(0);
    state.request.set(OneshotRequest::default());
    state
}

/// Runner that records scripts instead of running them.
pub(crate) struct RecordingRunner {
    exit_code: i32,
    executed: RefCell<Vec<String>>,
}

impl RecordingRunner {
    pub(crate) const fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            executed: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn take_executed(&self) -> Vec<String> {
        std::mem::take(&mut *self.executed.borrow_mut())
    }
}

impl ScriptRunner for RecordingRunner {
    fn run(&self, script: &str) -> Result<i32, ProcessError> {
        self.executed.borrow_mut().push(script.to_owned());
        Ok(self.exit_code)
    }
}
