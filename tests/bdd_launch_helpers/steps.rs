//! Given/when steps for launch scenarios.

use rkt_launch::api::{self, CommandOutcome, ExecutionMode, OneshotParams, UpParams};
use rkt_launch::config::AppConfig;
use rkt_launch::error::{LaunchError, Result as LaunchResult};
use rkt_launch::launch_id::LaunchId;
use rkt_launch::manifest::{self, Manifest, RenderContext};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{
    EMPTY_MANIFEST, LAUNCH_TOKEN, LaunchOutcome, LaunchState, ONESHOT_MANIFEST,
    RecordingRunner, SINGLE_APP_MANIFEST, TEMPLATED_MANIFEST,
};

/// Everything a `when` step needs to call into the API.
struct Invocation {
    config: AppConfig,
    mode: ExecutionMode,
    launch_id: LaunchId,
    runner: RecordingRunner,
    out: Vec<u8>,
}

impl Invocation {
    fn from_state(launch_state: &LaunchState) -> Self {
        Self {
            config: AppConfig::default(),
            mode: launch_state.mode.get().unwrap_or_default(),
            launch_id: LaunchId::from_token(LAUNCH_TOKEN),
            runner: RecordingRunner::new(launch_state.exit_code.get().unwrap_or(0)),
            out: Vec::new(),
        }
    }

    /// Stores what was printed, what was executed, and the outcome.
    fn record(
        self,
        launch_state: &LaunchState,
        result: LaunchResult<CommandOutcome>,
    ) -> StepResult<()> {
        let printed = String::from_utf8(self.out).map_err(|e| e.to_string())?;
        launch_state.printed.set(printed);
        launch_state.executed.set(self.runner.take_executed());
        launch_state.result.set(match result {
            Ok(outcome) => LaunchOutcome::Ok(outcome),
            Err(e) => LaunchOutcome::Err(e.to_string()),
        });
        Ok(())
    }
}

fn load_manifest(launch_state: &LaunchState) -> LaunchResult<Manifest> {
    let text = launch_state.manifest_text.get().unwrap_or_default();
    let vars = launch_state.vars.get().unwrap_or_default();
    let context = RenderContext::from_assignments(&vars).map_err(LaunchError::from)?;
    manifest::from_template(&text, &context)
}

#[given("the single app manifest")]
fn given_single_app_manifest(launch_state: &LaunchState) {
    launch_state
        .manifest_text
        .set(String::from(SINGLE_APP_MANIFEST));
}

#[given("the templated manifest")]
fn given_templated_manifest(launch_state: &LaunchState) {
    launch_state
        .manifest_text
        .set(String::from(TEMPLATED_MANIFEST));
}

#[given("the empty manifest")]
fn given_empty_manifest(launch_state: &LaunchState) {
    launch_state.manifest_text.set(String::from(EMPTY_MANIFEST));
}

#[given("the oneshot manifest")]
fn given_oneshot_manifest(launch_state: &LaunchState) {
    launch_state
        .manifest_text
        .set(String::from(ONESHOT_MANIFEST));
}

#[given("the template variable {assignment}")]
fn given_template_variable(launch_state: &LaunchState, assignment: String) {
    let mut vars = launch_state.vars.get().unwrap_or_default();
    vars.push(assignment);
    launch_state.vars.set(vars);
}

#[given("the execution mode is dry-run")]
fn given_dry_run(launch_state: &LaunchState) {
    launch_state.mode.set(ExecutionMode::DryRun);
}

#[given("the execution mode is verbose")]
fn given_verbose(launch_state: &LaunchState) {
    launch_state.mode.set(ExecutionMode::Verbose);
}

#[given("the launch runs in the background")]
fn given_background(launch_state: &LaunchState) {
    launch_state.background.set(true);
}

#[given("the runner reports exit code {code}")]
fn given_runner_exit_code(launch_state: &LaunchState, code: i32) {
    launch_state.exit_code.set(code);
}

#[given("the oneshot app is {app}")]
fn given_oneshot_app(launch_state: &LaunchState, app: String) {
    let mut request = launch_state.request.get().unwrap_or_default();
    request.app = Some(app);
    launch_state.request.set(request);
}

#[given("the oneshot command is {cmd}")]
fn given_oneshot_command(launch_state: &LaunchState, cmd: String) {
    let mut request = launch_state.request.get().unwrap_or_default();
    request.cmd = Some(cmd);
    launch_state.request.set(request);
}

#[given("the oneshot name is {name}")]
fn given_oneshot_name(launch_state: &LaunchState, name: String) {
    let mut request = launch_state.request.get().unwrap_or_default();
    request.name = Some(name);
    launch_state.request.set(request);
}

#[when("up is invoked")]
fn when_up_is_invoked(launch_state: &LaunchState) -> StepResult<()> {
    let mut invocation = Invocation::from_state(launch_state);
    let background = launch_state.background.get().unwrap_or(false);

    let result = load_manifest(launch_state).and_then(|manifest| {
        api::up(UpParams {
            config: &invocation.config,
            manifest: &manifest,
            mode: invocation.mode,
            background,
            launch_id: &invocation.launch_id,
            runner: &invocation.runner,
            out: &mut invocation.out,
        })
    });
    invocation.record(launch_state, result)
}

#[when("oneshot is invoked")]
fn when_oneshot_is_invoked(launch_state: &LaunchState) -> StepResult<()> {
    let mut invocation = Invocation::from_state(launch_state);
    let request = launch_state.request.get().unwrap_or_default();

    let result = request
        .validate()
        .map_err(LaunchError::from)
        .and_then(|selection| {
            let manifest = load_manifest(launch_state)?;
            api::oneshot(OneshotParams {
                config: &invocation.config,
                manifest: &manifest,
                selection: &selection,
                mode: invocation.mode,
                launch_id: &invocation.launch_id,
                runner: &invocation.runner,
                out: &mut invocation.out,
            })
        });
    invocation.record(launch_state, result)
}
