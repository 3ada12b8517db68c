//! Assertion helpers for launch behavioural tests.

use rkt_launch::api::CommandOutcome;
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LaunchOutcome, LaunchState, SINGLE_APP_COMMAND};

fn result_of(launch_state: &LaunchState) -> StepResult<LaunchOutcome> {
    launch_state
        .result
        .get()
        .ok_or_else(|| String::from("result should be set"))
}

fn printed(launch_state: &LaunchState) -> StepResult<String> {
    launch_state
        .printed
        .get()
        .ok_or_else(|| String::from("printed text should be recorded"))
}

fn executed(launch_state: &LaunchState) -> StepResult<Vec<String>> {
    launch_state
        .executed
        .get()
        .ok_or_else(|| String::from("executed scripts should be recorded"))
}

/// Returns the single script handed to the runner.
fn only_executed(launch_state: &LaunchState) -> StepResult<String> {
    let scripts = executed(launch_state)?;
    match scripts.as_slice() {
        [script] => Ok(script.clone()),
        others => Err(format!(
            "expected one executed command, got {}",
            others.len()
        )),
    }
}

#[then("the outcome is success")]
fn outcome_is_success(launch_state: &LaunchState) -> StepResult<()> {
    match result_of(launch_state)? {
        LaunchOutcome::Ok(CommandOutcome::Success) => Ok(()),
        LaunchOutcome::Ok(CommandOutcome::CommandExit { code }) => Err(format!(
            "expected Success, got CommandExit {{ code: {code} }}"
        )),
        LaunchOutcome::Err(msg) => Err(format!("expected Success, got error: {msg}")),
    }
}

#[then("the outcome is command exit with code {expected_code}")]
fn outcome_is_command_exit(launch_state: &LaunchState, expected_code: i32) -> StepResult<()> {
    match result_of(launch_state)? {
        LaunchOutcome::Ok(CommandOutcome::CommandExit { code }) if code == expected_code => Ok(()),
        LaunchOutcome::Ok(CommandOutcome::CommandExit { code }) => {
            Err(format!("expected exit code {expected_code}, got {code}"))
        }
        LaunchOutcome::Ok(CommandOutcome::Success) => Err(format!(
            "expected CommandExit {{ code: {expected_code} }}, got Success"
        )),
        LaunchOutcome::Err(msg) => Err(format!(
            "expected CommandExit {{ code: {expected_code} }}, got error: {msg}"
        )),
    }
}

#[then("the error mentions {fragment}")]
fn error_mentions(launch_state: &LaunchState, fragment: String) -> StepResult<()> {
    match result_of(launch_state)? {
        LaunchOutcome::Err(msg) if msg.contains(&fragment) => Ok(()),
        LaunchOutcome::Err(msg) => Err(format!(
            "expected error containing '{fragment}', got: {msg}"
        )),
        LaunchOutcome::Ok(outcome) => Err(format!("expected an error, got {outcome:?}")),
    }
}

#[then("the printed text is the single app command")]
fn printed_is_single_app_command(launch_state: &LaunchState) -> StepResult<()> {
    let text = printed(launch_state)?;
    if text == format!("{SINGLE_APP_COMMAND}\n") {
        Ok(())
    } else {
        Err(format!("unexpected printed text:\n{text}"))
    }
}

#[then("the printed text contains {fragment}")]
fn printed_contains(launch_state: &LaunchState, fragment: String) -> StepResult<()> {
    let text = printed(launch_state)?;
    if text.contains(&fragment) {
        Ok(())
    } else {
        Err(format!("printed text lacks '{fragment}':\n{text}"))
    }
}

#[then("the printed text ends with {suffix}")]
fn printed_ends_with(launch_state: &LaunchState, suffix: String) -> StepResult<()> {
    let text = printed(launch_state)?;
    if text.trim_end_matches('\n').ends_with(&suffix) {
        Ok(())
    } else {
        Err(format!("printed text does not end with '{suffix}':\n{text}"))
    }
}

#[then("nothing is printed")]
fn nothing_printed(launch_state: &LaunchState) -> StepResult<()> {
    let text = printed(launch_state)?;
    if text.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no output, got:\n{text}"))
    }
}

#[then("no command is executed")]
fn no_command_executed(launch_state: &LaunchState) -> StepResult<()> {
    let scripts = executed(launch_state)?;
    if scripts.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no executed commands, got {scripts:?}"))
    }
}

#[then("exactly one command is executed")]
fn one_command_executed(launch_state: &LaunchState) -> StepResult<()> {
    only_executed(launch_state).map(|_| ())
}

#[then("the executed command equals the printed text")]
fn executed_equals_printed(launch_state: &LaunchState) -> StepResult<()> {
    let script = only_executed(launch_state)?;
    let text = printed(launch_state)?;
    if text.trim_end_matches('\n') == script {
        Ok(())
    } else {
        Err(format!("printed:\n{text}\nexecuted:\n{script}"))
    }
}

#[then("the executed command starts with {prefix}")]
fn executed_starts_with(launch_state: &LaunchState, prefix: String) -> StepResult<()> {
    let script = only_executed(launch_state)?;
    if script.starts_with(&prefix) {
        Ok(())
    } else {
        Err(format!("executed command does not start with '{prefix}':\n{script}"))
    }
}

#[then("the executed command contains {fragment}")]
fn executed_contains(launch_state: &LaunchState, fragment: String) -> StepResult<()> {
    let script = only_executed(launch_state)?;
    if script.contains(&fragment) {
        Ok(())
    } else {
        Err(format!("executed command lacks '{fragment}':\n{script}"))
    }
}
