//! Runs generated oneshot scripts against stub `rkt`, `systemd-run`, and
//! `systemctl` executables.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use rkt_launch::api::{self, CommandOutcome, ExecutionMode, OneshotParams};
use rkt_launch::config::AppConfig;
use rkt_launch::engine::ShellRunner;
use rkt_launch::launch_id::LaunchId;
use rkt_launch::manifest::{self, RenderContext};
use rkt_launch::oneshot::OneshotRequest;
use rstest::{fixture, rstest};
use serial_test::serial;
use tempfile::TempDir;

const MANIFEST: &str = "apps:\n  - image: image\n    name: app\n";

/// Saves a pod UUID on `run`; `enter` exits with `ENTER_STATUS`.
const RKT_STUB: &str = r#"#!/bin/sh
case "$1" in
  run)
    for arg in "$@"; do
      case "$arg" in
        --uuid-file-save=*) printf 'pod-uuid' > "${arg#--uuid-file-save=}" ;;
      esac
    done
    ;;
  enter)
    exit ENTER_STATUS
    ;;
esac
"#;

/// Drops unit flags and runs the wrapped command in the foreground.
const SERVICE_RUN_STUB: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --*) shift ;;
    *) break ;;
  esac
done
exec "$@"
"#;

/// Every unit operation fails.
const SERVICE_CONTROL_STUB: &str = "#!/bin/sh\nexit 1\n";

struct StubHost {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl StubHost {
    fn stub(&self, name: &str, body: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, body).expect("stub should be written");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("stub should be made executable");
        path
    }

    fn state_dir(&self) -> &Utf8Path {
        &self.root
    }
}

fn rkt_stub(enter_status: i32) -> String {
    RKT_STUB.replace("ENTER_STATUS", &enter_status.to_string())
}

#[fixture]
fn host() -> StubHost {
    let dir = TempDir::new().expect("tempdir should be created");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("tempdir should be UTF-8");
    StubHost { _dir: dir, root }
}

#[rstest]
#[case(7, CommandOutcome::CommandExit { code: 7 })]
#[case(0, CommandOutcome::Success)]
#[serial]
fn oneshot_reports_enter_status_and_removes_readiness_file(
    host: StubHost,
    #[case] enter_status: i32,
    #[case] expected: CommandOutcome,
) {
    let mut config = AppConfig::default();
    config.engine.binary = host.stub("rkt", &rkt_stub(enter_status)).into_string();
    config.service.run = host.stub("systemd-run", SERVICE_RUN_STUB).into_string();
    config.service.control = host.stub("systemctl", SERVICE_CONTROL_STUB).into_string();
    config.oneshot.state_dir = host.state_dir().to_path_buf();
    config.oneshot.poll_interval_ms = 10;
    config.oneshot.privileged_enter = false;

    let manifest = manifest::from_template(MANIFEST, &RenderContext::new())
        .expect("manifest should load");
    let selection = OneshotRequest {
        app: Some(String::from("app")),
        cmd: Some(String::from("run_tests")),
        name: None,
    }
    .validate()
    .expect("arguments should be valid");
    let launch_id = LaunchId::from_token("itest");
    let readiness_file = launch_id.readiness_file(host.state_dir(), &config.service.unit_prefix);
    let runner = ShellRunner::default();
    let mut out = Vec::new();

    let outcome = api::oneshot(OneshotParams {
        config: &config,
        manifest: &manifest,
        selection: &selection,
        mode: ExecutionMode::Normal,
        launch_id: &launch_id,
        runner: &runner,
        out: &mut out,
    })
    .expect("the script should run");

    assert_eq!(outcome, expected);
    assert!(out.is_empty());
    assert!(
        !readiness_file.exists(),
        "readiness file {readiness_file} should be removed"
    );
}
