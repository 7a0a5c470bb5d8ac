//! Integration tests for the mdevadm harness.
//!
//! These invoke the mdevadm binary as a subprocess; Cargo builds it for the
//! test run and exports its path via `CARGO_BIN_EXE_mdevadm`.

use std::io::Write;
use std::process::{Command, Stdio};

fn mdevadm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mdevadm"))
}

#[test]
fn ids_prints_canonical_rules_and_warns_on_bad_entries() {
    let output = mdevadm()
        .args(["ids", "1af4:1000,bad,8086:100e:ffff"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to execute mdevadm ids");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "1af4:1000:ffff:ffff:0:0\n8086:100e:ffff:ffff:0:0\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid id string \"bad\""),
        "expected a warning for the malformed entry, got:\n{stderr}"
    );
}

#[test]
fn ids_rejects_oversize_string() {
    let long = "1af4:1000,".repeat(200);
    let output = mdevadm()
        .args(["ids", &long])
        .output()
        .expect("failed to execute mdevadm ids");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("maximum is 1024"), "stderr was:\n{stderr}");
}

#[test]
fn run_replays_a_scenario_from_stdin() {
    let script = "\
attach 00:04.0 1af4:1000
attach 00:1f.2 8086:2922
create 00:04.0 0
create 00:04.0 0
describe 00:04.0 0
remove 1
describe 00:04.0 0
detach 00:04.0
list
";
    let mut child = mdevadm()
        .args(["--ids", "1af4:1000", "run", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn mdevadm run");
    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");
    let output = child.wait_with_output().expect("failed to wait for mdevadm");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "mdevadm run failed (exit={:?}):\nstdout:\n{stdout}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    assert_eq!(
        stdout,
        "\
attach 00:04.0: bound
attach 00:1f.2: no matching id
create 00:04.0 0: instance 1
create 00:04.0 0: error: no available instances for this type
name: 0
description: mdev-pci mdev
device_api: vfio-pci
available_instances: 0
remove 1: done
name: 0
description: mdev-pci mdev
device_api: vfio-pci
available_instances: 1
detach 00:04.0: unbound
"
    );
}

#[test]
fn run_rejects_a_malformed_script() {
    let mut child = mdevadm()
        .args(["run", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn mdevadm run");
    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(b"list\nfrobnicate the device\n")
        .expect("failed to write script");
    let output = child.wait_with_output().expect("failed to wait for mdevadm");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr was:\n{stderr}");
}
