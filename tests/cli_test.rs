// Process-level checks of the userdir binary that need no terminal.

use std::process::{Command, Stdio};

// 1) Startup failures surface as a non-zero exit with the cause on stderr
#[test]
fn startup_error_exits_non_zero() {
    let log = std::env::temp_dir()
        .join(format!("userdir_missing_dir_{}", std::process::id()))
        .join("userdir.log");
    let out = Command::new(env!("CARGO_BIN_EXE_userdir"))
        .arg("--log-file")
        .arg(&log)
        .stdin(Stdio::null())
        .output()
        .expect("run userdir");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("create log file"), "{stderr}");
}

// 2) Invalid configuration is rejected before anything starts
#[test]
fn invalid_base_url_is_rejected() {
    let out = Command::new(env!("CARGO_BIN_EXE_userdir"))
        .args(["--base-url", "ftp://example.com"])
        .stdin(Stdio::null())
        .output()
        .expect("run userdir");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported scheme"));
}
