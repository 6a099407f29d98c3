//! Platform integration: hand composed links to the desktop URL opener.
//!
//! Only `mailto:`, `http:` and `https:` links are passed on; the opener is
//! `open` on macOS and `xdg-open` elsewhere.

use std::process::{Child, Command, Stdio};

use anyhow::{anyhow, bail};
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;

const ALLOWED_SCHEMES: [&str; 3] = ["mailto", "http", "https"];

#[derive(Clone, Debug)]
pub struct LinkOpener {
    program: String,
}

impl LinkOpener {
    pub fn new() -> Self {
        Self::with_program(default_program())
    }

    /// Use a specific opener binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Start the opener for `link` and return at once; its exit status is
    /// collected on a background thread and logged.
    pub fn open(&self, link: &str) -> Result<()> {
        let url = validate_link(link)?;
        let child = self.spawn(&url)?;
        let program = self.program.clone();
        std::thread::Builder::new()
            .name("link-opener".into())
            .spawn(move || {
                if let Err(e) = reap(&program, child) {
                    warn!(error = %e, "link opener failed");
                }
            })
            .map_err(|e| anyhow!("failed to watch {}: {}", self.program, e))?;
        Ok(())
    }

    fn spawn(&self, url: &Url) -> Result<Child> {
        debug!(program = %self.program, %url, "opening link");
        Command::new(&self.program)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow!("failed to execute {} {}: {}", self.program, url, e))
    }
}

/// Wait for an opener process and turn a non-zero exit into an error.
fn reap(program: &str, child: Child) -> Result<()> {
    let output = child
        .wait_with_output()
        .map_err(|e| anyhow!("failed to wait for {}: {}", program, e))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(anyhow!(format_cli_error(program, &output)))
    }
}

impl Default for LinkOpener {
    fn default() -> Self {
        Self::new()
    }
}

fn default_program() -> &'static str {
    if cfg!(target_os = "macos") { "open" } else { "xdg-open" }
}

/// Parse `link` and reject anything that is not a mail or web link.
pub fn validate_link(link: &str) -> Result<Url> {
    let url = Url::parse(link).map_err(|e| anyhow!("invalid link '{link}': {e}"))?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        bail!("refusing to open '{}' link", url.scheme());
    }
    Ok(url)
}

fn format_cli_error(cmd: &str, output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("{} returned non-zero status: {}", cmd, output.status)
    } else {
        format!("{} failed: {}", cmd, stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mail_and_web_links() {
        assert!(validate_link("mailto:john@example.com").is_ok());
        assert!(validate_link("http://johndoe.com").is_ok());
        assert!(validate_link("https://johndoe.com/about").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(validate_link("file:///etc/passwd").is_err());
        assert!(validate_link("javascript:alert(1)").is_err());
        assert!(validate_link("johndoe.com").is_err());
    }

    #[test]
    fn missing_opener_is_an_error() {
        let opener = LinkOpener::with_program("userdir-no-such-opener");
        let err = opener.open("http://johndoe.com").expect_err("missing binary");
        assert!(err.to_string().contains("userdir-no-such-opener"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_opener_reports_status() {
        let url = validate_link("mailto:john@example.com").expect("valid link");
        let failing = LinkOpener::with_program("false");
        let err = reap("false", failing.spawn(&url).expect("spawn")).expect_err("non-zero exit");
        assert!(err.to_string().contains("false"));

        let ok = LinkOpener::with_program("true");
        assert!(reap("true", ok.spawn(&url).expect("spawn")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn open_returns_before_the_opener_exits() {
        use std::os::unix::fs::PermissionsExt;

        let script = std::env::temp_dir().join(format!("userdir_slow_opener_{}", std::process::id()));
        std::fs::write(&script, "#!/bin/sh\nsleep 3\n").expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let opener = LinkOpener::with_program(script.to_string_lossy());
        let started = std::time::Instant::now();
        assert!(opener.open("http://johndoe.com").is_ok());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }
}
