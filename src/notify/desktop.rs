// src/notify/desktop.rs
//! Desktop popup through the platform's notifier binary. A missing binary
//! (headless box, container) is a silent no-op.

use anyhow::{anyhow, Context, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{display_location, ItemNotifier};
use crate::ingest::types::Posting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Launcher {
    NotifySend,
    Osascript,
}

impl Launcher {
    fn for_host() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Self::Osascript)
        } else if cfg!(unix) {
            Some(Self::NotifySend)
        } else {
            None
        }
    }

    fn argv(self, title: &str, body: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::NotifySend => (
                "notify-send",
                vec![
                    "--expire-time=10000".to_string(),
                    title.to_string(),
                    body.to_string(),
                ],
            ),
            Self::Osascript => (
                "osascript",
                vec![
                    "-e".to_string(),
                    format!(
                        "display notification \"{}\" with title \"{}\"",
                        applescript_escape(body),
                        applescript_escape(title)
                    ),
                ],
            ),
        }
    }
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub struct DesktopNotifier {
    launcher: Option<Launcher>,
    timeout: Duration,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            launcher: Launcher::for_host(),
            timeout: Duration::from_secs(5),
        }
    }
}

fn popup_text(p: &Posting) -> (String, String) {
    (
        p.title.clone(),
        format!("{} | {}\n{}", p.company, display_location(p), p.source),
    )
}

#[async_trait::async_trait]
impl ItemNotifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn notify(&self, p: &Posting) -> Result<()> {
        let Some(launcher) = self.launcher else {
            return Ok(());
        };
        let (title, body) = popup_text(p);
        let (program, args) = launcher.argv(&title, &body);

        let spawned = Command::new(program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(program, "desktop notifier not installed");
                return Ok(());
            }
            Err(e) => return Err(e).with_context(|| format!("spawning {program}")),
        };

        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| anyhow!("{program} timed out after {:?}", self.timeout))?
            .with_context(|| format!("waiting for {program}"))?;
        if !status.success() {
            return Err(anyhow!("{program} exited with {status}"));
        }
        Ok(())
    }
}
