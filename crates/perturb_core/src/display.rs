//! Off-screen display sessions for models that draw graphics.
//!
//! A [`DisplayProvider`] is injected into the runner. The dispatcher acquires
//! one session per run when the model suppresses graphics; the returned guard
//! releases the session when dropped, so release also happens on error paths.
//!
//! While an Xvfb session is held, `DISPLAY` names it, so models and any
//! processes they spawn draw to the virtual screen. The previous value is
//! restored when the session ends.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::DisplayConfig;
use crate::error::RunError;

/// Held for the lifetime of a display session. Dropping it ends the session.
pub trait DisplayGuard: Send {
    /// X display name models draw to
    fn name(&self) -> &str;
}

pub trait DisplayProvider: Send + Sync {
    /// Start a display session. Fails with [`RunError::Config`] when the host
    /// cannot provide one.
    fn acquire(&self) -> Result<Box<dyn DisplayGuard>, RunError>;
}

const STARTUP_POLL: Duration = Duration::from_millis(10);

/// Virtual framebuffer display backed by an `Xvfb` child process.
#[derive(Debug, Clone, Default)]
pub struct XvfbDisplay {
    config: DisplayConfig,
    executable: Option<PathBuf>,
}

impl XvfbDisplay {
    #[must_use]
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            executable: None,
        }
    }

    /// Use this server binary instead of looking up `Xvfb` on `PATH`
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Whether an `Xvfb` executable can be found on `PATH`
    #[must_use]
    pub fn is_available() -> bool {
        find_executable("Xvfb").is_some()
    }
}

impl DisplayProvider for XvfbDisplay {
    fn acquire(&self) -> Result<Box<dyn DisplayGuard>, RunError> {
        let program = match &self.executable {
            Some(path) => path.clone(),
            None => find_executable("Xvfb").ok_or_else(|| {
                RunError::Config(
                    "graphics suppression requires Xvfb, which was not found on PATH".to_string(),
                )
            })?,
        };

        let mut child = Command::new(&program)
            .arg(&self.config.server)
            .args(["-screen", "0"])
            .arg(self.config.geometry())
            .args(["-nolisten", "tcp"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RunError::Config(format!("failed to start Xvfb: {e}")))?;

        wait_for_startup(&mut child, &self.config)?;

        tracing::info!(
            display = %self.config.server,
            geometry = %self.config.geometry(),
            "Started virtual display"
        );

        let previous = std::env::var_os("DISPLAY");
        // SAFETY: set while no worker pool is running; evaluations only
        // start after the session is acquired.
        unsafe { std::env::set_var("DISPLAY", &self.config.server) };

        Ok(Box::new(XvfbGuard {
            child,
            name: self.config.server.clone(),
            previous,
        }))
    }
}

/// The server exits right away when it cannot open the display, e.g. when
/// the display number is taken. Surviving the startup window counts as started.
fn wait_for_startup(child: &mut Child, config: &DisplayConfig) -> Result<(), RunError> {
    let deadline = Instant::now() + config.startup_timeout();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Err(RunError::Config(format!(
                    "Xvfb exited during startup on display {} ({status})",
                    config.server
                )));
            }
            Ok(None) if Instant::now() >= deadline => return Ok(()),
            Ok(None) => thread::sleep(STARTUP_POLL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Config(format!("failed to watch Xvfb: {e}")));
            }
        }
    }
}

struct XvfbGuard {
    child: Child,
    name: String,
    previous: Option<OsString>,
}

impl DisplayGuard for XvfbGuard {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for XvfbGuard {
    fn drop(&mut self) {
        // SAFETY: the dispatcher drops the guard after the worker pool has
        // finished.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var("DISPLAY", value),
                None => std::env::remove_var("DISPLAY"),
            }
        }
        if let Err(e) = self.child.kill() {
            tracing::warn!(display = %self.name, error = %e, "Failed to stop virtual display");
        }
        let _ = self.child.wait();
        tracing::info!(display = %self.name, "Stopped virtual display");
    }
}

/// Provider for hosts without any display support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl DisplayProvider for NoDisplay {
    fn acquire(&self) -> Result<Box<dyn DisplayGuard>, RunError> {
        Err(RunError::Config(
            "graphics suppression was requested but no display provider is configured"
                .to_string(),
        ))
    }
}

fn find_executable(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
