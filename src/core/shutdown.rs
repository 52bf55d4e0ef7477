//! # OS stop signals.
//!
//! [`ShutdownSignal::register`] installs the listeners right away, so a signal
//! that arrives before anyone awaits [`ShutdownSignal::recv`] is still seen.
//! `SIGINT`, `SIGTERM` and `SIGQUIT` are watched on unix, Ctrl-C on windows.
//! Worker threads are not signalled; they end with the process.

use std::io;

/// Termination signal listeners, registered at construction.
#[cfg(unix)]
pub struct ShutdownSignal {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    /// Installs the listeners. Needs a running tokio runtime.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes on the first signal received since registration.
    pub async fn recv(mut self) {
        let received = tokio::select! {
            _ = self.sigint.recv()  => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigquit.recv() => "SIGQUIT",
        };
        tracing::info!(signal = received, "stop signal received");
    }
}

/// Ctrl-C listener, registered at construction.
#[cfg(windows)]
pub struct ShutdownSignal {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl ShutdownSignal {
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    pub async fn recv(mut self) {
        self.ctrl_c.recv().await;
        tracing::info!(signal = "ctrl-c", "stop signal received");
    }
}
