//! Ctrl+C handling.
//!
//! The OS handler is registered when [`Interrupt::install`] returns, not when the
//! listener is first awaited. A Ctrl+C delivered during startup or during a write
//! is held until [`Interrupt::recv`] is polled.

use std::io;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
#[cfg(windows)]
use tokio::signal::windows::{CtrlC, ctrl_c};

/// An installed Ctrl+C listener
pub struct Interrupt {
    #[cfg(unix)]
    inner: Signal,
    #[cfg(windows)]
    inner: CtrlC,
}

impl Interrupt {
    /// Register the handler. Must be called from within a tokio runtime.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        let inner = signal(SignalKind::interrupt())?;
        #[cfg(windows)]
        let inner = ctrl_c()?;

        Ok(Self { inner })
    }

    /// Resolve once an interrupt has been delivered since `install`.
    pub async fn recv(&mut self) {
        // `None`: the signal driver is gone and no interrupt can arrive.
        if self.inner.recv().await.is_none() {
            info!("Signal listener closed.");
        }
        info!("Shutdown signal received.");
    }
}
