//! Shutdown signal handling for the shell

use tokio::sync::mpsc;
use tracing::info;

/// Why the shell is asked to exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl ShutdownReason {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
        }
    }
}

/// Shutdown signal handler.
///
/// Listens for OS signals on background tasks and forwards them to a
/// channel the shell loop selects on. Must be created inside the runtime.
pub struct ShutdownSignals {
    receiver: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownSignals {
    /// Start listening for shutdown signals
    #[cfg(unix)]
    pub fn new() -> Result<Self, std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                info!("Received SIGINT");
                if tx_int.send(ShutdownReason::Interrupt).await.is_err() {
                    break;
                }
            }
        });

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            if sigterm.recv().await.is_some() {
                info!("Received SIGTERM");
                let _ = tx.send(ShutdownReason::Terminate).await;
            }
        });

        Ok(Self { receiver: rx })
    }

    /// Start listening for Ctrl+C
    #[cfg(not(unix))]
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C");
                if tx.send(ShutdownReason::Interrupt).await.is_err() {
                    break;
                }
            }
        });
        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        self.receiver.recv().await
    }
}
