//! Interrupt handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on Ctrl-C (and SIGTERM on unix).
///
/// The task ends after the first signal or once the token is cancelled
/// elsewhere. Abort the handle when the download is over.
pub fn spawn_interrupt_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = shutdown_signal() => match signal {
                Ok(name) => {
                    tracing::info!("Received {}, stopping download", name);
                    token.cancel();
                }
                Err(e) => tracing::warn!("Could not listen for interrupts: {}", e),
            },
        }
    })
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "Ctrl-C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}
