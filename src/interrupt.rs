//! Ctrl+C delivery to the turn that is in flight.
//!
//! Tokio's Ctrl+C handler stays installed once it is first awaited, so a
//! single background task owns it for the whole process. Each turn takes a
//! [`Listener`] that only sees interrupts raised after it was created; an
//! interrupt nobody is listening for exits the process like a plain SIGINT.

use std::sync::Arc;
use tokio::sync::watch;

use crate::constants::INTERRUPTED_EXIT_CODE;

/// The operator pressed Ctrl+C at a prompt.
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Fan-out point for interrupts.
pub struct Interrupts {
    count: watch::Sender<u64>,
}

impl Default for Interrupts {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupts {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    /// Routes Ctrl+C into a new [`Interrupts`] for the rest of the process.
    pub fn ctrl_c() -> Arc<Self> {
        let interrupts = Arc::new(Self::new());
        let source = Arc::clone(&interrupts);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !source.raise() {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        });
        interrupts
    }

    /// Records one interrupt. Returns `false` when no turn is listening.
    pub fn raise(&self) -> bool {
        if self.count.receiver_count() == 0 {
            return false;
        }
        self.count.send_modify(|n| *n += 1);
        tracing::debug!(total = *self.count.borrow(), "interrupt raised");
        true
    }

    /// Starts listening. Earlier interrupts are not seen.
    pub fn listen(&self) -> Listener {
        Listener {
            count: Some(self.count.subscribe()),
        }
    }
}

/// One turn's view of [`Interrupts`].
#[derive(Default)]
pub struct Listener {
    count: Option<watch::Receiver<u64>>,
}

impl Listener {
    /// Resolves at the next unseen interrupt. Never resolves when detached.
    pub async fn recv(&mut self) {
        if let Some(count) = self.count.as_mut() {
            if count.changed().await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn fired(listener: &mut Listener) -> bool {
        tokio::time::timeout(Duration::from_millis(20), listener.recv())
            .await
            .is_ok()
    }

    #[test]
    fn test_raise_without_listener_is_refused() {
        let interrupts = Interrupts::new();
        assert!(!interrupts.raise());
    }

    #[tokio::test]
    async fn test_listener_sees_later_interrupt_once() {
        let interrupts = Interrupts::new();
        let mut listener = interrupts.listen();
        assert!(interrupts.raise());

        assert!(fired(&mut listener).await);
        assert!(!fired(&mut listener).await);
    }

    #[tokio::test]
    async fn test_new_listener_ignores_earlier_interrupts() {
        let interrupts = Interrupts::new();
        let first = interrupts.listen();
        assert!(interrupts.raise());
        drop(first);

        let mut second = interrupts.listen();
        assert!(!fired(&mut second).await);
    }

    #[tokio::test]
    async fn test_detached_listener_never_fires() {
        let mut listener = Listener::default();
        assert!(!fired(&mut listener).await);
    }
}
