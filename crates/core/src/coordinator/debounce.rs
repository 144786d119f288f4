//! Cancellable delayed task.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a callback once the input has been quiet for `window`.
///
/// Scheduling again aborts the previous task. Every schedule gets a ticket;
/// only the latest ticket is current, so a callback that raced its own abort
/// can still be recognised as stale by its receiver.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    ticket: u64,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            ticket: 0,
            handle: None,
        }
    }

    /// Schedule `on_fire(ticket)` after the quiet window, replacing any
    /// pending schedule. Returns the new ticket.
    pub fn schedule<F>(&mut self, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.ticket += 1;
        let ticket = self.ticket;
        let window = self.window;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            on_fire(ticket);
        }));
        ticket
    }

    /// Abort the pending schedule. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                // Invalidate a callback that may already have fired.
                self.ticket += 1;
                pending
            }
            None => false,
        }
    }

    /// Consume a fired ticket. Returns false for a superseded one.
    pub fn fired(&mut self, ticket: u64) -> bool {
        if self.handle.is_some() && ticket == self.ticket {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        let ticket = debouncer.schedule(move |t| {
            let _ = tx.send(t);
        });
        assert!(debouncer.is_pending());

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, ticket);
        assert!(debouncer.fired(fired));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        let tx1 = tx.clone();
        let first = debouncer.schedule(move |t| {
            let _ = tx1.send(t);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = debouncer.schedule(move |t| {
            let _ = tx.send(t);
        });
        assert_ne!(first, second);

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, second);
        // The first task was aborted, so nothing else arrives.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_invalidates_ticket() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let ticket = debouncer.schedule(|_| {});
        assert!(debouncer.cancel());
        assert!(!debouncer.fired(ticket));
        assert!(!debouncer.cancel());
    }
}
