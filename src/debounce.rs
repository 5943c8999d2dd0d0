//! Search-input debouncing.
//!
//! Raw keystrokes are coalesced: a value only settles after a quiet period
//! with no newer submission, and each new submission supersedes the pending
//! one (last-write-wins, timers never stack). The settled stream is what
//! feeds the query pipeline, bounding recomputation to at most once per
//! quiet window instead of once per keystroke.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

/// Handle for submitting raw input values.
///
/// Dropping the handle flushes any pending value and stops the worker.
#[derive(Debug, Clone)]
pub struct Debouncer {
    input: mpsc::UnboundedSender<String>,
}

impl Debouncer {
    /// Spawn a debouncer with the given quiet window.
    ///
    /// Returns the input handle and the receiver of settled values. Must be
    /// called from within a tokio runtime.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                if pending.is_some() {
                    tokio::select! {
                        next = input_rx.recv() => match next {
                            // newer keystroke: supersede and restart the timer
                            Some(value) => pending = Some(value),
                            None => {
                                if let Some(last) = pending.take() {
                                    let _ = settled_tx.send(last);
                                }
                                break;
                            }
                        },
                        _ = sleep(window) => {
                            if let Some(settled) = pending.take() {
                                if settled_tx.send(settled).is_err() {
                                    break;
                                }
                            }
                        }
                    }
                } else {
                    match input_rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    }
                }
            }
        });

        (Self { input: input_tx }, settled_rx)
    }

    /// Submit a raw input value. Resets the quiet timer.
    pub fn submit(&self, value: impl Into<String>) {
        let _ = self.input.send(value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_settle_once_with_final_value() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        for value in ["a", "ap", "app", "appl", "apple"] {
            debouncer.submit(value);
            advance(Duration::from_millis(50)).await;
        }

        advance(Duration::from_millis(300)).await;
        assert_eq!(settled.recv().await.as_deref(), Some("apple"));

        // no further emissions queued up
        advance(Duration::from_millis(600)).await;
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_inputs_settle_separately() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        debouncer.submit("bread");
        advance(Duration::from_millis(400)).await;
        assert_eq!(settled.recv().await.as_deref(), Some("bread"));

        debouncer.submit("milk");
        advance(Duration::from_millis(400)).await;
        assert_eq!(settled.recv().await.as_deref(), Some("milk"));
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_inside_window_resets_the_timer() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        debouncer.submit("br");
        advance(Duration::from_millis(250)).await;
        assert!(settled.try_recv().is_err(), "must not settle early");

        debouncer.submit("bread");
        advance(Duration::from_millis(250)).await;
        assert!(settled.try_recv().is_err(), "timer must have been reset");

        advance(Duration::from_millis(100)).await;
        assert_eq!(settled.recv().await.as_deref(), Some("bread"));
    }

    #[tokio::test]
    async fn dropping_the_handle_flushes_the_pending_value() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_secs(60));
        debouncer.submit("last words");
        drop(debouncer);

        let flushed = timeout(Duration::from_secs(1), settled.recv())
            .await
            .expect("flush should not hang");
        assert_eq!(flushed.as_deref(), Some("last words"));
        assert_eq!(settled.recv().await, None);
    }
}
