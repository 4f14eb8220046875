//! Per-question countdown.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::controller::{SessionEvent, Ticket};

const TICK: Duration = Duration::from_secs(1);

/// Owned handle to a running countdown.
///
/// The countdown posts a [`SessionEvent::Tick`] every second and a final
/// [`SessionEvent::TimeUp`]. Cancelling or dropping the handle stops it.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn start(seconds: u32, ticket: Ticket, events: UnboundedSender<SessionEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut remaining = seconds;
            while remaining > 0 {
                tokio::time::sleep(TICK).await;
                remaining -= 1;
                if remaining > 0 && events.send(SessionEvent::Tick { ticket, remaining }).is_err() {
                    return;
                }
            }
            let _ = events.send(SessionEvent::TimeUp { ticket });
        });
        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
