use std::future::Future;

use futures_util::{future, StreamExt};

use super::{ErrorMapper, NotificationChannel};
use crate::{page::UnloadListener, ws::ConnectionEvent, ws::EventStream};

enum Step {
    Teardown,
    Unload,
    Event(Option<ConnectionEvent>),
}

async fn unload_fired(listener: Option<&mut UnloadListener>) {
    match listener {
        Some(listener) => listener.fired().await,
        None => future::pending().await,
    }
}

impl<M> NotificationChannel<M>
where
    M: ErrorMapper,
{
    /// Drive the channel until the event stream ends or `teardown` resolves.
    ///
    /// Inputs are handled one at a time: teardown first, then the page unload
    /// signal, then connection events in delivery order. Teardown deactivates
    /// the channel.
    pub async fn run<F>(&mut self, mut events: EventStream, teardown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(teardown);

        log::debug!("Dispatch loop start");

        loop {
            let watch_unload = !self.state.unloading && self.unload.is_some();

            let step = tokio::select! {
                biased;

                _ = &mut teardown => Step::Teardown,

                _ = unload_fired(self.unload.as_mut()), if watch_unload => Step::Unload,

                event = events.next() => Step::Event(event),
            };

            match step {
                Step::Teardown => {
                    log::debug!("Display surface torn down, stop");
                    self.deactivate();
                    break;
                }
                Step::Unload => self.on_before_unload(),
                Step::Event(Some(event)) => self.handle(event),
                Step::Event(None) => {
                    log::debug!("Event stream ended, stop");
                    break;
                }
            }
        }
    }
}
