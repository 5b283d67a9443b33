//! Stateless pub-sub channel for marketplace events.
//!
//! Each [`EventHandler`] owns one receiver and any number of [`EventProducer`]s can feed it. Handlers only see the
//! event itself, never the database, and every event is handled on its own tokio task. When the last producer is
//! dropped, the handler waits for the tasks still in flight and exits.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// An event that can travel through an [`EventHandler`].
pub trait MarketEvent: Send + Sync + 'static {
    /// A short name for the event kind, used in log messages.
    const KIND: &'static str;

    /// The listing the event concerns.
    fn listing_ref(&self) -> String;
}

pub struct EventHandler<E: MarketEvent> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: MarketEvent> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped. Returns the number of events handled.
    pub async fn start_handler(mut self) -> usize {
        debug!("📬️ Starting {} event handler", E::KIND);
        // Only producers keep the channel open from here on
        drop(self.sender);
        let mut jobs = JoinSet::new();
        let mut handled = 0;
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling {} event for listing {}", E::KIND, ev.listing_ref());
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move { (handler)(ev).await });
            handled += 1;
            // Reap finished jobs so the set doesn't grow for the lifetime of the server
            while let Some(done) = jobs.try_join_next() {
                log_job_result(E::KIND, done);
            }
        }
        if !jobs.is_empty() {
            debug!("📬️ Waiting for {} {} jobs to complete", jobs.len(), E::KIND);
        }
        while let Some(done) = jobs.join_next().await {
            log_job_result(E::KIND, done);
        }
        debug!("📬️ {} event handler has shut down after {handled} events", E::KIND);
        handled
    }
}

fn log_job_result(kind: &str, result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("📬️ A {kind} hook did not complete: {e}");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: MarketEvent> {
    sender: mpsc::Sender<E>,
}

impl<E: MarketEvent> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event. A closed channel is logged, never raised: the state change that produced the event has
    /// already been committed.
    pub async fn publish_event(&self, event: E) {
        let listing = event.listing_ref();
        if self.sender.send(event).await.is_err() {
            error!("📬️ No {} handler is running. The event for listing {listing} was dropped", E::KIND);
        }
    }
}
