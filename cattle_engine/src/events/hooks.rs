use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{DealClosedEvent, EventHandler, EventProducer, Handler, SettlementCompletedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub deal_closed_producer: Vec<EventProducer<DealClosedEvent>>,
    pub settlement_completed_producer: Vec<EventProducer<SettlementCompletedEvent>>,
}

impl EventProducers {
    pub async fn publish_deal_closed(&self, event: DealClosedEvent) {
        for producer in &self.deal_closed_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_settlement_completed(&self, event: SettlementCompletedEvent) {
        for producer in &self.settlement_completed_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_deal_closed: Option<EventHandler<DealClosedEvent>>,
    pub on_settlement_completed: Option<EventHandler<SettlementCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_deal_closed = hooks.on_deal_closed.map(|f| EventHandler::new(buffer_size, f));
        let on_settlement_completed = hooks.on_settlement_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_deal_closed, on_settlement_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_deal_closed {
            result.deal_closed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_settlement_completed {
            result.settlement_completed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_deal_closed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_settlement_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_deal_closed: Option<Handler<DealClosedEvent>>,
    pub on_settlement_completed: Option<Handler<SettlementCompletedEvent>>,
}

impl EventHooks {
    pub fn on_deal_closed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DealClosedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_deal_closed = Some(Arc::new(f));
        self
    }

    pub fn on_settlement_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SettlementCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_settlement_completed = Some(Arc::new(f));
        self
    }

    /// Hooks that only log the events they receive.
    pub fn logging() -> Self {
        let mut hooks = EventHooks::default();
        hooks
            .on_deal_closed(|ev: DealClosedEvent| {
                Box::pin(async move {
                    info!("📬️ Deal closed: listing {} sold to {}", ev.listing.id, ev.proposal.buyer);
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            })
            .on_settlement_completed(|ev: SettlementCompletedEvent| {
                Box::pin(async move {
                    info!(
                        "📬️ Settlement completed: transaction {} for listing {} ({:?})",
                        ev.transaction.id, ev.transaction.listing_id, ev.transaction.final_amount
                    );
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            });
        hooks
    }
}
