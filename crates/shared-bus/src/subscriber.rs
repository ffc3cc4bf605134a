//! # Event Subscriber
//!
//! Filtered views over the bus. A subscription only sees events published
//! after it was created, so subscribe to a flow id before starting the flow.

use crate::events::{BusEvent, EventFilter};
use shared_types::ProgressStep;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Event bus closed")]
    Closed,
}

/// Anything events can be subscribed from.
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A filtered receiver on the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<BusEvent>,
    filter: EventFilter,
}

/// What one flow run published, up to its last event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowTrace {
    /// Steps in the order they were reached.
    pub steps: Vec<ProgressStep>,
    /// Set when the run ended in `FlowFailed`.
    pub failure: Option<String>,
}

impl FlowTrace {
    fn record(&mut self, event: &BusEvent) -> bool {
        match event {
            BusEvent::FlowProgress { step, .. } => {
                self.steps.push(*step);
                step.is_terminal()
            }
            BusEvent::FlowFailed { reason, .. } => {
                self.failure = Some(reason.clone());
                true
            }
            _ => false,
        }
    }

    /// True once a terminal step or a failure was seen.
    pub fn is_complete(&self) -> bool {
        self.failure.is_some() || self.steps.last().is_some_and(ProgressStep::is_terminal)
    }
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<BusEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next matching event; `None` once the bus is gone.
    ///
    /// Events lost to a lagging receiver are skipped.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "Subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event already buffered, without waiting.
    pub fn try_recv(&mut self) -> Result<Option<BusEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Every matching event currently buffered, oldest first.
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait until the flow this subscription follows ends, then return its
    /// trace. Returns what was seen so far if the bus closes first.
    pub async fn follow_flow(&mut self) -> FlowTrace {
        let mut trace = FlowTrace::default();
        while let Some(event) = self.recv().await {
            if trace.record(&event) {
                break;
            }
        }
        trace
    }

    /// Trace of the buffered events only.
    pub fn drain_flow(&mut self) -> FlowTrace {
        let mut trace = FlowTrace::default();
        for event in self.drain() {
            trace.record(&event);
        }
        trace
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// `Stream` adapter over a subscription.
pub struct EventStream {
    inner: BroadcastStream<BusEvent>,
    filter: EventFilter,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self {
            inner: BroadcastStream::new(subscription.receiver),
            filter: subscription.filter,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = BusEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) if self.filter.matches(&event) => {
                    return Poll::Ready(Some(event))
                }
                Poll::Ready(Some(Ok(_))) => {}
                Poll::Ready(Some(Err(err))) => {
                    debug!(error = %err, "Stream lagged, events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
