//! The shared pending-message queue.

use pt_core::{OvertakingParams, Tick, VehicleId};
use tracing::trace;

use crate::latency::{ExponentialDelay, LatencyModel, NoDelay};
use crate::message::{Envelope, MessageKind, Payload};

/// Simulated car-to-everything channel.
///
/// Holds every envelope not yet received, in send order.  Nothing is ever
/// dropped by the channel itself; an envelope nobody receives stays queued
/// until [`clear`][Self::clear].
pub struct C2x {
    queue:   Vec<Envelope>,
    delays:  Vec<u64>,
    next_id: u64,
    latency: Box<dyn LatencyModel>,
}

impl C2x {
    pub fn new(latency: Box<dyn LatencyModel>) -> Self {
        Self { queue: Vec::new(), delays: Vec::new(), next_id: 0, latency }
    }

    /// Channel without transit delay.
    pub fn reliable() -> Self {
        Self::new(Box::new(NoDelay))
    }

    /// Exponential delays with `params.mean_msg_delay_steps` seeded by
    /// `params.c2x_seed`, or no delay when the mean is zero.
    pub fn from_params(params: &OvertakingParams) -> Self {
        if params.mean_msg_delay_steps > 0.0 {
            Self::new(Box::new(ExponentialDelay::new(
                params.mean_msg_delay_steps,
                params.c2x_seed,
            )))
        } else {
            Self::reliable()
        }
    }

    /// Enqueue a message sent at `step`.  Returns the envelope id.
    pub fn send(
        &mut self,
        source:      VehicleId,
        destination: VehicleId,
        kind:        MessageKind,
        payload:     Payload,
        step:        Tick,
    ) -> u64 {
        let delay = self.latency.delay_steps(source, destination);
        self.delays.push(delay);

        let id = self.next_id;
        self.next_id += 1;
        trace!(id, %source, %destination, %kind, delay, "c2x send");
        self.queue.push(Envelope {
            id,
            source,
            destination,
            kind,
            payload,
            deliver_at: step + delay,
        });
        id
    }

    /// Remove and return every envelope for `destination` deliverable at
    /// `step`, oldest first.
    pub fn receive(&mut self, destination: VehicleId, step: Tick) -> Vec<Envelope> {
        let (ready, waiting): (Vec<Envelope>, Vec<Envelope>) = self
            .queue
            .drain(..)
            .partition(|env| env.is_deliverable(destination, step));
        self.queue = waiting;
        ready
    }

    /// Drop every pending envelope.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Envelopes still in transit or never received.
    pub fn pending(&self) -> &[Envelope] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Every delay sampled so far, one entry per `send`.
    pub fn delays(&self) -> &[u64] {
        &self.delays
    }
}
