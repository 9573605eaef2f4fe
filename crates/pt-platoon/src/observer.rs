//! Platoon observer trait for event collection and progress reporting.

use pt_core::{Tick, VehicleId};
use pt_vehicle::{EventKind, ProtocolEvent, State, VehicleRecord};

/// Callbacks invoked by [`Platoon::tick`][crate::Platoon::tick] and
/// [`Platoon::finish`][crate::Platoon::finish].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — abort counter
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct AbortCounter(usize);
///
/// impl PlatoonObserver for AbortCounter {
///     fn on_event(&mut self, event: &ProtocolEvent) {
///         if matches!(event.kind, EventKind::AbortRequested { .. }) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait PlatoonObserver {
    /// Called before any member runs for `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event, in the order the members produced them.
    fn on_event(&mut self, _event: &ProtocolEvent) {}

    /// Called after every member has run.  `leader_state` is the state the
    /// leader will handle on its next tick.
    fn on_tick_end(&mut self, _tick: Tick, _leader_state: State) {}

    /// Called once by `Platoon::finish` with every member's record, front to
    /// back.
    fn on_run_end(&mut self, _final_tick: Tick, _records: &[(VehicleId, &VehicleRecord)]) {}
}

/// A [`PlatoonObserver`] that does nothing.
pub struct NoopObserver;

impl PlatoonObserver for NoopObserver {}

/// Keeps every event in memory.
#[derive(Default, Debug)]
pub struct EventLog {
    pub events: Vec<ProtocolEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events produced by `vehicle`.
    pub fn for_vehicle(&self, vehicle: VehicleId) -> impl Iterator<Item = &ProtocolEvent> + '_ {
        self.events.iter().filter(move |e| e.vehicle == vehicle)
    }

    /// Number of events whose kind is called `name` (see [`EventKind::name`]).
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.kind.name() == name).count()
    }

    /// State names `vehicle` switched to, in order.
    pub fn states_of(&self, vehicle: VehicleId) -> Vec<String> {
        self.for_vehicle(vehicle)
            .filter_map(|e| match &e.kind {
                EventKind::StateChanged { visit } => Some(visit.to_string()),
                _ => None,
            })
            .collect()
    }
}

impl PlatoonObserver for EventLog {
    fn on_event(&mut self, event: &ProtocolEvent) {
        self.events.push(event.clone());
    }
}
