use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only event stream.
///
/// Read models are **disposable**: delete and rebuild them from events at
/// any time — events are the source of truth. Because delivery is
/// at-least-once, `apply` must be idempotent (sequence checks are handled
/// by `ProjectionRunner`, but the domain-level update should tolerate
/// replays too). The envelope carries `tenant_id`; projections must scope
/// their updates to it.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    ///
    /// Does not return errors: irrelevant events are ignored, unrecoverable
    /// ones indicate a bug. Structured failures (tenant mismatch, sequence
    /// gaps) are reported by `ProjectionRunner::apply`.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
