//! Leasing domain module (event-sourced).
//!
//! This crate contains business rules for lease contracts on dealership
//! vehicles, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod lease;

pub use lease::{
    ActivateLease, CompleteLease, CreateLease, Lease, LeaseActivated, LeaseCommand,
    LeaseCompleted, LeaseCreated, LeaseEvent, LeaseExpired, LeaseId, LeaseState, LeaseTerminated,
    LeaseTerms, MarkExpired, TerminateLease,
};
