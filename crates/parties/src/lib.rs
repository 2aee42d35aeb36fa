//! Parties domain module (customers, vendors, consignors — event-sourced).
//!
//! This crate contains business rules for the people and companies a
//! dealership transacts with, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod party;

pub use party::{
    ContactInfo, Party, PartyCommand, PartyEvent, PartyId, PartyKind, PartyRegistered,
    PartyStatus, PartySuspended, PartyUpdated, RegisterParty, SuspendParty, UpdateDetails,
};
