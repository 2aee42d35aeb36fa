//! Vehicle reconciliation policy.
//!
//! Keeps a dealership vehicle, its sellable catalog entry, and serial-level
//! availability mutually consistent as units move through receiving,
//! availability, reservation, sale, and return.
//!
//! Every operation is a pure decision over the current [`ReconcileState`]:
//! it returns the [`DealershipEvent`]s that must be applied, and an explicit
//! caller applies them (to the in-memory state here, to the host stores in
//! production). No side effect happens inside a persistence hook.

pub mod event;
pub mod policy;
pub mod state;


pub use event::{AuditNote, DealershipEvent, VehicleDelisted};
pub use policy::{
    AttributeEdit, BatchReport, DelistRequest, Delisted, EditApplied, FailedReceipt,
    InventoryReceipt, ReceiveOutcome, ReconcilePolicy, Registered, ReturnRequest, SaleApplied,
    SaleConfirmation, VehicleRegistration,
};
pub use state::ReconcileState;
