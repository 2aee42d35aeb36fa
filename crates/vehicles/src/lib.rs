//! Vehicles domain module (event-sourced).
//!
//! This crate contains business rules for dealership vehicles — one
//! consolidated vehicle schema, its lifecycle, and the commission/profit
//! arithmetic — implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod test_drive;
pub mod vehicle;

pub use test_drive::{
    CancelTestDrive, ConfirmTestDrive, RequestTestDrive, TestDrive, TestDriveCancelled,
    TestDriveCommand, TestDriveConfirmed, TestDriveEvent, TestDriveId, TestDriveRequested,
    TestDriveState,
};
pub use vehicle::{
    BusinessType, CatalogEntryLinked, Classification, CommissionKind, CommissionTerms, Condition,
    EditVehicle, Feature, FeatureCategory, FuelType, LinkCatalogEntry, MakeAvailable, MarkSold,
    RegisterVehicle, ReleaseVehicle, ReserveVehicle, ReturnVehicle, Transmission, Vehicle,
    VehicleCommand, VehicleEdit, VehicleEdited, VehicleEvent, VehicleId, VehicleMadeAvailable,
    VehiclePricing, VehicleRegistered, VehicleReleased, VehicleReserved, VehicleReturned,
    VehicleSold, VehicleSpec, VehicleState, Vin,
};
