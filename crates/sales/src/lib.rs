//! Vehicle sale orders domain module (event-sourced).
//!
//! This crate contains business rules for selling vehicles to customers,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Each serial-tracked unit sells as its own line with an
//! implicit quantity of one.

pub mod order;

pub use order::{
    AddVehicleLine, CloseOrder, ConfirmOrder, CreateSaleOrder, MarkInvoiced, OrderClosed,
    OrderConfirmed, OrderInvoiced, SaleOrder, SaleOrderCommand, SaleOrderCreated, SaleOrderEvent,
    SaleOrderId, SaleOrderStatus, VehicleLine, VehicleLineAdded,
};
