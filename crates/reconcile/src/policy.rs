//! The reconciliation policy: five entry points that keep vehicles, catalog
//! entries, and serial-level availability agreeing with each other.
//!
//! The policy owns no storage. Each operation reads [`ReconcileState`],
//! decides, and returns the events to apply; cross-aggregate invariants
//! (VIN uniqueness, remaining-serial counts, category resolution) live
//! here, single-aggregate rules live on the aggregates themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motorlot_catalog::{
    AttachOrigin, CatalogEntryId, CategoryBook, CreateEntry, DetachOrigin, EntryCommand,
    MarkUnavailable, SyncEntry,
};
use motorlot_core::{AggregateId, DomainError, DomainResult, TenantId};
use motorlot_events::execute;
use motorlot_vehicles::{
    Classification, EditVehicle, MakeAvailable, MarkSold, RegisterVehicle, ReturnVehicle as
    ReturnVehicleCommand, Vehicle, VehicleCommand, VehicleEdit, VehicleId, VehiclePricing,
    VehicleSpec, Vin,
};

use crate::event::{AuditNote, DealershipEvent, VehicleDelisted};
use crate::state::ReconcileState;

/// Request: register one vehicle (manual entry or import).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRegistration {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub spec: VehicleSpec,
    pub pricing: VehiclePricing,
    pub classification: Classification,
    /// Pre-existing catalog entry to link; when absent exactly one is
    /// synthesized.
    pub catalog_entry_id: Option<CatalogEntryId>,
    pub occurred_at: DateTime<Utc>,
}

/// Request: one physical unit arriving at the dock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReceipt {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub serial: String,
    /// Serial-tracked units move one at a time.
    pub quantity: u32,
    /// Only receipts into internal stock synthesize a vehicle; scrap and
    /// external destinations never do.
    pub internal_destination: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Request: partial attribute edit on a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEdit {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub changes: VehicleEdit,
    pub occurred_at: DateTime<Utc>,
}

/// Request: a customer purchase was finalized for one serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfirmation {
    pub tenant_id: TenantId,
    pub serial: String,
    pub sale_reference: String,
    pub occurred_at: DateTime<Utc>,
}

/// Request: hand a consigned unit back to its consignor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Request: take a vehicle off the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelistRequest {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of [`ReconcilePolicy::register_vehicle`].
#[derive(Debug, Clone)]
pub struct Registered {
    pub vehicle_id: VehicleId,
    pub catalog_entry_id: CatalogEntryId,
    pub events: Vec<DealershipEvent>,
}

/// Outcome of [`ReconcilePolicy::receive_unit`].
#[derive(Debug, Clone)]
pub enum ReceiveOutcome {
    /// A new vehicle was synthesized for this serial.
    Created {
        vehicle_id: VehicleId,
        events: Vec<DealershipEvent>,
    },
    /// The serial is already tracked; documented idempotent no-op.
    AlreadyTracked { vehicle_id: VehicleId },
    /// External/scrap destination; nothing to reconcile.
    SkippedExternal,
}

impl ReceiveOutcome {
    pub fn events(&self) -> &[DealershipEvent] {
        match self {
            ReceiveOutcome::Created { events, .. } => events,
            _ => &[],
        }
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        match self {
            ReceiveOutcome::Created { vehicle_id, .. }
            | ReceiveOutcome::AlreadyTracked { vehicle_id } => Some(*vehicle_id),
            ReceiveOutcome::SkippedExternal => None,
        }
    }
}

/// Outcome of [`ReconcilePolicy::apply_attribute_edit`].
#[derive(Debug, Clone)]
pub struct EditApplied {
    /// Entry that received a one-directional sync, if any.
    pub synced_entry: Option<CatalogEntryId>,
    pub events: Vec<DealershipEvent>,
}

/// Outcome of [`ReconcilePolicy::confirm_sale`].
#[derive(Debug, Clone)]
pub struct SaleApplied {
    pub vehicle_id: VehicleId,
    /// True when this sale consumed the entry's last available serial.
    pub entry_marked_unavailable: bool,
    pub events: Vec<DealershipEvent>,
}

/// Outcome of [`ReconcilePolicy::delist_vehicle`].
#[derive(Debug, Clone)]
pub struct Delisted {
    /// Entry removed by the cascade (exclusively owned by the vehicle).
    pub removed_entry: Option<CatalogEntryId>,
    pub events: Vec<DealershipEvent>,
}

/// One receipt that failed inside a batch.
#[derive(Debug, Clone)]
pub struct FailedReceipt {
    pub serial: String,
    pub error: DomainError,
}

/// Per-item results of a batch receipt; failures never abort the rest.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: Vec<ReceiveOutcome>,
    pub failed: Vec<FailedReceipt>,
}

impl BatchReport {
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// The vehicle reconciliation policy.
///
/// Category references are resolved once at bootstrap and injected here;
/// operations never look a category up by name.
#[derive(Debug, Clone)]
pub struct ReconcilePolicy {
    categories: CategoryBook,
}

impl ReconcilePolicy {
    pub fn new(categories: CategoryBook) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &CategoryBook {
        &self.categories
    }

    /// Register a vehicle, synthesizing and linking a catalog entry when
    /// none is supplied.
    pub fn register_vehicle(
        &self,
        state: &ReconcileState,
        registration: &VehicleRegistration,
    ) -> DomainResult<Registered> {
        if let Some(vin) = &registration.vin {
            if state.vehicle_by_serial(vin.as_str()).is_some() {
                return Err(DomainError::duplicate_identifier(vin.as_str()));
            }
        }

        let mut events = Vec::new();

        let entry_id = registration
            .catalog_entry_id
            .unwrap_or_else(|| CatalogEntryId::new(AggregateId::new()));

        let mut vehicle = Vehicle::empty(registration.vehicle_id);
        let vehicle_events = execute(
            &mut vehicle,
            &VehicleCommand::RegisterVehicle(RegisterVehicle {
                tenant_id: registration.tenant_id,
                vehicle_id: registration.vehicle_id,
                vin: registration.vin.clone(),
                spec: registration.spec.clone(),
                pricing: registration.pricing.clone(),
                classification: registration.classification.clone(),
                catalog_entry_id: Some(entry_id.0),
                occurred_at: registration.occurred_at,
            }),
        )?;
        events.extend(vehicle_events.into_iter().map(DealershipEvent::Vehicle));

        match registration.catalog_entry_id {
            Some(existing_id) => {
                let entry = state.entry(existing_id).ok_or(DomainError::NotFound)?;
                let mut entry_agg = entry.clone();
                let entry_events = execute(
                    &mut entry_agg,
                    &EntryCommand::AttachOrigin(AttachOrigin {
                        tenant_id: registration.tenant_id,
                        entry_id: existing_id,
                        vehicle_id: registration.vehicle_id,
                        occurred_at: registration.occurred_at,
                    }),
                )?;
                events.extend(entry_events.into_iter().map(DealershipEvent::Catalog));
            }
            None => {
                let name = vehicle.display_name();
                let mut entry_agg = motorlot_catalog::CatalogEntry::empty(entry_id);
                let entry_events = execute(
                    &mut entry_agg,
                    &EntryCommand::CreateEntry(CreateEntry {
                        tenant_id: registration.tenant_id,
                        entry_id,
                        name: name.clone(),
                        description: Some(vehicle.spec().description()),
                        list_price: vehicle.pricing().selling_price,
                        cost_price: vehicle.pricing().purchase_cost,
                        currency: vehicle.pricing().currency.clone(),
                        serial_tracked: true,
                        category_id: Some(
                            self.categories.for_business_type(vehicle.business_type()),
                        ),
                        business_type: vehicle.business_type(),
                        default_commission: vehicle.classification().commission,
                        default_vendor: vehicle.classification().vendor_id,
                        spec: Some(vehicle.spec().clone()),
                        origin_vehicle: Some(registration.vehicle_id),
                        occurred_at: registration.occurred_at,
                    }),
                )?;
                events.extend(entry_events.into_iter().map(DealershipEvent::Catalog));
                events.push(note(
                    registration.tenant_id,
                    registration.vehicle_id,
                    format!("Catalog entry created: {name}"),
                    registration.occurred_at,
                ));
            }
        }

        Ok(Registered {
            vehicle_id: registration.vehicle_id,
            catalog_entry_id: entry_id,
            events,
        })
    }

    /// Reconcile one inbound receipt.
    ///
    /// Fires only for internal destinations; duplicate serials are a logged
    /// no-op, never a failure.
    pub fn receive_unit(
        &self,
        state: &ReconcileState,
        receipt: &InventoryReceipt,
    ) -> DomainResult<ReceiveOutcome> {
        if !receipt.internal_destination {
            tracing::debug!(
                serial = %receipt.serial,
                "receipt into external destination; no vehicle synthesized"
            );
            return Ok(ReceiveOutcome::SkippedExternal);
        }

        if receipt.quantity != 1 {
            return Err(DomainError::validation(
                "serial-tracked receipts move exactly one unit",
            ));
        }

        let vin = Vin::new(receipt.serial.clone())?;

        if let Some(existing) = state.vehicle_by_serial(vin.as_str()) {
            tracing::info!(
                serial = %vin,
                vehicle_id = %existing.id_typed(),
                "duplicate receipt ignored; serial already tracked"
            );
            return Ok(ReceiveOutcome::AlreadyTracked {
                vehicle_id: existing.id_typed(),
            });
        }

        let entry = state.entry(receipt.entry_id).ok_or(DomainError::NotFound)?;
        let spec = entry.spec().cloned().ok_or_else(|| {
            DomainError::validation("catalog entry carries no vehicle attributes to copy")
        })?;
        let classification = Classification {
            business_type: entry.business_type(),
            vendor_id: entry.default_vendor(),
            commission: entry.default_commission(),
        };

        let vehicle_id = VehicleId::new(AggregateId::new());
        let mut vehicle = Vehicle::empty(vehicle_id);
        let mut events = Vec::new();

        let registered = execute(
            &mut vehicle,
            &VehicleCommand::RegisterVehicle(RegisterVehicle {
                tenant_id: receipt.tenant_id,
                vehicle_id,
                vin: Some(vin.clone()),
                spec,
                pricing: VehiclePricing::new(
                    entry.cost_price(),
                    entry.list_price(),
                    entry.currency(),
                ),
                classification,
                catalog_entry_id: Some(receipt.entry_id.0),
                occurred_at: receipt.occurred_at,
            }),
        )?;
        events.extend(registered.into_iter().map(DealershipEvent::Vehicle));

        let made_available = execute(
            &mut vehicle,
            &VehicleCommand::MakeAvailable(MakeAvailable {
                tenant_id: receipt.tenant_id,
                vehicle_id,
                occurred_at: receipt.occurred_at,
            }),
        )?;
        events.extend(made_available.into_iter().map(DealershipEvent::Vehicle));

        let mut entry_agg = entry.clone();
        let attached = execute(
            &mut entry_agg,
            &EntryCommand::AttachOrigin(AttachOrigin {
                tenant_id: receipt.tenant_id,
                entry_id: receipt.entry_id,
                vehicle_id,
                occurred_at: receipt.occurred_at,
            }),
        )?;
        events.extend(attached.into_iter().map(DealershipEvent::Catalog));

        events.push(note(
            receipt.tenant_id,
            vehicle_id,
            format!("Vehicle created from receipt (VIN {vin})"),
            receipt.occurred_at,
        ));

        Ok(ReceiveOutcome::Created { vehicle_id, events })
    }

    /// Reconcile a whole receiving event.
    ///
    /// Items are processed independently; a failing item is collected and
    /// never aborts the others. Successful items are applied to `state` as
    /// they land so later items in the same batch see them (this is what
    /// makes an in-batch duplicate serial an idempotent no-op).
    pub fn receive_batch(
        &self,
        state: &mut ReconcileState,
        receipts: &[InventoryReceipt],
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for receipt in receipts {
            match self.receive_unit(state, receipt) {
                Ok(outcome) => {
                    state.apply_all(outcome.events());
                    report.succeeded.push(outcome);
                }
                Err(error) => {
                    tracing::warn!(serial = %receipt.serial, %error, "receipt item failed");
                    report.failed.push(FailedReceipt {
                        serial: receipt.serial.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Persist a partial edit, re-validating uniqueness and classification,
    /// and push display/pricing/classification changes to the linked entry.
    ///
    /// Propagation is one-directional: vehicle → entry, never the reverse.
    pub fn apply_attribute_edit(
        &self,
        state: &ReconcileState,
        edit: &AttributeEdit,
    ) -> DomainResult<EditApplied> {
        let vehicle = state.vehicle(edit.vehicle_id).ok_or(DomainError::NotFound)?;

        if let Some(new_vin) = &edit.changes.vin {
            if let Some(other) = state.vehicle_by_serial(new_vin.as_str()) {
                if other.id_typed() != edit.vehicle_id {
                    return Err(DomainError::duplicate_identifier(new_vin.as_str()));
                }
            }
        }

        let mut updated = vehicle.clone();
        let mut events = Vec::new();
        let vehicle_events = execute(
            &mut updated,
            &VehicleCommand::EditVehicle(EditVehicle {
                tenant_id: edit.tenant_id,
                vehicle_id: edit.vehicle_id,
                changes: edit.changes.clone(),
                occurred_at: edit.occurred_at,
            }),
        )?;
        events.extend(vehicle_events.into_iter().map(DealershipEvent::Vehicle));

        let touches_entry = edit.changes.spec.is_some()
            || edit.changes.pricing.is_some()
            || edit.changes.classification.is_some();

        let mut synced_entry = None;
        if touches_entry {
            if let Some(entry_id) = updated.catalog_entry_id().map(CatalogEntryId::new) {
                let entry = state.entry(entry_id).ok_or(DomainError::NotFound)?;
                let mut entry_agg = entry.clone();
                let entry_events = execute(
                    &mut entry_agg,
                    &EntryCommand::SyncEntry(SyncEntry {
                        tenant_id: edit.tenant_id,
                        entry_id,
                        name: updated.display_name(),
                        description: Some(updated.spec().description()),
                        list_price: updated.pricing().selling_price,
                        cost_price: updated.pricing().purchase_cost,
                        category_id: Some(
                            self.categories.for_business_type(updated.business_type()),
                        ),
                        business_type: updated.business_type(),
                        default_commission: updated.classification().commission,
                        default_vendor: updated.classification().vendor_id,
                        spec: Some(updated.spec().clone()),
                        occurred_at: edit.occurred_at,
                    }),
                )?;
                events.extend(entry_events.into_iter().map(DealershipEvent::Catalog));
                synced_entry = Some(entry_id);
            }
        }

        Ok(EditApplied {
            synced_entry,
            events,
        })
    }

    /// Mark the unit carrying this serial as sold; when that consumes the
    /// entry's last available serial, the entry goes unavailable.
    pub fn confirm_sale(
        &self,
        state: &ReconcileState,
        sale: &SaleConfirmation,
    ) -> DomainResult<SaleApplied> {
        let vehicle = state
            .vehicle_by_serial(&sale.serial)
            .ok_or_else(|| DomainError::unknown_serial(&sale.serial))?;
        let vehicle_id = vehicle.id_typed();

        let mut sold = vehicle.clone();
        let mut events = Vec::new();
        let vehicle_events = execute(
            &mut sold,
            &VehicleCommand::MarkSold(MarkSold {
                tenant_id: sale.tenant_id,
                vehicle_id,
                sale_reference: sale.sale_reference.clone(),
                occurred_at: sale.occurred_at,
            }),
        )?;
        events.extend(vehicle_events.into_iter().map(DealershipEvent::Vehicle));

        let mut entry_marked_unavailable = false;
        if let Some(entry_id) = sold.catalog_entry_id().map(CatalogEntryId::new) {
            if let Some(entry) = state.entry(entry_id) {
                let remaining = entry
                    .origin_vehicles()
                    .iter()
                    .filter(|vid| **vid != vehicle_id)
                    .filter_map(|vid| state.vehicle(*vid))
                    .filter(|v| v.can_be_sold())
                    .count();

                if remaining == 0 && entry.is_available() {
                    let mut entry_agg = entry.clone();
                    let entry_events = execute(
                        &mut entry_agg,
                        &EntryCommand::MarkUnavailable(MarkUnavailable {
                            tenant_id: sale.tenant_id,
                            entry_id,
                            occurred_at: sale.occurred_at,
                        }),
                    )?;
                    events.extend(entry_events.into_iter().map(DealershipEvent::Catalog));
                    entry_marked_unavailable = true;
                }
            }
        }

        events.push(note(
            sale.tenant_id,
            vehicle_id,
            format!("Vehicle sold ({})", sale.sale_reference),
            sale.occurred_at,
        ));

        Ok(SaleApplied {
            vehicle_id,
            entry_marked_unavailable,
            events,
        })
    }

    /// Return a sold, consigned unit to its consignor.
    pub fn return_vehicle(
        &self,
        state: &ReconcileState,
        request: &ReturnRequest,
    ) -> DomainResult<Vec<DealershipEvent>> {
        let vehicle = state
            .vehicle(request.vehicle_id)
            .ok_or(DomainError::NotFound)?;

        let mut returned = vehicle.clone();
        let mut events = Vec::new();
        let vehicle_events = execute(
            &mut returned,
            &VehicleCommand::ReturnVehicle(ReturnVehicleCommand {
                tenant_id: request.tenant_id,
                vehicle_id: request.vehicle_id,
                occurred_at: request.occurred_at,
            }),
        )?;
        events.extend(vehicle_events.into_iter().map(DealershipEvent::Vehicle));

        events.push(note(
            request.tenant_id,
            request.vehicle_id,
            "Vehicle returned to consignor".to_string(),
            request.occurred_at,
        ));

        Ok(events)
    }

    /// Take a vehicle off the books.
    ///
    /// An entry owned by this vehicle alone is removed with it; a shared
    /// entry only loses the back-reference.
    pub fn delist_vehicle(
        &self,
        state: &ReconcileState,
        request: &DelistRequest,
    ) -> DomainResult<Delisted> {
        let vehicle = state
            .vehicle(request.vehicle_id)
            .ok_or(DomainError::NotFound)?;

        let mut events = Vec::new();
        let mut removed_entry = None;

        if let Some(entry_id) = vehicle.catalog_entry_id().map(CatalogEntryId::new) {
            if let Some(entry) = state.entry(entry_id) {
                let origins = entry.origin_vehicles();
                let exclusively_owned =
                    origins.len() == 1 && origins[0] == request.vehicle_id;
                if exclusively_owned {
                    removed_entry = Some(entry_id);
                } else {
                    let mut entry_agg = entry.clone();
                    let entry_events = execute(
                        &mut entry_agg,
                        &EntryCommand::DetachOrigin(DetachOrigin {
                            tenant_id: request.tenant_id,
                            entry_id,
                            vehicle_id: request.vehicle_id,
                            occurred_at: request.occurred_at,
                        }),
                    )?;
                    events.extend(entry_events.into_iter().map(DealershipEvent::Catalog));
                }
            }
        }

        events.push(DealershipEvent::VehicleDelisted(VehicleDelisted {
            tenant_id: request.tenant_id,
            vehicle_id: request.vehicle_id,
            catalog_entry_id: removed_entry,
            occurred_at: request.occurred_at,
        }));

        Ok(Delisted {
            removed_entry,
            events,
        })
    }
}

fn note(
    tenant_id: TenantId,
    vehicle_id: VehicleId,
    body: String,
    occurred_at: DateTime<Utc>,
) -> DealershipEvent {
    DealershipEvent::NotePosted(AuditNote {
        tenant_id,
        vehicle_id,
        body,
        occurred_at,
    })
}
