//! The policy's view of the host stores.
//!
//! `ReconcileState` mirrors the vehicle store, the catalog store, the VIN
//! index, and the audit trail. It is rebuilt by replaying
//! [`DealershipEvent`]s, so it doubles as a projection for consistency
//! checking against a live system.

use std::collections::HashMap;

use motorlot_catalog::{CatalogEntry, CatalogEntryId, EntryEvent};
use motorlot_core::Aggregate;
use motorlot_events::{EventEnvelope, Projection};
use motorlot_vehicles::{Vehicle, VehicleEvent, VehicleId, VehicleState};

use crate::event::{AuditNote, DealershipEvent};

/// Target aggregate of a vehicle event.
fn vehicle_event_target(event: &VehicleEvent) -> VehicleId {
    match event {
        VehicleEvent::VehicleRegistered(e) => e.vehicle_id,
        VehicleEvent::VehicleEdited(e) => e.vehicle_id,
        VehicleEvent::VehicleMadeAvailable(e) => e.vehicle_id,
        VehicleEvent::VehicleReserved(e) => e.vehicle_id,
        VehicleEvent::VehicleReleased(e) => e.vehicle_id,
        VehicleEvent::VehicleSold(e) => e.vehicle_id,
        VehicleEvent::VehicleReturned(e) => e.vehicle_id,
        VehicleEvent::CatalogEntryLinked(e) => e.vehicle_id,
    }
}

/// Target aggregate of a catalog event.
fn entry_event_target(event: &EntryEvent) -> CatalogEntryId {
    match event {
        EntryEvent::EntryCreated(e) => e.entry_id,
        EntryEvent::EntrySynced(e) => e.entry_id,
        EntryEvent::OriginAttached(e) => e.entry_id,
        EntryEvent::OriginDetached(e) => e.entry_id,
        EntryEvent::EntryMarkedUnavailable(e) => e.entry_id,
        EntryEvent::EntryMarkedAvailable(e) => e.entry_id,
    }
}

/// In-memory mirror of the records the policy reconciles.
#[derive(Debug, Default)]
pub struct ReconcileState {
    vehicles: HashMap<VehicleId, Vehicle>,
    entries: HashMap<CatalogEntryId, CatalogEntry>,
    /// VIN → vehicle. Exact, case-sensitive keys.
    vin_index: HashMap<String, VehicleId>,
    notes: Vec<AuditNote>,
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn entry(&self, id: CatalogEntryId) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn vehicle_by_serial(&self, serial: &str) -> Option<&Vehicle> {
        self.vin_index
            .get(serial)
            .and_then(|id| self.vehicles.get(id))
    }

    /// The catalog entry a vehicle is linked to, if any.
    pub fn entry_for_vehicle(&self, id: VehicleId) -> Option<&CatalogEntry> {
        let vehicle = self.vehicles.get(&id)?;
        let entry_id = CatalogEntryId::new(vehicle.catalog_entry_id()?);
        self.entries.get(&entry_id)
    }

    /// Serials on this entry still available or reserved for sale.
    pub fn available_serial_count(&self, entry_id: CatalogEntryId) -> usize {
        let Some(entry) = self.entries.get(&entry_id) else {
            return 0;
        };
        entry
            .origin_vehicles()
            .iter()
            .filter_map(|vid| self.vehicles.get(vid))
            .filter(|v| {
                matches!(
                    v.state(),
                    VehicleState::Available | VehicleState::Reserved
                )
            })
            .count()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn notes(&self) -> &[AuditNote] {
        &self.notes
    }

    pub fn notes_for(&self, vehicle_id: VehicleId) -> impl Iterator<Item = &AuditNote> {
        self.notes.iter().filter(move |n| n.vehicle_id == vehicle_id)
    }

    /// Fold one reconciliation event into the mirrored stores.
    pub fn apply_event(&mut self, event: &DealershipEvent) {
        match event {
            DealershipEvent::Vehicle(ev) => {
                let id = vehicle_event_target(ev);
                let vehicle = self
                    .vehicles
                    .entry(id)
                    .or_insert_with(|| Vehicle::empty(id));
                let old_vin = vehicle.vin().map(|v| v.as_str().to_string());
                vehicle.apply(ev);
                let new_vin = vehicle.vin().map(|v| v.as_str().to_string());

                if old_vin != new_vin {
                    if let Some(old) = old_vin {
                        self.vin_index.remove(&old);
                    }
                    if let Some(new) = new_vin {
                        self.vin_index.insert(new, id);
                    }
                }
            }
            DealershipEvent::Catalog(ev) => {
                let id = entry_event_target(ev);
                let entry = self
                    .entries
                    .entry(id)
                    .or_insert_with(|| CatalogEntry::empty(id));
                entry.apply(ev);
            }
            DealershipEvent::NotePosted(note) => {
                self.notes.push(note.clone());
            }
            DealershipEvent::VehicleDelisted(d) => {
                if let Some(vehicle) = self.vehicles.remove(&d.vehicle_id) {
                    if let Some(vin) = vehicle.vin() {
                        self.vin_index.remove(vin.as_str());
                    }
                }
                if let Some(entry_id) = d.catalog_entry_id {
                    self.entries.remove(&entry_id);
                }
            }
        }
    }

    /// Fold a whole reconciliation, in order.
    pub fn apply_all(&mut self, events: &[DealershipEvent]) {
        for event in events {
            self.apply_event(event);
        }
    }
}

impl Projection for ReconcileState {
    type Ev = DealershipEvent;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) {
        self.apply_event(envelope.payload());
    }
}
