use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motorlot_catalog::{CatalogEntryId, EntryEvent};
use motorlot_core::TenantId;
use motorlot_events::Event;
use motorlot_vehicles::{VehicleEvent, VehicleId};

/// Audit note attached to a vehicle record (the host platform's chatter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub body: String,
    pub occurred_at: DateTime<Utc>,
}

/// A vehicle leaving the books, cascading to its exclusively-owned entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDelisted {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    /// Set when the entry was owned by this vehicle alone and goes with it.
    pub catalog_entry_id: Option<CatalogEntryId>,
    pub occurred_at: DateTime<Utc>,
}

/// Union of everything a reconciliation can emit.
///
/// The policy decides; the caller applies these to the vehicle store, the
/// catalog store, and the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DealershipEvent {
    Vehicle(VehicleEvent),
    Catalog(EntryEvent),
    NotePosted(AuditNote),
    VehicleDelisted(VehicleDelisted),
}

impl Event for DealershipEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DealershipEvent::Vehicle(e) => e.event_type(),
            DealershipEvent::Catalog(e) => e.event_type(),
            DealershipEvent::NotePosted(_) => "dealership.note.posted",
            DealershipEvent::VehicleDelisted(_) => "dealership.vehicle.delisted",
        }
    }

    fn version(&self) -> u32 {
        match self {
            DealershipEvent::Vehicle(e) => e.version(),
            DealershipEvent::Catalog(e) => e.version(),
            DealershipEvent::NotePosted(_) | DealershipEvent::VehicleDelisted(_) => 1,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DealershipEvent::Vehicle(e) => e.occurred_at(),
            DealershipEvent::Catalog(e) => e.occurred_at(),
            DealershipEvent::NotePosted(n) => n.occurred_at,
            DealershipEvent::VehicleDelisted(d) => d.occurred_at,
        }
    }
}
