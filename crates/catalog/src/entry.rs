use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motorlot_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use motorlot_events::Event;
use motorlot_parties::PartyId;
use motorlot_vehicles::{BusinessType, CommissionTerms, VehicleId, VehicleSpec};

use crate::category::CategoryId;

/// Catalog entry identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntryId(pub AggregateId);

impl CatalogEntryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CatalogEntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: CatalogEntry.
///
/// The sellable representation of one vehicle or one model/year grouping.
/// Pricing and naming are pushed one-directionally from the vehicle; the
/// entry never writes back. Serial tracking means each physical unit is
/// distinguished by its own VIN at the inventory layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    id: CatalogEntryId,
    tenant_id: Option<TenantId>,
    name: String,
    description: Option<String>,
    /// Prices in minor currency units.
    list_price: u64,
    cost_price: u64,
    currency: String,
    serial_tracked: bool,
    category_id: Option<CategoryId>,
    business_type: BusinessType,
    /// Defaults copied onto units created from inbound receipts.
    default_commission: Option<CommissionTerms>,
    default_vendor: Option<PartyId>,
    /// Descriptive snapshot used to seed receipt-created vehicles.
    spec: Option<VehicleSpec>,
    /// Back-references to the originating vehicle(s).
    origin_vehicles: Vec<VehicleId>,
    available: bool,
    version: u64,
    created: bool,
}

impl CatalogEntry {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CatalogEntryId) -> Self {
        Self {
            id,
            tenant_id: None,
            name: String::new(),
            description: None,
            list_price: 0,
            cost_price: 0,
            currency: String::new(),
            serial_tracked: true,
            category_id: None,
            business_type: BusinessType::Owner,
            default_commission: None,
            default_vendor: None,
            spec: None,
            origin_vehicles: Vec::new(),
            available: true,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CatalogEntryId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn list_price(&self) -> u64 {
        self.list_price
    }

    pub fn cost_price(&self) -> u64 {
        self.cost_price
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_serial_tracked(&self) -> bool {
        self.serial_tracked
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn business_type(&self) -> BusinessType {
        self.business_type
    }

    pub fn default_commission(&self) -> Option<CommissionTerms> {
        self.default_commission
    }

    pub fn default_vendor(&self) -> Option<PartyId> {
        self.default_vendor
    }

    pub fn spec(&self) -> Option<&VehicleSpec> {
        self.spec.as_ref()
    }

    pub fn origin_vehicles(&self) -> &[VehicleId] {
        &self.origin_vehicles
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl AggregateRoot for CatalogEntry {
    type Id = CatalogEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateEntry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEntry {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub name: String,
    pub description: Option<String>,
    pub list_price: u64,
    pub cost_price: u64,
    pub currency: String,
    pub serial_tracked: bool,
    pub category_id: Option<CategoryId>,
    pub business_type: BusinessType,
    pub default_commission: Option<CommissionTerms>,
    pub default_vendor: Option<PartyId>,
    pub spec: Option<VehicleSpec>,
    pub origin_vehicle: Option<VehicleId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SyncEntry — one-directional vehicle → entry push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEntry {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub name: String,
    pub description: Option<String>,
    pub list_price: u64,
    pub cost_price: u64,
    pub category_id: Option<CategoryId>,
    pub business_type: BusinessType,
    pub default_commission: Option<CommissionTerms>,
    pub default_vendor: Option<PartyId>,
    pub spec: Option<VehicleSpec>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AttachOrigin — record another originating vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOrigin {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DetachOrigin — drop the back-reference to a delisted vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachOrigin {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkUnavailable — serial-tracked stock fully consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkUnavailable {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkAvailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkAvailable {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryCommand {
    CreateEntry(CreateEntry),
    SyncEntry(SyncEntry),
    AttachOrigin(AttachOrigin),
    DetachOrigin(DetachOrigin),
    MarkUnavailable(MarkUnavailable),
    MarkAvailable(MarkAvailable),
}

/// Event: EntryCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCreated {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub name: String,
    pub description: Option<String>,
    pub list_price: u64,
    pub cost_price: u64,
    pub currency: String,
    pub serial_tracked: bool,
    pub category_id: Option<CategoryId>,
    pub business_type: BusinessType,
    pub default_commission: Option<CommissionTerms>,
    pub default_vendor: Option<PartyId>,
    pub spec: Option<VehicleSpec>,
    pub origin_vehicle: Option<VehicleId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EntrySynced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySynced {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub name: String,
    pub description: Option<String>,
    pub list_price: u64,
    pub cost_price: u64,
    pub category_id: Option<CategoryId>,
    pub business_type: BusinessType,
    pub default_commission: Option<CommissionTerms>,
    pub default_vendor: Option<PartyId>,
    pub spec: Option<VehicleSpec>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OriginAttached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginAttached {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OriginDetached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginDetached {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EntryMarkedUnavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMarkedUnavailable {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EntryMarkedAvailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMarkedAvailable {
    pub tenant_id: TenantId,
    pub entry_id: CatalogEntryId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryEvent {
    EntryCreated(EntryCreated),
    EntrySynced(EntrySynced),
    OriginAttached(OriginAttached),
    OriginDetached(OriginDetached),
    EntryMarkedUnavailable(EntryMarkedUnavailable),
    EntryMarkedAvailable(EntryMarkedAvailable),
}

impl Event for EntryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EntryEvent::EntryCreated(_) => "catalog.entry.created",
            EntryEvent::EntrySynced(_) => "catalog.entry.synced",
            EntryEvent::OriginAttached(_) => "catalog.entry.origin_attached",
            EntryEvent::OriginDetached(_) => "catalog.entry.origin_detached",
            EntryEvent::EntryMarkedUnavailable(_) => "catalog.entry.marked_unavailable",
            EntryEvent::EntryMarkedAvailable(_) => "catalog.entry.marked_available",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EntryEvent::EntryCreated(e) => e.occurred_at,
            EntryEvent::EntrySynced(e) => e.occurred_at,
            EntryEvent::OriginAttached(e) => e.occurred_at,
            EntryEvent::OriginDetached(e) => e.occurred_at,
            EntryEvent::EntryMarkedUnavailable(e) => e.occurred_at,
            EntryEvent::EntryMarkedAvailable(e) => e.occurred_at,
        }
    }
}

impl Aggregate for CatalogEntry {
    type Command = EntryCommand;
    type Event = EntryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EntryEvent::EntryCreated(e) => {
                self.id = e.entry_id;
                self.tenant_id = Some(e.tenant_id);
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.list_price = e.list_price;
                self.cost_price = e.cost_price;
                self.currency = e.currency.clone();
                self.serial_tracked = e.serial_tracked;
                self.category_id = e.category_id;
                self.business_type = e.business_type;
                self.default_commission = e.default_commission;
                self.default_vendor = e.default_vendor;
                self.spec = e.spec.clone();
                self.origin_vehicles = e.origin_vehicle.into_iter().collect();
                self.available = true;
                self.created = true;
            }
            EntryEvent::EntrySynced(e) => {
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.list_price = e.list_price;
                self.cost_price = e.cost_price;
                self.category_id = e.category_id;
                self.business_type = e.business_type;
                self.default_commission = e.default_commission;
                self.default_vendor = e.default_vendor;
                self.spec = e.spec.clone();
            }
            EntryEvent::OriginAttached(e) => {
                if !self.origin_vehicles.contains(&e.vehicle_id) {
                    self.origin_vehicles.push(e.vehicle_id);
                }
            }
            EntryEvent::OriginDetached(e) => {
                self.origin_vehicles.retain(|v| *v != e.vehicle_id);
            }
            EntryEvent::EntryMarkedUnavailable(_) => {
                self.available = false;
            }
            EntryEvent::EntryMarkedAvailable(_) => {
                self.available = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EntryCommand::CreateEntry(cmd) => self.handle_create(cmd),
            EntryCommand::SyncEntry(cmd) => self.handle_sync(cmd),
            EntryCommand::AttachOrigin(cmd) => self.handle_attach(cmd),
            EntryCommand::DetachOrigin(cmd) => self.handle_detach(cmd),
            EntryCommand::MarkUnavailable(cmd) => self.handle_mark_unavailable(cmd),
            EntryCommand::MarkAvailable(cmd) => self.handle_mark_available(cmd),
        }
    }
}

impl CatalogEntry {
    fn ensure_exists(
        &self,
        tenant_id: TenantId,
        entry_id: CatalogEntryId,
    ) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != entry_id {
            return Err(DomainError::invariant("entry_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateEntry) -> Result<Vec<EntryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("catalog entry already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![EntryEvent::EntryCreated(EntryCreated {
            tenant_id: cmd.tenant_id,
            entry_id: cmd.entry_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            list_price: cmd.list_price,
            cost_price: cmd.cost_price,
            currency: cmd.currency.clone(),
            serial_tracked: cmd.serial_tracked,
            category_id: cmd.category_id,
            business_type: cmd.business_type,
            default_commission: cmd.default_commission,
            default_vendor: cmd.default_vendor,
            spec: cmd.spec.clone(),
            origin_vehicle: cmd.origin_vehicle,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sync(&self, cmd: &SyncEntry) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.entry_id)?;

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![EntryEvent::EntrySynced(EntrySynced {
            tenant_id: cmd.tenant_id,
            entry_id: cmd.entry_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            list_price: cmd.list_price,
            cost_price: cmd.cost_price,
            category_id: cmd.category_id,
            business_type: cmd.business_type,
            default_commission: cmd.default_commission,
            default_vendor: cmd.default_vendor,
            spec: cmd.spec.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_attach(&self, cmd: &AttachOrigin) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.entry_id)?;

        if self.origin_vehicles.contains(&cmd.vehicle_id) {
            return Err(DomainError::conflict("vehicle is already an origin"));
        }

        Ok(vec![EntryEvent::OriginAttached(OriginAttached {
            tenant_id: cmd.tenant_id,
            entry_id: cmd.entry_id,
            vehicle_id: cmd.vehicle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_detach(&self, cmd: &DetachOrigin) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.entry_id)?;

        if !self.origin_vehicles.contains(&cmd.vehicle_id) {
            return Err(DomainError::not_found());
        }

        Ok(vec![EntryEvent::OriginDetached(OriginDetached {
            tenant_id: cmd.tenant_id,
            entry_id: cmd.entry_id,
            vehicle_id: cmd.vehicle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_unavailable(
        &self,
        cmd: &MarkUnavailable,
    ) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.entry_id)?;

        if !self.available {
            return Err(DomainError::conflict("entry is already unavailable"));
        }

        Ok(vec![EntryEvent::EntryMarkedUnavailable(
            EntryMarkedUnavailable {
                tenant_id: cmd.tenant_id,
                entry_id: cmd.entry_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_mark_available(&self, cmd: &MarkAvailable) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.entry_id)?;

        if self.available {
            return Err(DomainError::conflict("entry is already available"));
        }

        Ok(vec![EntryEvent::EntryMarkedAvailable(EntryMarkedAvailable {
            tenant_id: cmd.tenant_id,
            entry_id: cmd.entry_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
