use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motorlot_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, TenantId, ValueObject,
};
use motorlot_events::Event;
use motorlot_parties::PartyId;

/// Vehicle identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub AggregateId);

impl VehicleId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Vehicle identification number (chassis serial).
///
/// Compared exactly, case-sensitive. This is the unique key for one
/// physical unit; it doubles as the stock serial/lot number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("VIN cannot be empty"));
        }
        if value.len() > 17 {
            return Err(DomainError::validation("VIN cannot exceed 17 characters"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Vin {}

impl core::fmt::Display for Vin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle lifecycle.
///
/// draft → available → (reserved ⇄ available) → sold → returned,
/// where `returned` is reserved for consigned stock going back to its
/// consignor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleState {
    Draft,
    Available,
    Reserved,
    Sold,
    Returned,
}

impl VehicleState {
    pub fn label(self) -> &'static str {
        match self {
            VehicleState::Draft => "draft",
            VehicleState::Available => "available",
            VehicleState::Reserved => "reserved",
            VehicleState::Sold => "sold",
            VehicleState::Returned => "returned",
        }
    }
}

/// Business classification: whose vehicle the dealership is selling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Owner,
    DealerNetwork,
    Consigned,
}

impl BusinessType {
    pub fn is_owner(self) -> bool {
        matches!(self, BusinessType::Owner)
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessType::Owner => "owner",
            BusinessType::DealerNetwork => "dealer network",
            BusinessType::Consigned => "consigned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    ForeignUsed,
    LocalUsed,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::New => "brand new",
            Condition::ForeignUsed => "foreign used",
            Condition::LocalUsed => "local used",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
    Cvt,
    Amt,
}

impl Transmission {
    pub fn label(self) -> &'static str {
        match self {
            Transmission::Manual => "manual",
            Transmission::Automatic => "automatic",
            Transmission::Cvt => "CVT",
            Transmission::Amt => "AMT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
    Cng,
    Other,
}

impl FuelType {
    pub fn label(self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
            FuelType::Cng => "CNG",
            FuelType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Interior,
    Exterior,
    Safety,
    Technology,
    Performance,
}

/// A named option/feature fitted to a vehicle (e.g. "Sunroof", exterior).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub category: FeatureCategory,
}

impl ValueObject for Feature {}

/// Commission basis for non-owner stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionKind {
    Percentage,
    Fixed,
}

/// Commission terms for dealer-network and consigned stock.
///
/// `value` is basis points for `Percentage` (500 = 5%) and minor currency
/// units for `Fixed`. Percentage amounts use integer division over minor
/// units, truncating toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTerms {
    pub kind: CommissionKind,
    pub value: u64,
}

impl CommissionTerms {
    /// Percentage commission, in basis points.
    pub fn percentage_bp(bp: u64) -> Self {
        Self {
            kind: CommissionKind::Percentage,
            value: bp,
        }
    }

    /// Fixed commission, in minor currency units.
    pub fn fixed(amount: u64) -> Self {
        Self {
            kind: CommissionKind::Fixed,
            value: amount,
        }
    }

    /// Commission amount owed on a given purchase cost (minor units).
    pub fn amount_for(&self, purchase_cost: u64) -> u64 {
        match self.kind {
            CommissionKind::Percentage => purchase_cost * self.value / 10_000,
            CommissionKind::Fixed => self.value,
        }
    }
}

impl ValueObject for CommissionTerms {}

/// Business classification with its dependent fields, changed as a unit.
///
/// Non-owner classifications require a vendor/consignor and fully specified
/// commission terms; `owner` requires neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub business_type: BusinessType,
    pub vendor_id: Option<PartyId>,
    pub commission: Option<CommissionTerms>,
}

impl Classification {
    pub fn owner() -> Self {
        Self {
            business_type: BusinessType::Owner,
            vendor_id: None,
            commission: None,
        }
    }

    pub fn dealer_network(vendor_id: PartyId, commission: CommissionTerms) -> Self {
        Self {
            business_type: BusinessType::DealerNetwork,
            vendor_id: Some(vendor_id),
            commission: Some(commission),
        }
    }

    pub fn consigned(vendor_id: PartyId, commission: CommissionTerms) -> Self {
        Self {
            business_type: BusinessType::Consigned,
            vendor_id: Some(vendor_id),
            commission: Some(commission),
        }
    }

    /// Checked before persisting any write touching classification, vendor,
    /// or commission fields.
    pub fn ensure_complete(&self) -> DomainResult<()> {
        if self.business_type.is_owner() {
            return Ok(());
        }
        if self.vendor_id.is_none() {
            return Err(DomainError::incomplete_classification(format!(
                "vendor/consignor is required for {} stock",
                self.business_type.label()
            )));
        }
        match self.commission {
            None => Err(DomainError::incomplete_classification(format!(
                "commission type and value are required for {} stock",
                self.business_type.label()
            ))),
            Some(terms) if terms.value == 0 => Err(DomainError::incomplete_classification(
                format!(
                    "commission value must be non-zero for {} stock",
                    self.business_type.label()
                ),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Descriptive attributes of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub make: String,
    pub model: String,
    pub year: Option<u16>,
    pub color: Option<String>,
    pub trim: Option<String>,
    pub engine_size: Option<String>,
    pub mileage_km: Option<u32>,
    pub condition: Option<Condition>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    pub features: Vec<Feature>,
}

impl VehicleSpec {
    pub fn basic(make: impl Into<String>, model: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            color: None,
            trim: None,
            engine_size: None,
            mileage_km: None,
            condition: None,
            transmission: None,
            fuel_type: None,
            features: Vec::new(),
        }
    }

    /// Display name synthesis: year, make, model, color, trim — in that
    /// order, skipping empty fields. The order is load-bearing: downstream
    /// catalog names and tests rely on it.
    pub fn display_name(&self) -> String {
        let year = self.year.map(|y| y.to_string());
        let mut parts: Vec<&str> = Vec::new();
        if let Some(y) = year.as_deref() {
            parts.push(y);
        }
        if !self.make.is_empty() {
            parts.push(&self.make);
        }
        if !self.model.is_empty() {
            parts.push(&self.model);
        }
        if let Some(c) = self.color.as_deref().filter(|c| !c.is_empty()) {
            parts.push(c);
        }
        if let Some(t) = self.trim.as_deref().filter(|t| !t.is_empty()) {
            parts.push(t);
        }
        parts.join(" ")
    }

    /// Multi-line sales description for the catalog entry.
    pub fn description(&self) -> String {
        let mut details: Vec<String> = Vec::new();
        if let Some(m) = self.mileage_km {
            details.push(format!("Mileage: {m} km"));
        }
        if let Some(f) = self.fuel_type {
            details.push(format!("Fuel: {}", f.label()));
        }
        if let Some(t) = self.transmission {
            details.push(format!("Transmission: {}", t.label()));
        }
        if let Some(e) = self.engine_size.as_deref().filter(|e| !e.is_empty()) {
            details.push(format!("Engine: {e}"));
        }
        if let Some(c) = self.condition {
            details.push(format!("Condition: {}", c.label()));
        }

        let mut sections = vec![self.display_name()];
        if !details.is_empty() {
            sections.push(details.join(" | "));
        }
        if !self.features.is_empty() {
            let names: Vec<&str> = self.features.iter().map(|f| f.name.as_str()).collect();
            sections.push(format!("Features: {}", names.join(", ")));
        }
        sections.join("\n")
    }

    fn validate(&self) -> DomainResult<()> {
        if self.make.trim().is_empty() {
            return Err(DomainError::validation("make cannot be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::validation("model cannot be empty"));
        }
        if let Some(year) = self.year {
            if !(1900..=2100).contains(&year) {
                return Err(DomainError::validation("year out of range"));
            }
        }
        Ok(())
    }
}

/// Vehicle pricing in minor currency units (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePricing {
    pub purchase_cost: u64,
    pub selling_price: u64,
    /// ISO currency code (e.g. "USD", "EUR").
    pub currency: String,
}

impl VehiclePricing {
    pub fn new(purchase_cost: u64, selling_price: u64, currency: impl Into<String>) -> Self {
        Self {
            purchase_cost,
            selling_price,
            currency: currency.into(),
        }
    }
}

/// Aggregate root: Vehicle.
///
/// One consolidated schema; commission, net payable, and profit are derived
/// figures, computed on read and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: VehicleId,
    tenant_id: Option<TenantId>,
    vin: Option<Vin>,
    spec: VehicleSpec,
    pricing: VehiclePricing,
    classification: Classification,
    state: VehicleState,
    /// Aggregate id of the linked catalog entry, set by the reconciliation
    /// policy (at most one per vehicle).
    catalog_entry_id: Option<AggregateId>,
    sale_reference: Option<String>,
    version: u64,
    created: bool,
}

impl Vehicle {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: VehicleId) -> Self {
        Self {
            id,
            tenant_id: None,
            vin: None,
            spec: VehicleSpec::basic("", "", None),
            pricing: VehiclePricing::new(0, 0, ""),
            classification: Classification::owner(),
            state: VehicleState::Draft,
            catalog_entry_id: None,
            sale_reference: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> VehicleId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn vin(&self) -> Option<&Vin> {
        self.vin.as_ref()
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn pricing(&self) -> &VehiclePricing {
        &self.pricing
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn business_type(&self) -> BusinessType {
        self.classification.business_type
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn catalog_entry_id(&self) -> Option<AggregateId> {
        self.catalog_entry_id
    }

    pub fn sale_reference(&self) -> Option<&str> {
        self.sale_reference.as_deref()
    }

    pub fn display_name(&self) -> String {
        self.spec.display_name()
    }

    /// Whether this unit can be put on a sale order.
    pub fn can_be_sold(&self) -> bool {
        matches!(self.state, VehicleState::Available | VehicleState::Reserved)
    }

    /// Commission owed to the vendor/consignor (minor units).
    ///
    /// Zero for owner stock and for vehicles without commission terms.
    pub fn commission_amount(&self) -> u64 {
        if self.classification.business_type.is_owner() {
            return 0;
        }
        self.classification
            .commission
            .map(|terms| terms.amount_for(self.pricing.purchase_cost))
            .unwrap_or(0)
    }

    /// Purchase cost minus commission for non-owner stock; purchase cost
    /// otherwise.
    pub fn net_payable(&self) -> u64 {
        let cost = self.pricing.purchase_cost;
        if self.classification.business_type.is_owner() {
            cost
        } else {
            cost.saturating_sub(self.commission_amount())
        }
    }

    /// Selling price minus net payable (minor units; may be negative).
    pub fn profit_amount(&self) -> i64 {
        self.pricing.selling_price as i64 - self.net_payable() as i64
    }

    /// Profit relative to purchase cost, in percent. Zero when the purchase
    /// cost is zero.
    pub fn profit_percentage(&self) -> f64 {
        let cost = self.pricing.purchase_cost;
        if cost == 0 {
            return 0.0;
        }
        self.profit_amount() as f64 / cost as f64 * 100.0
    }
}

impl AggregateRoot for Vehicle {
    type Id = VehicleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterVehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterVehicle {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub spec: VehicleSpec,
    pub pricing: VehiclePricing,
    pub classification: Classification,
    /// Pre-existing catalog entry to link, if any. When absent the
    /// reconciliation policy synthesizes one.
    pub catalog_entry_id: Option<AggregateId>,
    pub occurred_at: DateTime<Utc>,
}

/// Partial attribute set for an edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleEdit {
    pub vin: Option<Vin>,
    pub spec: Option<VehicleSpec>,
    pub pricing: Option<VehiclePricing>,
    pub classification: Option<Classification>,
}

impl VehicleEdit {
    pub fn is_empty(&self) -> bool {
        self.vin.is_none()
            && self.spec.is_none()
            && self.pricing.is_none()
            && self.classification.is_none()
    }
}

/// Command: EditVehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditVehicle {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub changes: VehicleEdit,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MakeAvailable (draft → available).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeAvailable {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReserveVehicle (available → reserved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveVehicle {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReleaseVehicle (reserved → available).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVehicle {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkSold (available/reserved → sold).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSold {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub sale_reference: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReturnVehicle (sold → returned, consigned stock only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnVehicle {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkCatalogEntry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCatalogEntry {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub catalog_entry_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VehicleCommand {
    RegisterVehicle(RegisterVehicle),
    EditVehicle(EditVehicle),
    MakeAvailable(MakeAvailable),
    ReserveVehicle(ReserveVehicle),
    ReleaseVehicle(ReleaseVehicle),
    MarkSold(MarkSold),
    ReturnVehicle(ReturnVehicle),
    LinkCatalogEntry(LinkCatalogEntry),
}

/// Event: VehicleRegistered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRegistered {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub spec: VehicleSpec,
    pub pricing: VehiclePricing,
    pub classification: Classification,
    pub catalog_entry_id: Option<AggregateId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleEdited. Carries the fully resolved new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEdited {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub spec: VehicleSpec,
    pub pricing: VehiclePricing,
    pub classification: Classification,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleMadeAvailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleMadeAvailable {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleReserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReserved {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleReleased (reservation lifted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReleased {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSold {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub sale_reference: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleReturned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReturned {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CatalogEntryLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryLinked {
    pub tenant_id: TenantId,
    pub vehicle_id: VehicleId,
    pub catalog_entry_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VehicleEvent {
    VehicleRegistered(VehicleRegistered),
    VehicleEdited(VehicleEdited),
    VehicleMadeAvailable(VehicleMadeAvailable),
    VehicleReserved(VehicleReserved),
    VehicleReleased(VehicleReleased),
    VehicleSold(VehicleSold),
    VehicleReturned(VehicleReturned),
    CatalogEntryLinked(CatalogEntryLinked),
}

impl Event for VehicleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VehicleEvent::VehicleRegistered(_) => "vehicles.vehicle.registered",
            VehicleEvent::VehicleEdited(_) => "vehicles.vehicle.edited",
            VehicleEvent::VehicleMadeAvailable(_) => "vehicles.vehicle.made_available",
            VehicleEvent::VehicleReserved(_) => "vehicles.vehicle.reserved",
            VehicleEvent::VehicleReleased(_) => "vehicles.vehicle.released",
            VehicleEvent::VehicleSold(_) => "vehicles.vehicle.sold",
            VehicleEvent::VehicleReturned(_) => "vehicles.vehicle.returned",
            VehicleEvent::CatalogEntryLinked(_) => "vehicles.vehicle.catalog_linked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VehicleEvent::VehicleRegistered(e) => e.occurred_at,
            VehicleEvent::VehicleEdited(e) => e.occurred_at,
            VehicleEvent::VehicleMadeAvailable(e) => e.occurred_at,
            VehicleEvent::VehicleReserved(e) => e.occurred_at,
            VehicleEvent::VehicleReleased(e) => e.occurred_at,
            VehicleEvent::VehicleSold(e) => e.occurred_at,
            VehicleEvent::VehicleReturned(e) => e.occurred_at,
            VehicleEvent::CatalogEntryLinked(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Vehicle {
    type Command = VehicleCommand;
    type Event = VehicleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            VehicleEvent::VehicleRegistered(e) => {
                self.id = e.vehicle_id;
                self.tenant_id = Some(e.tenant_id);
                self.vin = e.vin.clone();
                self.spec = e.spec.clone();
                self.pricing = e.pricing.clone();
                self.classification = e.classification.clone();
                self.state = VehicleState::Draft;
                self.catalog_entry_id = e.catalog_entry_id;
                self.sale_reference = None;
                self.created = true;
            }
            VehicleEvent::VehicleEdited(e) => {
                self.vin = e.vin.clone();
                self.spec = e.spec.clone();
                self.pricing = e.pricing.clone();
                self.classification = e.classification.clone();
            }
            VehicleEvent::VehicleMadeAvailable(_) => {
                self.state = VehicleState::Available;
            }
            VehicleEvent::VehicleReserved(_) => {
                self.state = VehicleState::Reserved;
            }
            VehicleEvent::VehicleReleased(_) => {
                self.state = VehicleState::Available;
            }
            VehicleEvent::VehicleSold(e) => {
                self.state = VehicleState::Sold;
                self.sale_reference = Some(e.sale_reference.clone());
            }
            VehicleEvent::VehicleReturned(_) => {
                self.state = VehicleState::Returned;
            }
            VehicleEvent::CatalogEntryLinked(e) => {
                self.catalog_entry_id = Some(e.catalog_entry_id);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            VehicleCommand::RegisterVehicle(cmd) => self.handle_register(cmd),
            VehicleCommand::EditVehicle(cmd) => self.handle_edit(cmd),
            VehicleCommand::MakeAvailable(cmd) => self.handle_make_available(cmd),
            VehicleCommand::ReserveVehicle(cmd) => self.handle_reserve(cmd),
            VehicleCommand::ReleaseVehicle(cmd) => self.handle_release(cmd),
            VehicleCommand::MarkSold(cmd) => self.handle_mark_sold(cmd),
            VehicleCommand::ReturnVehicle(cmd) => self.handle_return(cmd),
            VehicleCommand::LinkCatalogEntry(cmd) => self.handle_link(cmd),
        }
    }
}

impl Vehicle {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_vehicle_id(&self, vehicle_id: VehicleId) -> Result<(), DomainError> {
        if self.id != vehicle_id {
            return Err(DomainError::invariant("vehicle_id mismatch"));
        }
        Ok(())
    }

    fn ensure_exists(&self, tenant_id: TenantId, vehicle_id: VehicleId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_vehicle_id(vehicle_id)
    }

    fn handle_register(&self, cmd: &RegisterVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("vehicle already exists"));
        }

        cmd.spec.validate()?;
        cmd.classification.ensure_complete()?;

        // VIN uniqueness across vehicles is a cross-aggregate invariant; the
        // reconciliation policy checks it against the VIN index before this
        // command is dispatched.

        Ok(vec![VehicleEvent::VehicleRegistered(VehicleRegistered {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            vin: cmd.vin.clone(),
            spec: cmd.spec.clone(),
            pricing: cmd.pricing.clone(),
            classification: cmd.classification.clone(),
            catalog_entry_id: cmd.catalog_entry_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if cmd.changes.is_empty() {
            return Err(DomainError::validation("edit contains no changes"));
        }

        let vin = cmd.changes.vin.clone().or_else(|| self.vin.clone());
        let spec = cmd.changes.spec.clone().unwrap_or_else(|| self.spec.clone());
        let pricing = cmd
            .changes
            .pricing
            .clone()
            .unwrap_or_else(|| self.pricing.clone());
        let classification = cmd
            .changes
            .classification
            .clone()
            .unwrap_or_else(|| self.classification.clone());

        spec.validate()?;
        classification.ensure_complete()?;

        Ok(vec![VehicleEvent::VehicleEdited(VehicleEdited {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            vin,
            spec,
            pricing,
            classification,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_make_available(
        &self,
        cmd: &MakeAvailable,
    ) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if self.state != VehicleState::Draft {
            return Err(DomainError::invalid_transition(format!(
                "cannot make a {} vehicle available",
                self.state.label()
            )));
        }

        Ok(vec![VehicleEvent::VehicleMadeAvailable(
            VehicleMadeAvailable {
                tenant_id: cmd.tenant_id,
                vehicle_id: cmd.vehicle_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_reserve(&self, cmd: &ReserveVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if self.state != VehicleState::Available {
            return Err(DomainError::invalid_transition(format!(
                "cannot reserve a {} vehicle",
                self.state.label()
            )));
        }

        Ok(vec![VehicleEvent::VehicleReserved(VehicleReserved {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_release(&self, cmd: &ReleaseVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if self.state != VehicleState::Reserved {
            return Err(DomainError::invalid_transition(format!(
                "cannot release a {} vehicle",
                self.state.label()
            )));
        }

        Ok(vec![VehicleEvent::VehicleReleased(VehicleReleased {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_sold(&self, cmd: &MarkSold) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if cmd.sale_reference.trim().is_empty() {
            return Err(DomainError::validation("sale reference cannot be empty"));
        }

        if !self.can_be_sold() {
            return Err(DomainError::invalid_transition(format!(
                "cannot sell a {} vehicle",
                self.state.label()
            )));
        }

        Ok(vec![VehicleEvent::VehicleSold(VehicleSold {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            sale_reference: cmd.sale_reference.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_return(&self, cmd: &ReturnVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if self.classification.business_type != BusinessType::Consigned {
            return Err(DomainError::invalid_transition(
                "only consigned vehicles can be returned",
            ));
        }

        if self.state != VehicleState::Sold {
            return Err(DomainError::invalid_transition(format!(
                "cannot return a {} vehicle",
                self.state.label()
            )));
        }

        Ok(vec![VehicleEvent::VehicleReturned(VehicleReturned {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_link(&self, cmd: &LinkCatalogEntry) -> Result<Vec<VehicleEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.vehicle_id)?;

        if let Some(existing) = self.catalog_entry_id {
            if existing != cmd.catalog_entry_id {
                return Err(DomainError::conflict(
                    "vehicle is already linked to a catalog entry",
                ));
            }
        }

        Ok(vec![VehicleEvent::CatalogEntryLinked(CatalogEntryLinked {
            tenant_id: cmd.tenant_id,
            vehicle_id: cmd.vehicle_id,
            catalog_entry_id: cmd.catalog_entry_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorlot_core::AggregateId;
    use motorlot_events::execute;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_vehicle_id() -> VehicleId {
        VehicleId::new(AggregateId::new())
    }

    fn test_vendor() -> PartyId {
        PartyId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn corolla_spec() -> VehicleSpec {
        VehicleSpec::basic("Toyota", "Corolla", Some(2024))
    }

    fn register_cmd(
        tenant_id: TenantId,
        vehicle_id: VehicleId,
        classification: Classification,
    ) -> RegisterVehicle {
        RegisterVehicle {
            tenant_id,
            vehicle_id,
            vin: Some(Vin::new("1HG123").unwrap()),
            spec: corolla_spec(),
            pricing: VehiclePricing::new(1_500_000, 1_800_000, "USD"),
            classification,
            catalog_entry_id: None,
            occurred_at: test_time(),
        }
    }

    fn registered(classification: Classification) -> (Vehicle, TenantId, VehicleId) {
        let tenant_id = test_tenant_id();
        let vehicle_id = test_vehicle_id();
        let mut vehicle = Vehicle::empty(vehicle_id);
        execute(
            &mut vehicle,
            &VehicleCommand::RegisterVehicle(register_cmd(tenant_id, vehicle_id, classification)),
        )
        .unwrap();
        (vehicle, tenant_id, vehicle_id)
    }

    fn available(classification: Classification) -> (Vehicle, TenantId, VehicleId) {
        let (mut vehicle, tenant_id, vehicle_id) = registered(classification);
        execute(
            &mut vehicle,
            &VehicleCommand::MakeAvailable(MakeAvailable {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        (vehicle, tenant_id, vehicle_id)
    }

    #[test]
    fn display_name_joins_year_make_model_color_trim_in_order() {
        let mut spec = corolla_spec();
        spec.color = Some("White".to_string());
        spec.trim = Some("XLE".to_string());
        assert_eq!(spec.display_name(), "2024 Toyota Corolla White XLE");
    }

    #[test]
    fn display_name_skips_empty_fields() {
        let spec = corolla_spec();
        assert_eq!(spec.display_name(), "2024 Toyota Corolla");

        let mut no_year = spec.clone();
        no_year.year = None;
        no_year.color = Some(String::new());
        assert_eq!(no_year.display_name(), "Toyota Corolla");
    }

    #[test]
    fn register_vehicle_emits_registered_event_in_draft() {
        let (vehicle, _, _) = registered(Classification::owner());
        assert_eq!(vehicle.state(), VehicleState::Draft);
        assert_eq!(vehicle.vin().unwrap().as_str(), "1HG123");
        assert!(!vehicle.can_be_sold());
    }

    #[test]
    fn register_vehicle_rejects_missing_vendor_for_dealer_network() {
        let vehicle = Vehicle::empty(test_vehicle_id());
        let mut cmd = register_cmd(
            test_tenant_id(),
            test_vehicle_id(),
            Classification::dealer_network(test_vendor(), CommissionTerms::percentage_bp(1_000)),
        );
        cmd.classification.vendor_id = None;

        let err = vehicle
            .handle(&VehicleCommand::RegisterVehicle(cmd))
            .unwrap_err();
        match err {
            DomainError::IncompleteClassification(_) => {}
            _ => panic!("Expected IncompleteClassification error"),
        }
    }

    #[test]
    fn register_vehicle_rejects_missing_commission_for_consigned() {
        let vehicle = Vehicle::empty(test_vehicle_id());
        let mut cmd = register_cmd(
            test_tenant_id(),
            test_vehicle_id(),
            Classification::consigned(test_vendor(), CommissionTerms::percentage_bp(1_000)),
        );
        cmd.classification.commission = None;

        let err = vehicle
            .handle(&VehicleCommand::RegisterVehicle(cmd))
            .unwrap_err();
        match err {
            DomainError::IncompleteClassification(_) => {}
            _ => panic!("Expected IncompleteClassification error"),
        }
    }

    #[test]
    fn register_vehicle_accepts_complete_dealer_network_classification() {
        let (vehicle, _, _) = registered(Classification::dealer_network(
            test_vendor(),
            CommissionTerms::percentage_bp(1_000),
        ));
        assert_eq!(vehicle.business_type(), BusinessType::DealerNetwork);
    }

    #[test]
    fn commission_math_percentage() {
        // 5% of 10_000.00 => 500.00
        let (mut vehicle, tenant_id, vehicle_id) = registered(Classification::dealer_network(
            test_vendor(),
            CommissionTerms::percentage_bp(500),
        ));
        execute(
            &mut vehicle,
            &VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit {
                    pricing: Some(VehiclePricing::new(1_000_000, 1_200_000, "USD")),
                    ..VehicleEdit::default()
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(vehicle.commission_amount(), 50_000);
        assert_eq!(vehicle.net_payable(), 950_000);
    }

    #[test]
    fn commission_math_fixed() {
        let (vehicle, _, _) = registered(Classification::consigned(
            test_vendor(),
            CommissionTerms::fixed(75_000),
        ));
        assert_eq!(vehicle.commission_amount(), 75_000);
        assert_eq!(vehicle.net_payable(), 1_500_000 - 75_000);
    }

    #[test]
    fn owner_stock_has_no_commission() {
        let (vehicle, _, _) = registered(Classification::owner());
        assert_eq!(vehicle.commission_amount(), 0);
        assert_eq!(vehicle.net_payable(), 1_500_000);
    }

    #[test]
    fn profit_math_uses_net_payable_and_purchase_cost() {
        // selling 12_000.00, cost 10_000.00, 5% commission => net 9_500.00,
        // profit 2_500.00, 25% of cost.
        let (mut vehicle, tenant_id, vehicle_id) = registered(Classification::dealer_network(
            test_vendor(),
            CommissionTerms::percentage_bp(500),
        ));
        execute(
            &mut vehicle,
            &VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit {
                    pricing: Some(VehiclePricing::new(1_000_000, 1_200_000, "USD")),
                    ..VehicleEdit::default()
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(vehicle.profit_amount(), 250_000);
        assert!((vehicle.profit_percentage() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profit_percentage_is_zero_when_cost_is_zero() {
        let (mut vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        execute(
            &mut vehicle,
            &VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit {
                    pricing: Some(VehiclePricing::new(0, 1_200_000, "USD")),
                    ..VehicleEdit::default()
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(vehicle.profit_percentage(), 0.0);
    }

    #[test]
    fn owner_scenario_profit_figures() {
        // Register {purchase 15000.00, selling 18000.00, owner}:
        // profit 3000.00 and 20% of cost.
        let (vehicle, _, _) = registered(Classification::owner());
        assert_eq!(vehicle.display_name(), "2024 Toyota Corolla");
        assert_eq!(vehicle.profit_amount(), 300_000);
        assert!((vehicle.profit_percentage() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn edit_vehicle_recomputes_derived_figures() {
        let (mut vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        let before = vehicle.profit_amount();

        execute(
            &mut vehicle,
            &VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit {
                    pricing: Some(VehiclePricing::new(1_500_000, 2_000_000, "USD")),
                    ..VehicleEdit::default()
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_ne!(vehicle.profit_amount(), before);
        assert_eq!(vehicle.profit_amount(), 500_000);
    }

    #[test]
    fn edit_vehicle_rejects_empty_edit() {
        let (vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        let err = vehicle
            .handle(&VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit::default(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty edit"),
        }
    }

    #[test]
    fn edit_vehicle_revalidates_classification() {
        let (vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        let err = vehicle
            .handle(&VehicleCommand::EditVehicle(EditVehicle {
                tenant_id,
                vehicle_id,
                changes: VehicleEdit {
                    classification: Some(Classification {
                        business_type: BusinessType::Consigned,
                        vendor_id: None,
                        commission: None,
                    }),
                    ..VehicleEdit::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::IncompleteClassification(_) => {}
            _ => panic!("Expected IncompleteClassification error"),
        }
    }

    #[test]
    fn lifecycle_walks_draft_available_reserved_sold() {
        let (mut vehicle, tenant_id, vehicle_id) = available(Classification::owner());
        assert_eq!(vehicle.state(), VehicleState::Available);

        execute(
            &mut vehicle,
            &VehicleCommand::ReserveVehicle(ReserveVehicle {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(vehicle.state(), VehicleState::Reserved);

        execute(
            &mut vehicle,
            &VehicleCommand::ReleaseVehicle(ReleaseVehicle {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(vehicle.state(), VehicleState::Available);

        execute(
            &mut vehicle,
            &VehicleCommand::MarkSold(MarkSold {
                tenant_id,
                vehicle_id,
                sale_reference: "SO-0001".to_string(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(vehicle.state(), VehicleState::Sold);
        assert_eq!(vehicle.sale_reference(), Some("SO-0001"));
    }

    #[test]
    fn mark_sold_rejects_already_sold() {
        let (mut vehicle, tenant_id, vehicle_id) = available(Classification::owner());
        let cmd = VehicleCommand::MarkSold(MarkSold {
            tenant_id,
            vehicle_id,
            sale_reference: "SO-0001".to_string(),
            occurred_at: test_time(),
        });
        execute(&mut vehicle, &cmd).unwrap();

        let err = vehicle.handle(&cmd).unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error for double sale"),
        }
    }

    #[test]
    fn mark_sold_rejects_draft_vehicle() {
        let (vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        let err = vehicle
            .handle(&VehicleCommand::MarkSold(MarkSold {
                tenant_id,
                vehicle_id,
                sale_reference: "SO-0001".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error for draft sale"),
        }
    }

    #[test]
    fn return_rejects_owner_stock_regardless_of_state() {
        let (mut vehicle, tenant_id, vehicle_id) = available(Classification::owner());
        execute(
            &mut vehicle,
            &VehicleCommand::MarkSold(MarkSold {
                tenant_id,
                vehicle_id,
                sale_reference: "SO-0001".to_string(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        let err = vehicle
            .handle(&VehicleCommand::ReturnVehicle(ReturnVehicle {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error for owner return"),
        }
    }

    #[test]
    fn return_requires_sold_state() {
        let (vehicle, tenant_id, vehicle_id) = available(Classification::consigned(
            test_vendor(),
            CommissionTerms::percentage_bp(500),
        ));
        let err = vehicle
            .handle(&VehicleCommand::ReturnVehicle(ReturnVehicle {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error for unsold return"),
        }
    }

    #[test]
    fn return_accepts_sold_consigned_stock() {
        let (mut vehicle, tenant_id, vehicle_id) = available(Classification::consigned(
            test_vendor(),
            CommissionTerms::percentage_bp(500),
        ));
        execute(
            &mut vehicle,
            &VehicleCommand::MarkSold(MarkSold {
                tenant_id,
                vehicle_id,
                sale_reference: "SO-0002".to_string(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        execute(
            &mut vehicle,
            &VehicleCommand::ReturnVehicle(ReturnVehicle {
                tenant_id,
                vehicle_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(vehicle.state(), VehicleState::Returned);
    }

    #[test]
    fn link_rejects_second_catalog_entry() {
        let (mut vehicle, tenant_id, vehicle_id) = registered(Classification::owner());
        let entry = AggregateId::new();
        execute(
            &mut vehicle,
            &VehicleCommand::LinkCatalogEntry(LinkCatalogEntry {
                tenant_id,
                vehicle_id,
                catalog_entry_id: entry,
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        let err = vehicle
            .handle(&VehicleCommand::LinkCatalogEntry(LinkCatalogEntry {
                tenant_id,
                vehicle_id,
                catalog_entry_id: AggregateId::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for second catalog link"),
        }
        assert_eq!(vehicle.catalog_entry_id(), Some(entry));
    }

    #[test]
    fn vin_rejects_empty_and_oversized_values() {
        assert!(Vin::new("  ").is_err());
        assert!(Vin::new("X".repeat(18)).is_err());
        assert_eq!(Vin::new("1HGCM82633A00435").unwrap().as_str(), "1HGCM82633A00435");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: handle is pure (same state + command = same events,
            /// no state mutation).
            #[test]
            fn handle_does_not_mutate_state(
                make in "[A-Z][a-z]{2,10}",
                model in "[A-Z][a-z]{2,10}",
                cost in 0u64..100_000_000,
                selling in 0u64..100_000_000,
            ) {
                let tenant_id = test_tenant_id();
                let vehicle_id = test_vehicle_id();
                let mut vehicle = Vehicle::empty(vehicle_id);
                let mut cmd = register_cmd(tenant_id, vehicle_id, Classification::owner());
                cmd.spec = VehicleSpec::basic(make, model, Some(2020));
                cmd.pricing = VehiclePricing::new(cost, selling, "USD");
                execute(&mut vehicle, &VehicleCommand::RegisterVehicle(cmd)).unwrap();

                let state_before = vehicle.clone();
                let reserve = VehicleCommand::ReserveVehicle(ReserveVehicle {
                    tenant_id,
                    vehicle_id,
                    occurred_at: Utc::now(),
                });

                let first = vehicle.handle(&reserve);
                let second = vehicle.handle(&reserve);

                prop_assert_eq!(&state_before, &vehicle);
                prop_assert_eq!(first.is_ok(), second.is_ok());
            }

            /// Property: percentage commission never exceeds the purchase
            /// cost for rates up to 100%, and net payable plus commission
            /// always reassembles the cost.
            #[test]
            fn commission_splits_purchase_cost(
                cost in 0u64..100_000_000,
                bp in 1u64..=10_000,
            ) {
                let tenant_id = test_tenant_id();
                let vehicle_id = test_vehicle_id();
                let mut vehicle = Vehicle::empty(vehicle_id);
                let mut cmd = register_cmd(
                    tenant_id,
                    vehicle_id,
                    Classification::dealer_network(
                        test_vendor(),
                        CommissionTerms::percentage_bp(bp),
                    ),
                );
                cmd.pricing = VehiclePricing::new(cost, cost, "USD");
                execute(&mut vehicle, &VehicleCommand::RegisterVehicle(cmd)).unwrap();

                let commission = vehicle.commission_amount();
                prop_assert!(commission <= cost);
                prop_assert_eq!(vehicle.net_payable() + commission, cost);
            }

            /// Property: apply is deterministic (same events = same state).
            #[test]
            fn apply_is_deterministic(
                make in "[A-Z][a-z]{2,10}",
                model in "[A-Z][a-z]{2,10}",
            ) {
                let tenant_id = test_tenant_id();
                let vehicle_id = test_vehicle_id();
                let mut cmd = register_cmd(tenant_id, vehicle_id, Classification::owner());
                cmd.spec = VehicleSpec::basic(make, model, None);

                let events = vec![
                    VehicleEvent::VehicleRegistered(VehicleRegistered {
                        tenant_id,
                        vehicle_id,
                        vin: cmd.vin.clone(),
                        spec: cmd.spec.clone(),
                        pricing: cmd.pricing.clone(),
                        classification: cmd.classification.clone(),
                        catalog_entry_id: None,
                        occurred_at: Utc::now(),
                    }),
                    VehicleEvent::VehicleMadeAvailable(VehicleMadeAvailable {
                        tenant_id,
                        vehicle_id,
                        occurred_at: Utc::now(),
                    }),
                    VehicleEvent::VehicleSold(VehicleSold {
                        tenant_id,
                        vehicle_id,
                        sale_reference: "SO-1".to_string(),
                        occurred_at: Utc::now(),
                    }),
                ];

                let mut a = Vehicle::empty(vehicle_id);
                let mut b = Vehicle::empty(vehicle_id);
                for ev in &events {
                    a.apply(ev);
                    b.apply(ev);
                }

                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.state(), VehicleState::Sold);
                prop_assert_eq!(a.version(), 3);
            }

            /// Property: version increments monotonically with each applied
            /// event.
            #[test]
            fn version_increments_monotonically(steps in 1usize..6) {
                let tenant_id = test_tenant_id();
                let vehicle_id = test_vehicle_id();
                let mut vehicle = Vehicle::empty(vehicle_id);
                execute(
                    &mut vehicle,
                    &VehicleCommand::RegisterVehicle(register_cmd(
                        tenant_id,
                        vehicle_id,
                        Classification::owner(),
                    )),
                )
                .unwrap();
                let mut previous = vehicle.version();

                let toggles = [
                    VehicleCommand::MakeAvailable(MakeAvailable {
                        tenant_id,
                        vehicle_id,
                        occurred_at: Utc::now(),
                    }),
                    VehicleCommand::ReserveVehicle(ReserveVehicle {
                        tenant_id,
                        vehicle_id,
                        occurred_at: Utc::now(),
                    }),
                    VehicleCommand::ReleaseVehicle(ReleaseVehicle {
                        tenant_id,
                        vehicle_id,
                        occurred_at: Utc::now(),
                    }),
                ];

                for cmd in toggles.iter().cycle().take(steps) {
                    if execute(&mut vehicle, cmd).is_ok() {
                        let current = vehicle.version();
                        prop_assert!(current > previous);
                        previous = current;
                    }
                }
            }
        }
    }
}
