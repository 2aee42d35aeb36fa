use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use motorlot_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, TenantId, ValueObject,
};
use motorlot_events::Event;
use motorlot_parties::PartyId;
use motorlot_vehicles::VehicleId;

/// Lease contract identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(pub AggregateId);

impl LeaseId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Lease lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseState {
    Draft,
    Active,
    Expired,
    Terminated,
    Completed,
}

/// Commercial terms of a lease contract.
///
/// Monetary amounts are in minor currency units. The excess mileage rate is
/// charged per kilometre over the annual limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: u64,
    pub deposit: u64,
    pub currency: String,
    pub annual_mileage_limit_km: u32,
    pub excess_mileage_rate: u64,
}

impl LeaseTerms {
    /// Whole months between start and end dates (calendar difference).
    pub fn term_months(&self) -> i32 {
        let years = self.end_date.year() - self.start_date.year();
        let months = self.end_date.month() as i32 - self.start_date.month() as i32;
        years * 12 + months
    }

    fn validate(&self) -> DomainResult<()> {
        if self.end_date <= self.start_date {
            return Err(DomainError::validation("end date must be after start date"));
        }
        if self.monthly_payment == 0 {
            return Err(DomainError::validation("monthly payment cannot be zero"));
        }
        Ok(())
    }
}

impl ValueObject for LeaseTerms {}

/// Aggregate root: Lease — one vehicle leased to one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    id: LeaseId,
    tenant_id: Option<TenantId>,
    vehicle_id: Option<VehicleId>,
    customer_id: Option<PartyId>,
    terms: Option<LeaseTerms>,
    state: LeaseState,
    version: u64,
    created: bool,
}

impl Lease {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: LeaseId) -> Self {
        Self {
            id,
            tenant_id: None,
            vehicle_id: None,
            customer_id: None,
            terms: None,
            state: LeaseState::Draft,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> LeaseId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.vehicle_id
    }

    pub fn customer_id(&self) -> Option<PartyId> {
        self.customer_id
    }

    pub fn terms(&self) -> Option<&LeaseTerms> {
        self.terms.as_ref()
    }

    pub fn state(&self) -> LeaseState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LeaseState::Active
    }

    /// Total payments over the full term (term months × monthly payment).
    pub fn total_contract_value(&self) -> u64 {
        self.terms
            .as_ref()
            .map(|t| t.term_months().max(0) as u64 * t.monthly_payment)
            .unwrap_or(0)
    }
}

impl AggregateRoot for Lease {
    type Id = LeaseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateLease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLease {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub vehicle_id: VehicleId,
    pub customer_id: PartyId,
    pub terms: LeaseTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ActivateLease (draft → active).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateLease {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteLease (active → completed, vehicle comes back).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteLease {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TerminateLease (active → terminated early).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateLease {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkExpired (active → expired, end date passed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkExpired {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseCommand {
    CreateLease(CreateLease),
    ActivateLease(ActivateLease),
    CompleteLease(CompleteLease),
    TerminateLease(TerminateLease),
    MarkExpired(MarkExpired),
}

/// Event: LeaseCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseCreated {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub vehicle_id: VehicleId,
    pub customer_id: PartyId,
    pub terms: LeaseTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LeaseActivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseActivated {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LeaseCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseCompleted {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LeaseTerminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTerminated {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LeaseExpired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseExpired {
    pub tenant_id: TenantId,
    pub lease_id: LeaseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseEvent {
    LeaseCreated(LeaseCreated),
    LeaseActivated(LeaseActivated),
    LeaseCompleted(LeaseCompleted),
    LeaseTerminated(LeaseTerminated),
    LeaseExpired(LeaseExpired),
}

impl Event for LeaseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LeaseEvent::LeaseCreated(_) => "leasing.lease.created",
            LeaseEvent::LeaseActivated(_) => "leasing.lease.activated",
            LeaseEvent::LeaseCompleted(_) => "leasing.lease.completed",
            LeaseEvent::LeaseTerminated(_) => "leasing.lease.terminated",
            LeaseEvent::LeaseExpired(_) => "leasing.lease.expired",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LeaseEvent::LeaseCreated(e) => e.occurred_at,
            LeaseEvent::LeaseActivated(e) => e.occurred_at,
            LeaseEvent::LeaseCompleted(e) => e.occurred_at,
            LeaseEvent::LeaseTerminated(e) => e.occurred_at,
            LeaseEvent::LeaseExpired(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Lease {
    type Command = LeaseCommand;
    type Event = LeaseEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LeaseEvent::LeaseCreated(e) => {
                self.id = e.lease_id;
                self.tenant_id = Some(e.tenant_id);
                self.vehicle_id = Some(e.vehicle_id);
                self.customer_id = Some(e.customer_id);
                self.terms = Some(e.terms.clone());
                self.state = LeaseState::Draft;
                self.created = true;
            }
            LeaseEvent::LeaseActivated(_) => {
                self.state = LeaseState::Active;
            }
            LeaseEvent::LeaseCompleted(_) => {
                self.state = LeaseState::Completed;
            }
            LeaseEvent::LeaseTerminated(_) => {
                self.state = LeaseState::Terminated;
            }
            LeaseEvent::LeaseExpired(_) => {
                self.state = LeaseState::Expired;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LeaseCommand::CreateLease(cmd) => self.handle_create(cmd),
            LeaseCommand::ActivateLease(cmd) => self.handle_activate(cmd),
            LeaseCommand::CompleteLease(cmd) => self.handle_complete(cmd),
            LeaseCommand::TerminateLease(cmd) => self.handle_terminate(cmd),
            LeaseCommand::MarkExpired(cmd) => self.handle_expire(cmd),
        }
    }
}

impl Lease {
    fn ensure_exists(&self, tenant_id: TenantId, lease_id: LeaseId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != lease_id {
            return Err(DomainError::invariant("lease_id mismatch"));
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.state != LeaseState::Active {
            return Err(DomainError::invalid_transition(
                "lease is not active".to_string(),
            ));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateLease) -> Result<Vec<LeaseEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("lease already exists"));
        }

        cmd.terms.validate()?;

        Ok(vec![LeaseEvent::LeaseCreated(LeaseCreated {
            tenant_id: cmd.tenant_id,
            lease_id: cmd.lease_id,
            vehicle_id: cmd.vehicle_id,
            customer_id: cmd.customer_id,
            terms: cmd.terms.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_activate(&self, cmd: &ActivateLease) -> Result<Vec<LeaseEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.lease_id)?;

        if self.state != LeaseState::Draft {
            return Err(DomainError::invalid_transition(
                "only draft leases can be activated",
            ));
        }

        Ok(vec![LeaseEvent::LeaseActivated(LeaseActivated {
            tenant_id: cmd.tenant_id,
            lease_id: cmd.lease_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteLease) -> Result<Vec<LeaseEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.lease_id)?;
        self.ensure_active()?;

        Ok(vec![LeaseEvent::LeaseCompleted(LeaseCompleted {
            tenant_id: cmd.tenant_id,
            lease_id: cmd.lease_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_terminate(&self, cmd: &TerminateLease) -> Result<Vec<LeaseEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.lease_id)?;
        self.ensure_active()?;

        Ok(vec![LeaseEvent::LeaseTerminated(LeaseTerminated {
            tenant_id: cmd.tenant_id,
            lease_id: cmd.lease_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_expire(&self, cmd: &MarkExpired) -> Result<Vec<LeaseEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.lease_id)?;
        self.ensure_active()?;

        Ok(vec![LeaseEvent::LeaseExpired(LeaseExpired {
            tenant_id: cmd.tenant_id,
            lease_id: cmd.lease_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
