use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use motorlot_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use motorlot_events::Event;

use crate::vehicle::VehicleId;

/// Test drive request identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestDriveId(pub AggregateId);

impl TestDriveId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TestDriveId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Test drive request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestDriveState {
    Draft,
    Confirmed,
    Cancelled,
}

/// Aggregate root: TestDrive — a prospect asking to drive one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDrive {
    id: TestDriveId,
    tenant_id: Option<TenantId>,
    vehicle_id: Option<VehicleId>,
    contact_name: String,
    contact_email: String,
    preferred_date: Option<NaiveDate>,
    state: TestDriveState,
    version: u64,
    created: bool,
}

impl TestDrive {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: TestDriveId) -> Self {
        Self {
            id,
            tenant_id: None,
            vehicle_id: None,
            contact_name: String::new(),
            contact_email: String::new(),
            preferred_date: None,
            state: TestDriveState::Draft,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> TestDriveId {
        self.id
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.vehicle_id
    }

    pub fn state(&self) -> TestDriveState {
        self.state
    }

    pub fn contact_name(&self) -> &str {
        &self.contact_name
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    pub fn preferred_date(&self) -> Option<NaiveDate> {
        self.preferred_date
    }
}

impl AggregateRoot for TestDrive {
    type Id = TestDriveId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RequestTestDrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTestDrive {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub vehicle_id: VehicleId,
    pub contact_name: String,
    pub contact_email: String,
    pub preferred_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmTestDrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmTestDrive {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelTestDrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTestDrive {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestDriveCommand {
    RequestTestDrive(RequestTestDrive),
    ConfirmTestDrive(ConfirmTestDrive),
    CancelTestDrive(CancelTestDrive),
}

/// Event: TestDriveRequested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDriveRequested {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub vehicle_id: VehicleId,
    pub contact_name: String,
    pub contact_email: String,
    pub preferred_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TestDriveConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDriveConfirmed {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TestDriveCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDriveCancelled {
    pub tenant_id: TenantId,
    pub test_drive_id: TestDriveId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestDriveEvent {
    TestDriveRequested(TestDriveRequested),
    TestDriveConfirmed(TestDriveConfirmed),
    TestDriveCancelled(TestDriveCancelled),
}

impl Event for TestDriveEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TestDriveEvent::TestDriveRequested(_) => "vehicles.test_drive.requested",
            TestDriveEvent::TestDriveConfirmed(_) => "vehicles.test_drive.confirmed",
            TestDriveEvent::TestDriveCancelled(_) => "vehicles.test_drive.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TestDriveEvent::TestDriveRequested(e) => e.occurred_at,
            TestDriveEvent::TestDriveConfirmed(e) => e.occurred_at,
            TestDriveEvent::TestDriveCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for TestDrive {
    type Command = TestDriveCommand;
    type Event = TestDriveEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TestDriveEvent::TestDriveRequested(e) => {
                self.id = e.test_drive_id;
                self.tenant_id = Some(e.tenant_id);
                self.vehicle_id = Some(e.vehicle_id);
                self.contact_name = e.contact_name.clone();
                self.contact_email = e.contact_email.clone();
                self.preferred_date = Some(e.preferred_date);
                self.state = TestDriveState::Draft;
                self.created = true;
            }
            TestDriveEvent::TestDriveConfirmed(_) => {
                self.state = TestDriveState::Confirmed;
            }
            TestDriveEvent::TestDriveCancelled(_) => {
                self.state = TestDriveState::Cancelled;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TestDriveCommand::RequestTestDrive(cmd) => self.handle_request(cmd),
            TestDriveCommand::ConfirmTestDrive(cmd) => self.handle_confirm(cmd),
            TestDriveCommand::CancelTestDrive(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl TestDrive {
    fn ensure_exists(
        &self,
        tenant_id: TenantId,
        test_drive_id: TestDriveId,
    ) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != test_drive_id {
            return Err(DomainError::invariant("test_drive_id mismatch"));
        }
        Ok(())
    }

    fn handle_request(&self, cmd: &RequestTestDrive) -> Result<Vec<TestDriveEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("test drive request already exists"));
        }
        if cmd.contact_name.trim().is_empty() {
            return Err(DomainError::validation("contact name cannot be empty"));
        }
        if !cmd.contact_email.contains('@') {
            return Err(DomainError::validation("contact email is not valid"));
        }

        Ok(vec![TestDriveEvent::TestDriveRequested(TestDriveRequested {
            tenant_id: cmd.tenant_id,
            test_drive_id: cmd.test_drive_id,
            vehicle_id: cmd.vehicle_id,
            contact_name: cmd.contact_name.clone(),
            contact_email: cmd.contact_email.clone(),
            preferred_date: cmd.preferred_date,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmTestDrive) -> Result<Vec<TestDriveEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.test_drive_id)?;

        if self.state != TestDriveState::Draft {
            return Err(DomainError::invalid_transition(
                "only draft test drives can be confirmed",
            ));
        }

        Ok(vec![TestDriveEvent::TestDriveConfirmed(TestDriveConfirmed {
            tenant_id: cmd.tenant_id,
            test_drive_id: cmd.test_drive_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelTestDrive) -> Result<Vec<TestDriveEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.test_drive_id)?;

        if self.state == TestDriveState::Cancelled {
            return Err(DomainError::conflict("test drive is already cancelled"));
        }

        Ok(vec![TestDriveEvent::TestDriveCancelled(TestDriveCancelled {
            tenant_id: cmd.tenant_id,
            test_drive_id: cmd.test_drive_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorlot_core::AggregateId;
    use motorlot_events::execute;

    fn request_cmd(tenant_id: TenantId, test_drive_id: TestDriveId) -> RequestTestDrive {
        RequestTestDrive {
            tenant_id,
            test_drive_id,
            vehicle_id: VehicleId::new(AggregateId::new()),
            contact_name: "Ada".to_string(),
            contact_email: "ada@example.com".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn request_then_confirm() {
        let tenant_id = TenantId::new();
        let test_drive_id = TestDriveId::new(AggregateId::new());
        let mut td = TestDrive::empty(test_drive_id);

        execute(
            &mut td,
            &TestDriveCommand::RequestTestDrive(request_cmd(tenant_id, test_drive_id)),
        )
        .unwrap();
        assert_eq!(td.state(), TestDriveState::Draft);

        execute(
            &mut td,
            &TestDriveCommand::ConfirmTestDrive(ConfirmTestDrive {
                tenant_id,
                test_drive_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        assert_eq!(td.state(), TestDriveState::Confirmed);
    }

    #[test]
    fn request_rejects_invalid_email() {
        let tenant_id = TenantId::new();
        let test_drive_id = TestDriveId::new(AggregateId::new());
        let td = TestDrive::empty(test_drive_id);
        let mut cmd = request_cmd(tenant_id, test_drive_id);
        cmd.contact_email = "not-an-email".to_string();

        let err = td
            .handle(&TestDriveCommand::RequestTestDrive(cmd))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for bad email"),
        }
    }

    #[test]
    fn cancelled_request_cannot_be_confirmed() {
        let tenant_id = TenantId::new();
        let test_drive_id = TestDriveId::new(AggregateId::new());
        let mut td = TestDrive::empty(test_drive_id);
        execute(
            &mut td,
            &TestDriveCommand::RequestTestDrive(request_cmd(tenant_id, test_drive_id)),
        )
        .unwrap();
        execute(
            &mut td,
            &TestDriveCommand::CancelTestDrive(CancelTestDrive {
                tenant_id,
                test_drive_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();

        let err = td
            .handle(&TestDriveCommand::ConfirmTestDrive(ConfirmTestDrive {
                tenant_id,
                test_drive_id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error"),
        }
    }
}
