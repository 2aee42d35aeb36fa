use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motorlot_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use motorlot_events::Event;
use motorlot_parties::PartyId;
use motorlot_vehicles::{VehicleId, Vin};

/// Sale order identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleOrderId(pub AggregateId);

impl SaleOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SaleOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sale order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleOrderStatus {
    Draft,
    Confirmed,
    Invoiced,
    Closed,
}

/// Order line: one serial-tracked vehicle, quantity implicitly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLine {
    pub line_no: u32,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    /// Display name copied from the vehicle at add time.
    pub description: String,
    /// Price in minor currency units, from the vehicle's selling price.
    pub unit_price: u64,
}

/// Aggregate root: SaleOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOrder {
    id: SaleOrderId,
    tenant_id: Option<TenantId>,
    customer_id: Option<PartyId>,
    status: SaleOrderStatus,
    lines: Vec<VehicleLine>,
    version: u64,
    created: bool,
}

impl SaleOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: SaleOrderId) -> Self {
        Self {
            id,
            tenant_id: None,
            customer_id: None,
            status: SaleOrderStatus::Draft,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SaleOrderId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn customer_id(&self) -> Option<PartyId> {
        self.customer_id
    }

    pub fn status(&self) -> SaleOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[VehicleLine] {
        &self.lines
    }

    /// Order total in minor units (each line counts once).
    pub fn total(&self) -> u64 {
        self.lines.iter().map(|l| l.unit_price).sum()
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, SaleOrderStatus::Draft)
    }

    pub fn is_invoice_allowed(&self) -> bool {
        matches!(self.status, SaleOrderStatus::Confirmed)
    }
}

impl AggregateRoot for SaleOrder {
    type Id = SaleOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateSaleOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleOrder {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub customer_id: PartyId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddVehicleLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVehicleLine {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub description: String,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOrder {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkInvoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkInvoiced {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CloseOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseOrder {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleOrderCommand {
    CreateSaleOrder(CreateSaleOrder),
    AddVehicleLine(AddVehicleLine),
    ConfirmOrder(ConfirmOrder),
    MarkInvoiced(MarkInvoiced),
    CloseOrder(CloseOrder),
}

/// Event: SaleOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOrderCreated {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub customer_id: PartyId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleLineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLineAdded {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub line_no: u32,
    pub vehicle_id: VehicleId,
    pub vin: Option<Vin>,
    pub description: String,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderInvoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInvoiced {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClosed {
    pub tenant_id: TenantId,
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleOrderEvent {
    SaleOrderCreated(SaleOrderCreated),
    VehicleLineAdded(VehicleLineAdded),
    OrderConfirmed(OrderConfirmed),
    OrderInvoiced(OrderInvoiced),
    OrderClosed(OrderClosed),
}

impl Event for SaleOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SaleOrderEvent::SaleOrderCreated(_) => "sales.order.created",
            SaleOrderEvent::VehicleLineAdded(_) => "sales.order.vehicle_line_added",
            SaleOrderEvent::OrderConfirmed(_) => "sales.order.confirmed",
            SaleOrderEvent::OrderInvoiced(_) => "sales.order.invoiced",
            SaleOrderEvent::OrderClosed(_) => "sales.order.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleOrderEvent::SaleOrderCreated(e) => e.occurred_at,
            SaleOrderEvent::VehicleLineAdded(e) => e.occurred_at,
            SaleOrderEvent::OrderConfirmed(e) => e.occurred_at,
            SaleOrderEvent::OrderInvoiced(e) => e.occurred_at,
            SaleOrderEvent::OrderClosed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SaleOrder {
    type Command = SaleOrderCommand;
    type Event = SaleOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SaleOrderEvent::SaleOrderCreated(e) => {
                self.id = e.order_id;
                self.tenant_id = Some(e.tenant_id);
                self.customer_id = Some(e.customer_id);
                self.status = SaleOrderStatus::Draft;
                self.lines.clear();
                self.created = true;
            }
            SaleOrderEvent::VehicleLineAdded(e) => {
                self.lines.push(VehicleLine {
                    line_no: e.line_no,
                    vehicle_id: e.vehicle_id,
                    vin: e.vin.clone(),
                    description: e.description.clone(),
                    unit_price: e.unit_price,
                });
            }
            SaleOrderEvent::OrderConfirmed(_) => {
                self.status = SaleOrderStatus::Confirmed;
            }
            SaleOrderEvent::OrderInvoiced(_) => {
                self.status = SaleOrderStatus::Invoiced;
            }
            SaleOrderEvent::OrderClosed(_) => {
                self.status = SaleOrderStatus::Closed;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SaleOrderCommand::CreateSaleOrder(cmd) => self.handle_create(cmd),
            SaleOrderCommand::AddVehicleLine(cmd) => self.handle_add_line(cmd),
            SaleOrderCommand::ConfirmOrder(cmd) => self.handle_confirm(cmd),
            SaleOrderCommand::MarkInvoiced(cmd) => self.handle_mark_invoiced(cmd),
            SaleOrderCommand::CloseOrder(cmd) => self.handle_close(cmd),
        }
    }
}

impl SaleOrder {
    fn ensure_exists(&self, tenant_id: TenantId, order_id: SaleOrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateSaleOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("sale order already exists"));
        }

        Ok(vec![SaleOrderEvent::SaleOrderCreated(SaleOrderCreated {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddVehicleLine) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.order_id)?;

        if !self.is_modifiable() {
            return Err(DomainError::invalid_transition(
                "lines can only be added to draft orders",
            ));
        }

        if cmd.description.trim().is_empty() {
            return Err(DomainError::validation("line description cannot be empty"));
        }

        if self.lines.iter().any(|l| l.vehicle_id == cmd.vehicle_id) {
            return Err(DomainError::conflict("vehicle is already on this order"));
        }

        let line_no = self.lines.len() as u32 + 1;

        Ok(vec![SaleOrderEvent::VehicleLineAdded(VehicleLineAdded {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            line_no,
            vehicle_id: cmd.vehicle_id,
            vin: cmd.vin.clone(),
            description: cmd.description.clone(),
            unit_price: cmd.unit_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.order_id)?;

        if self.status != SaleOrderStatus::Draft {
            return Err(DomainError::invalid_transition(
                "only draft orders can be confirmed",
            ));
        }

        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "order must have at least one vehicle line",
            ));
        }

        Ok(vec![SaleOrderEvent::OrderConfirmed(OrderConfirmed {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_invoiced(&self, cmd: &MarkInvoiced) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.order_id)?;

        if !self.is_invoice_allowed() {
            return Err(DomainError::invalid_transition(
                "only confirmed orders can be invoiced",
            ));
        }

        Ok(vec![SaleOrderEvent::OrderInvoiced(OrderInvoiced {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_close(&self, cmd: &CloseOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.order_id)?;

        if self.status != SaleOrderStatus::Invoiced {
            return Err(DomainError::invalid_transition(
                "only invoiced orders can be closed",
            ));
        }

        Ok(vec![SaleOrderEvent::OrderClosed(OrderClosed {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorlot_events::execute;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_order_id() -> SaleOrderId {
        SaleOrderId::new(AggregateId::new())
    }

    fn test_vehicle_id() -> VehicleId {
        VehicleId::new(AggregateId::new())
    }

    fn created() -> (SaleOrder, TenantId, SaleOrderId) {
        let tenant_id = test_tenant_id();
        let order_id = test_order_id();
        let mut order = SaleOrder::empty(order_id);
        execute(
            &mut order,
            &SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
                tenant_id,
                order_id,
                customer_id: PartyId::new(AggregateId::new()),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        (order, tenant_id, order_id)
    }

    fn line_cmd(tenant_id: TenantId, order_id: SaleOrderId, price: u64) -> AddVehicleLine {
        AddVehicleLine {
            tenant_id,
            order_id,
            vehicle_id: test_vehicle_id(),
            vin: Some(Vin::new("5YJ3E1EA7KF").unwrap()),
            description: "2024 Toyota Corolla".to_string(),
            unit_price: price,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn add_line_numbers_lines_sequentially_and_totals() {
        let (mut order, tenant_id, order_id) = created();
        execute(
            &mut order,
            &SaleOrderCommand::AddVehicleLine(line_cmd(tenant_id, order_id, 1_800_000)),
        )
        .unwrap();
        execute(
            &mut order,
            &SaleOrderCommand::AddVehicleLine(line_cmd(tenant_id, order_id, 2_200_000)),
        )
        .unwrap();

        assert_eq!(order.lines()[0].line_no, 1);
        assert_eq!(order.lines()[1].line_no, 2);
        assert_eq!(order.total(), 4_000_000);
    }

    #[test]
    fn add_line_rejects_duplicate_vehicle() {
        let (mut order, tenant_id, order_id) = created();
        let cmd = line_cmd(tenant_id, order_id, 1_800_000);
        execute(&mut order, &SaleOrderCommand::AddVehicleLine(cmd.clone())).unwrap();

        let err = order
            .handle(&SaleOrderCommand::AddVehicleLine(cmd))
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate vehicle line"),
        }
    }

    #[test]
    fn confirm_requires_at_least_one_line() {
        let (order, tenant_id, order_id) = created();
        let err = order
            .handle(&SaleOrderCommand::ConfirmOrder(ConfirmOrder {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty order"),
        }
    }

    #[test]
    fn lifecycle_draft_confirmed_invoiced_closed() {
        let (mut order, tenant_id, order_id) = created();
        execute(
            &mut order,
            &SaleOrderCommand::AddVehicleLine(line_cmd(tenant_id, order_id, 1_800_000)),
        )
        .unwrap();

        execute(
            &mut order,
            &SaleOrderCommand::ConfirmOrder(ConfirmOrder {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        assert_eq!(order.status(), SaleOrderStatus::Confirmed);
        assert!(!order.is_modifiable());

        execute(
            &mut order,
            &SaleOrderCommand::MarkInvoiced(MarkInvoiced {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        assert_eq!(order.status(), SaleOrderStatus::Invoiced);

        execute(
            &mut order,
            &SaleOrderCommand::CloseOrder(CloseOrder {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        assert_eq!(order.status(), SaleOrderStatus::Closed);
    }

    #[test]
    fn add_line_rejects_confirmed_order() {
        let (mut order, tenant_id, order_id) = created();
        execute(
            &mut order,
            &SaleOrderCommand::AddVehicleLine(line_cmd(tenant_id, order_id, 1_800_000)),
        )
        .unwrap();
        execute(
            &mut order,
            &SaleOrderCommand::ConfirmOrder(ConfirmOrder {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();

        let err = order
            .handle(&SaleOrderCommand::AddVehicleLine(line_cmd(
                tenant_id, order_id, 100,
            )))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error"),
        }
    }

    #[test]
    fn invoice_requires_confirmed_order() {
        let (order, tenant_id, order_id) = created();
        let err = order
            .handle(&SaleOrderCommand::MarkInvoiced(MarkInvoiced {
                tenant_id,
                order_id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvalidTransition(_) => {}
            _ => panic!("Expected InvalidTransition error"),
        }
    }
}
