use crate::error::{StoreError, StoreResult};
use crate::model::RepairTicket;
use rust_decimal::Decimal;

/// The one validation rule applied to every ticket the store writes.
/// Customer name is always required; phone only when configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakePolicy {
    pub require_phone: bool,
}

impl IntakePolicy {
    pub fn check(&self, t: &RepairTicket) -> StoreResult<()> {
        if t.customer_name.trim().is_empty() {
            return Err(StoreError::Validation("customer name is required".into()));
        }
        if self.require_phone && t.phone.trim().is_empty() {
            return Err(StoreError::Validation("phone is required".into()));
        }
        if t.agreed_cost < Decimal::ZERO {
            return Err(StoreError::Validation(format!("agreed cost must not be negative ({})", t.agreed_cost)));
        }
        if t.parts_cost < Decimal::ZERO {
            return Err(StoreError::Validation(format!("parts cost must not be negative ({})", t.parts_cost)));
        }
        Ok(())
    }
}
