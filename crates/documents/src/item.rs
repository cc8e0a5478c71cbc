//! Document line items.

use serde::{Deserialize, Serialize};

use docflow_core::money::{validate_quantity, validate_unit_cost};
use docflow_core::{Amount, DomainResult, ProductId};

/// Whether an adjustment adds to or removes from stock.
///
/// Vocabulary kept from the source system (`entrada` = stock in,
/// `salida` = stock out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Entrada,
    Salida,
}

/// Physical condition of a transfer line on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Good,
    Damaged,
    Missing,
}

/// Where an approved customer-return line goes. Only `inventory` touches
/// stock; money and stock are deliberately decoupled for the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnDestination {
    Inventory,
    Discard,
    Repair,
}

/// One document line.
///
/// The transfer-only fields (`quantity_sent`, `quantity_received`,
/// `condition`) stay `None` for every other kind; `destination` is set on
/// customer-return approval; `free_line` marks sale lines not backed by
/// stock (services, fees).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_cost: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_sent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_received: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ItemCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ReturnDestination>,
    #[serde(default)]
    pub free_line: bool,
}

impl DocumentItem {
    pub fn new(product_id: ProductId, quantity: i64, unit_cost: Amount) -> Self {
        Self {
            product_id,
            quantity,
            unit_cost,
            quantity_sent: None,
            quantity_received: None,
            condition: None,
            destination: None,
            free_line: false,
        }
    }

    pub fn free_line(product_id: ProductId, quantity: i64, unit_cost: Amount) -> Self {
        Self {
            free_line: true,
            ..Self::new(product_id, quantity, unit_cost)
        }
    }

    /// Derived line total. Never stored; recomputed wherever it is read.
    pub fn total_cost(&self) -> DomainResult<Amount> {
        self.unit_cost.times(self.quantity)
    }

    /// Finalization checks: positive quantity, non-negative unit cost.
    pub fn validate(&self) -> DomainResult<()> {
        validate_quantity(self.quantity)?;
        validate_unit_cost(self.unit_cost)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_cost_is_quantity_times_unit_cost() {
        let item = DocumentItem::new(ProductId::new(), 3, Amount::new(250));
        assert_eq!(item.total_cost().unwrap(), Amount::new(750));
    }

    #[test]
    fn validate_rejects_non_positive_quantity_and_negative_cost() {
        let mut item = DocumentItem::new(ProductId::new(), 0, Amount::new(10));
        assert!(item.validate().is_err());
        item.quantity = 2;
        assert!(item.validate().is_ok());
        item.unit_cost = Amount::new(-1);
        assert!(item.validate().is_err());
    }

    #[test]
    fn zero_unit_cost_is_legal() {
        let item = DocumentItem::new(ProductId::new(), 1, Amount::ZERO);
        assert!(item.validate().is_ok());
        assert_eq!(item.total_cost().unwrap(), Amount::ZERO);
    }
}
