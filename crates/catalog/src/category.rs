//! Catalog category references.
//!
//! Categories live in the host platform's catalog store. They are resolved
//! once at configuration time and handed to the reconciliation policy as a
//! dependency; nothing in the domain searches for a category by name at
//! operation time.

use serde::{Deserialize, Serialize};

use motorlot_core::AggregateId;
use motorlot_vehicles::BusinessType;

/// Identifier of a catalog category in the host store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub AggregateId);

impl CategoryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Category references per business classification, resolved at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBook {
    pub owner: CategoryId,
    pub dealer_network: CategoryId,
    pub consigned: CategoryId,
}

impl CategoryBook {
    pub fn new(owner: CategoryId, dealer_network: CategoryId, consigned: CategoryId) -> Self {
        Self {
            owner,
            dealer_network,
            consigned,
        }
    }

    /// The category a vehicle's catalog entry belongs to, by classification.
    pub fn for_business_type(&self, business_type: BusinessType) -> CategoryId {
        match business_type {
            BusinessType::Owner => self.owner,
            BusinessType::DealerNetwork => self.dealer_network,
            BusinessType::Consigned => self.consigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_book_maps_each_business_type() {
        let book = CategoryBook::new(
            CategoryId::new(AggregateId::new()),
            CategoryId::new(AggregateId::new()),
            CategoryId::new(AggregateId::new()),
        );

        assert_eq!(book.for_business_type(BusinessType::Owner), book.owner);
        assert_eq!(
            book.for_business_type(BusinessType::DealerNetwork),
            book.dealer_network
        );
        assert_eq!(
            book.for_business_type(BusinessType::Consigned),
            book.consigned
        );
    }
}
