use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Entity, MemoryRepo};

/// A budget category. Priority 1 categories track a paid/unpaid flag in the
/// dashboard instead of a running spend, but the stored shape is the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub priority: u8,
    pub budget: Decimal,
    pub spent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl Entity for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial update: a field is applied exactly when it is present in the
/// payload, so zero values land as sent.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent: Option<Decimal>,
}

#[derive(Clone, Default)]
pub struct CategoryStore {
    repo: Arc<RwLock<MemoryRepo<Category>>>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Category> {
        self.repo.read().expect("category store poisoned").list()
    }

    pub fn create(&self, name: String, priority: u8, budget: Decimal) -> Category {
        let mut repo = self.repo.write().expect("category store poisoned");
        let category = Category {
            id: repo.mint_id(),
            name,
            priority,
            budget,
            spent: Decimal::ZERO,
            is_paid: None,
        };
        repo.insert(category.clone());
        category
    }

    pub fn update(&self, id: &str, patch: CategoryUpdate) -> Option<Category> {
        self.repo
            .write()
            .expect("category store poisoned")
            .update(id, |category| {
                if let Some(name) = patch.name {
                    category.name = name;
                }
                if let Some(priority) = patch.priority {
                    category.priority = priority;
                }
                if let Some(budget) = patch.budget {
                    category.budget = budget;
                }
                if let Some(spent) = patch.spent {
                    category.spent = spent;
                }
            })
    }

    pub fn delete(&self, id: &str) -> bool {
        self.repo.write().expect("category store poisoned").delete(id)
    }

    pub fn len(&self) -> usize {
        self.repo.read().expect("category store poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_one() -> (CategoryStore, Category) {
        let store = CategoryStore::new();
        let cat = store.create("Rent".into(), 1, Decimal::from(11000));
        (store, cat)
    }

    #[test]
    fn create_starts_with_zero_spent_and_unique_ids() {
        let store = CategoryStore::new();
        let a = store.create("Rent".into(), 1, Decimal::from(11000));
        let b = store.create("Food".into(), 2, Decimal::from(5000));
        assert_eq!(a.spent, Decimal::ZERO);
        assert_eq!(b.spent, Decimal::ZERO);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn update_with_only_spent_changes_only_spent() {
        let (store, cat) = store_with_one();
        let updated = store
            .update(
                &cat.id,
                CategoryUpdate {
                    spent: Some(Decimal::from(2500)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.spent, Decimal::from(2500));
        assert_eq!(updated.name, cat.name);
        assert_eq!(updated.priority, cat.priority);
        assert_eq!(updated.budget, cat.budget);
    }

    #[test]
    fn zero_valued_fields_are_applied_when_present() {
        let (store, cat) = store_with_one();
        let updated = store
            .update(
                &cat.id,
                CategoryUpdate {
                    spent: Some(Decimal::ZERO),
                    budget: Some(Decimal::ZERO),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.budget, Decimal::ZERO);
    }

    #[test]
    fn delete_missing_id_leaves_store_unchanged() {
        let (store, _) = store_with_one();
        assert!(!store.delete("nope"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn is_paid_stays_out_of_the_wire_shape_until_set() {
        let (_, cat) = store_with_one();
        let value = serde_json::to_value(&cat).unwrap();
        assert!(value.get("isPaid").is_none());
        assert_eq!(value["spent"], serde_json::json!(0.0));
    }
}
