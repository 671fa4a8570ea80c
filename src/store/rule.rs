use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::{Entity, MemoryRepo};

/// Percentage split of income across the three buckets. Not validated to
/// sum to 100 here; the creation dialog enforces that client-side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocations {
    pub needs: u8,
    pub wants: u8,
    pub savings: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub allocations: Allocations,
}

impl Entity for Rule {
    fn id(&self) -> &str {
        &self.id
    }
}

struct Inner {
    repo: MemoryRepo<Rule>,
    // The active rule is an explicit reference, not a list position, so
    // activation never disturbs the list order.
    active_id: String,
}

#[derive(Clone)]
pub struct RuleStore {
    inner: Arc<RwLock<Inner>>,
}

impl Default for RuleStore {
    fn default() -> Self {
        let mut repo = MemoryRepo::new();
        repo.insert(Rule {
            id: "1".into(),
            name: "50/30/20 Rule".into(),
            description: "50% Needs, 30% Wants, 20% Savings".into(),
            allocations: Allocations {
                needs: 50,
                wants: 30,
                savings: 20,
            },
        });
        repo.insert(Rule {
            id: "2".into(),
            name: "Zero-Based Budgeting".into(),
            description: "Every rupee/dollar assigned".into(),
            allocations: Allocations {
                needs: 0,
                wants: 0,
                savings: 0,
            },
        });
        Self {
            inner: Arc::new(RwLock::new(Inner {
                repo,
                active_id: "1".into(),
            })),
        }
    }
}

impl RuleStore {
    pub fn list(&self) -> Vec<Rule> {
        self.inner.read().expect("rule store poisoned").repo.list()
    }

    pub fn active(&self) -> Option<Rule> {
        let inner = self.inner.read().expect("rule store poisoned");
        inner.repo.get(&inner.active_id).cloned()
    }

    pub fn activate(&self, id: &str) -> Option<Rule> {
        let mut inner = self.inner.write().expect("rule store poisoned");
        let rule = inner.repo.get(id)?.clone();
        inner.active_id = rule.id.clone();
        Some(rule)
    }

    /// Overwrites the allocation object wholesale; no merge with the old
    /// values and no sum validation.
    pub fn customize(&self, id: &str, allocations: Allocations) -> Option<Rule> {
        self.inner
            .write()
            .expect("rule store poisoned")
            .repo
            .update(id, |rule| rule.allocations = allocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_two_rules_with_the_first_active() {
        let store = RuleStore::default();
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.active().unwrap().id, "1");
    }

    #[test]
    fn activate_switches_the_active_rule_and_keeps_order() {
        let store = RuleStore::default();
        let activated = store.activate("2").unwrap();
        assert_eq!(activated.name, "Zero-Based Budgeting");
        assert_eq!(store.active().unwrap().id, "2");
        let order: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(order, vec!["1", "2"]);
    }

    #[test]
    fn activate_unknown_rule_is_a_miss() {
        let store = RuleStore::default();
        assert!(store.activate("9").is_none());
        assert_eq!(store.active().unwrap().id, "1");
    }

    #[test]
    fn customize_overwrites_allocations_exactly() {
        let store = RuleStore::default();
        let custom = Allocations {
            needs: 40,
            wants: 40,
            savings: 20,
        };
        let rule = store.customize("1", custom).unwrap();
        assert_eq!(rule.allocations, custom);
        assert_eq!(store.list()[0].allocations, custom);
    }
}
