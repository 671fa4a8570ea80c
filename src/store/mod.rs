//! In-memory storage layer.
//! Every collection is an ordered list owned by a `MemoryRepo`; the repo is
//! the seam where a persistent backend would plug in. Nothing survives a
//! restart.

pub mod category;
pub mod rule;
pub mod user;

pub use category::{Category, CategoryStore, CategoryUpdate};
pub use rule::{Allocations, Rule, RuleStore};
pub use user::{Profile, User, UserStore, UserUpdate};

use chrono::Utc;

/// Anything storable: identified by an immutable string id.
pub trait Entity {
    fn id(&self) -> &str;
}

/// Ordered in-memory collection with creation-time ids.
#[derive(Debug)]
pub struct MemoryRepo<T: Entity> {
    items: Vec<T>,
    last_id: i64,
}

impl<T: Entity> Default for MemoryRepo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> MemoryRepo<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            last_id: 0,
        }
    }

    /// Mint a unix-millisecond id, bumped past the previous one when the
    /// clock hasn't moved, so ids stay unique for the repo's lifetime.
    pub fn mint_id(&mut self) -> String {
        let mut id = Utc::now().timestamp_millis();
        if id <= self.last_id {
            id = self.last_id + 1;
        }
        self.last_id = id;
        id.to_string()
    }

    pub fn list(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.to_vec()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Apply `apply` to the matching item, returning the updated copy.
    pub fn update(&mut self, id: &str, apply: impl FnOnce(&mut T)) -> Option<T>
    where
        T: Clone,
    {
        let item = self.items.iter_mut().find(|item| item.id() == id)?;
        apply(item);
        Some(item.clone())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        id: String,
    }

    impl Entity for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn minted_ids_are_unique() {
        let mut repo: MemoryRepo<Note> = MemoryRepo::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(repo.mint_id()));
        }
    }

    #[test]
    fn delete_missing_id_leaves_items_alone() {
        let mut repo = MemoryRepo::new();
        repo.insert(Note { id: "1".into() });
        assert!(!repo.delete("2"));
        assert_eq!(repo.len(), 1);
    }
}
