//! Category model definitions

use serde::{Deserialize, Serialize};

/// A user-defined task label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

impl Category {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Fixed pool of ids that categories are allocated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryIdPool {
    size: u32,
}

impl Default for CategoryIdPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl CategoryIdPool {
    pub const DEFAULT_SIZE: u32 = 4;

    /// A pool of ids `1..=size`
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> {
        1..=self.size
    }

    /// Lowest id in the pool that no existing category uses
    pub fn allocate(&self, existing: &[Category]) -> Option<u32> {
        self.ids()
            .find(|id| !existing.iter().any(|category| category.id == *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool() {
        let pool = CategoryIdPool::default();
        assert_eq!(pool.size(), 4);
        assert_eq!(pool.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_allocate_lowest_free_id() {
        let pool = CategoryIdPool::new(4);
        assert_eq!(pool.allocate(&[]), Some(1));

        let existing = vec![Category::new(1, "Work"), Category::new(3, "Home")];
        assert_eq!(pool.allocate(&existing), Some(2));

        let existing = vec![
            Category::new(2, "Work"),
            Category::new(1, "Home"),
            Category::new(3, "Sport"),
        ];
        assert_eq!(pool.allocate(&existing), Some(4));
    }

    #[test]
    fn test_allocate_exhausted() {
        let pool = CategoryIdPool::new(2);
        let existing = vec![Category::new(1, "Work"), Category::new(2, "Home")];
        assert_eq!(pool.allocate(&existing), None);

        assert_eq!(CategoryIdPool::new(0).allocate(&[]), None);
    }

    #[test]
    fn test_stored_shape() {
        let json = serde_json::to_string(&Category::new(3, "Courses")).unwrap();
        assert_eq!(json, r#"{"id":3,"name":"Courses"}"#);
    }
}
