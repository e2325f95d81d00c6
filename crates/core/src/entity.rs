//! Entity trait: identity + continuity across state changes.

use std::collections::HashMap;

/// Entity marker + minimal interface.
///
/// Clients, products, projects and configured project products are entities:
/// two values with the same id denote the same row even if their fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Key entities by id. A later duplicate replaces an earlier one.
pub fn index_by_id<E, I>(entities: I) -> HashMap<E::Id, E>
where
    E: Entity,
    I: IntoIterator<Item = E>,
{
    entities
        .into_iter()
        .map(|entity| (entity.id().clone(), entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    #[test]
    fn later_duplicate_wins() {
        let index = index_by_id([
            Row { id: 1, label: "a" },
            Row { id: 2, label: "b" },
            Row { id: 1, label: "c" },
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index[&1].label, "c");
    }
}
