//! The parent-held collection and the single channel used to change it

use crate::models::{Entity, EntityId};

/// A change to the parent collection: a full replacement, or a function
/// from the old collection to the new one
pub enum CollectionUpdate {
    Replace(Vec<Entity>),
    Apply(Box<dyn FnOnce(Vec<Entity>) -> Vec<Entity> + Send>),
}

impl CollectionUpdate {
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(Vec<Entity>) -> Vec<Entity> + Send + 'static,
    {
        CollectionUpdate::Apply(Box::new(f))
    }

    /// Resolve the update against the current items
    pub fn resolve(self, current: Vec<Entity>) -> Vec<Entity> {
        match self {
            CollectionUpdate::Replace(items) => items,
            CollectionUpdate::Apply(f) => f(current),
        }
    }
}

impl std::fmt::Debug for CollectionUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionUpdate::Replace(items) => f.debug_tuple("Replace").field(&items.len()).finish(),
            CollectionUpdate::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// The update function handed to a dialog by its host
pub trait CollectionSetter {
    fn set_collection(&mut self, update: CollectionUpdate);
}

impl CollectionSetter for Vec<Entity> {
    fn set_collection(&mut self, update: CollectionUpdate) {
        let current = std::mem::take(self);
        *self = update.resolve(current);
    }
}

/// Ordered list of entities owned by the host view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Entity>,
}

impl Catalog {
    pub fn new(items: Vec<Entity>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    pub fn find(&self, id: &EntityId) -> Option<&Entity> {
        self.items.iter().find(|entity| &entity.id == id)
    }
}

impl CollectionSetter for Catalog {
    fn set_collection(&mut self, update: CollectionUpdate) {
        self.items.set_collection(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityFields;

    fn entity(id: &str, name: &str) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityFields {
                name: name.to_string(),
                image_url: "https://x.com/a.png".to_string(),
                sequence_number: 1,
                year_released: "2020".to_string(),
                source: "DC".to_string(),
            },
        )
    }

    #[test]
    fn test_replace() {
        let mut catalog = Catalog::new(vec![entity("1", "A")]);
        catalog.set_collection(CollectionUpdate::Replace(vec![entity("2", "B"), entity("3", "C")]));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().id.as_str(), "2");
    }

    #[test]
    fn test_apply_sees_current_items() {
        let mut catalog = Catalog::new(vec![entity("1", "A")]);
        catalog.set_collection(CollectionUpdate::apply(|mut items| {
            items.push(entity("2", "B"));
            items
        }));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find(&EntityId::new("2")).unwrap().fields.name, "B");
    }
}
