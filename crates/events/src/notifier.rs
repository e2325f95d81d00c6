use serde::Serialize;
use serde_json::Value;

use crate::bus::EventBus;
use crate::event::{Change, EntityKind, EventName};

/// Typed publishing helpers for one entity family.
///
/// ```ignore
/// bus.entity(EntityKind::Client).created(&client);
/// bus.entity(EntityKind::Client).deleted(&client_id);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntityEvents<'a> {
    bus: &'a EventBus,
    kind: EntityKind,
}

impl<'a> EntityEvents<'a> {
    pub fn new(bus: &'a EventBus, kind: EntityKind) -> Self {
        Self { bus, kind }
    }

    pub fn created<T: Serialize + ?Sized>(&self, entity: &T) -> usize {
        self.emit(Change::Created, entity)
    }

    pub fn updated<T: Serialize + ?Sized>(&self, entity: &T) -> usize {
        self.emit(Change::Updated, entity)
    }

    /// Deletion events carry the id only.
    pub fn deleted<I: Serialize + ?Sized>(&self, id: &I) -> usize {
        self.emit(Change::Deleted, id)
    }

    pub fn refresh(&self) -> usize {
        self.bus.notify(EventName::new(self.kind, Change::Refresh))
    }

    fn emit<T: Serialize + ?Sized>(&self, change: Change, value: &T) -> usize {
        let event = EventName::new(self.kind, change);
        let payload = serde_json::to_value(value).unwrap_or_else(|err| {
            tracing::warn!(event = %event, error = %err, "payload not serializable; publishing null");
            Value::Null
        });
        self.bus.publish(event, &payload)
    }
}

impl EventBus {
    /// Publishing helpers scoped to one entity family.
    pub fn entity(&self, kind: EntityKind) -> EntityEvents<'_> {
        EntityEvents::new(self, kind)
    }
}
