use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity family an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Client,
    Project,
    Product,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Created,
    Updated,
    Deleted,
    /// Not a mutation: consumers should reload their lists.
    Refresh,
}

/// The fixed set of events exchanged on the bus.
///
/// The wire names (`client:created`, `clients:refresh`, ...) are stable and are
/// what gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "client:created")]
    ClientCreated,
    #[serde(rename = "client:updated")]
    ClientUpdated,
    #[serde(rename = "client:deleted")]
    ClientDeleted,
    #[serde(rename = "clients:refresh")]
    ClientsRefresh,
    #[serde(rename = "project:created")]
    ProjectCreated,
    #[serde(rename = "project:updated")]
    ProjectUpdated,
    #[serde(rename = "project:deleted")]
    ProjectDeleted,
    #[serde(rename = "projects:refresh")]
    ProjectsRefresh,
    #[serde(rename = "product:created")]
    ProductCreated,
    #[serde(rename = "product:updated")]
    ProductUpdated,
    #[serde(rename = "product:deleted")]
    ProductDeleted,
    #[serde(rename = "products:refresh")]
    ProductsRefresh,
}

impl EventName {
    pub const ALL: [EventName; 12] = [
        EventName::ClientCreated,
        EventName::ClientUpdated,
        EventName::ClientDeleted,
        EventName::ClientsRefresh,
        EventName::ProjectCreated,
        EventName::ProjectUpdated,
        EventName::ProjectDeleted,
        EventName::ProjectsRefresh,
        EventName::ProductCreated,
        EventName::ProductUpdated,
        EventName::ProductDeleted,
        EventName::ProductsRefresh,
    ];

    pub fn new(kind: EntityKind, change: Change) -> Self {
        use Change::*;
        use EntityKind::*;

        match (kind, change) {
            (Client, Created) => EventName::ClientCreated,
            (Client, Updated) => EventName::ClientUpdated,
            (Client, Deleted) => EventName::ClientDeleted,
            (Client, Refresh) => EventName::ClientsRefresh,
            (Project, Created) => EventName::ProjectCreated,
            (Project, Updated) => EventName::ProjectUpdated,
            (Project, Deleted) => EventName::ProjectDeleted,
            (Project, Refresh) => EventName::ProjectsRefresh,
            (Product, Created) => EventName::ProductCreated,
            (Product, Updated) => EventName::ProductUpdated,
            (Product, Deleted) => EventName::ProductDeleted,
            (Product, Refresh) => EventName::ProductsRefresh,
        }
    }

    /// Every event concerning `kind` (created, updated, deleted, refresh).
    pub fn all_for(kind: EntityKind) -> [EventName; 4] {
        [
            Self::new(kind, Change::Created),
            Self::new(kind, Change::Updated),
            Self::new(kind, Change::Deleted),
            Self::new(kind, Change::Refresh),
        ]
    }

    pub fn kind(self) -> EntityKind {
        match self {
            EventName::ClientCreated
            | EventName::ClientUpdated
            | EventName::ClientDeleted
            | EventName::ClientsRefresh => EntityKind::Client,
            EventName::ProjectCreated
            | EventName::ProjectUpdated
            | EventName::ProjectDeleted
            | EventName::ProjectsRefresh => EntityKind::Project,
            EventName::ProductCreated
            | EventName::ProductUpdated
            | EventName::ProductDeleted
            | EventName::ProductsRefresh => EntityKind::Product,
        }
    }

    pub fn change(self) -> Change {
        match self {
            EventName::ClientCreated | EventName::ProjectCreated | EventName::ProductCreated => {
                Change::Created
            }
            EventName::ClientUpdated | EventName::ProjectUpdated | EventName::ProductUpdated => {
                Change::Updated
            }
            EventName::ClientDeleted | EventName::ProjectDeleted | EventName::ProductDeleted => {
                Change::Deleted
            }
            EventName::ClientsRefresh | EventName::ProjectsRefresh | EventName::ProductsRefresh => {
                Change::Refresh
            }
        }
    }

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::ClientCreated => "client:created",
            EventName::ClientUpdated => "client:updated",
            EventName::ClientDeleted => "client:deleted",
            EventName::ClientsRefresh => "clients:refresh",
            EventName::ProjectCreated => "project:created",
            EventName::ProjectUpdated => "project:updated",
            EventName::ProjectDeleted => "project:deleted",
            EventName::ProjectsRefresh => "projects:refresh",
            EventName::ProductCreated => "product:created",
            EventName::ProductUpdated => "product:updated",
            EventName::ProductDeleted => "product:deleted",
            EventName::ProductsRefresh => "products:refresh",
        }
    }
}

impl core::fmt::Display for EventName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventName {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
        }
        assert!("client:archived".parse::<EventName>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&EventName::ProjectsRefresh).unwrap();
        assert_eq!(json, "\"projects:refresh\"");
    }

    #[test]
    fn new_is_inverse_of_kind_and_change() {
        for name in EventName::ALL {
            assert_eq!(EventName::new(name.kind(), name.change()), name);
        }
    }

    #[test]
    fn all_for_covers_the_four_changes_of_one_kind() {
        let names = EventName::all_for(EntityKind::Product);
        assert!(names.iter().all(|n| n.kind() == EntityKind::Product));
        assert_eq!(names[3], EventName::ProductsRefresh);
    }
}
