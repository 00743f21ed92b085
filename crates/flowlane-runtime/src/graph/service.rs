//! Service descriptors and the service registry.
//!
//! A service describes an external integration a task can invoke: its kind
//! (trigger or action), a stable slug used for connection lookup, and the
//! method name used for action dispatch.

use std::collections::HashMap;
use std::str::FromStr;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use uuid::Uuid;

/// Unique identifier for a service.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Creates a new random service ID.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a service ID from an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ServiceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Role of a service within a workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceKind {
    /// Entry point of a workflow; at most one per graph, no dependency.
    Trigger,
    /// Side-effecting integration call; depends on at most one task.
    Action,
}

impl ServiceKind {
    /// Returns whether this is a trigger service.
    pub const fn is_trigger(&self) -> bool {
        matches!(self, ServiceKind::Trigger)
    }
}

/// Descriptor for an external integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier.
    pub id: ServiceId,
    /// Stable slug (e.g. `slack`, `manual`), used for connection lookup and
    /// output key namespacing.
    pub name: String,
    /// Role of the service within a graph.
    pub kind: ServiceKind,
    /// Method invoked on the integration (e.g. `post_message`). Empty for
    /// triggers, which are never dispatched.
    #[serde(default)]
    pub method: String,
}

impl Service {
    /// Creates a new trigger service.
    pub fn trigger(name: impl Into<String>) -> Self {
        Self {
            id: ServiceId::new(),
            name: name.into(),
            kind: ServiceKind::Trigger,
            method: String::new(),
        }
    }

    /// Creates a new action service with a dispatch method.
    pub fn action(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id: ServiceId::new(),
            name: name.into(),
            kind: ServiceKind::Action,
            method: method.into(),
        }
    }

    /// Returns whether this is a trigger service.
    pub const fn is_trigger(&self) -> bool {
        self.kind.is_trigger()
    }
}

/// In-memory registry for service descriptors.
///
/// Services are stored by ID and resolved during validation and execution.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceId, Service>,
}

impl ServiceRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service under its own ID.
    pub fn register(&mut self, service: Service) -> ServiceId {
        let id = service.id;
        self.services.insert(id, service);
        id
    }

    /// Retrieves a service by ID.
    pub fn get(&self, id: ServiceId) -> Option<&Service> {
        self.services.get(&id)
    }

    /// Removes a service by ID.
    pub fn remove(&mut self, id: ServiceId) -> Option<Service> {
        self.services.remove(&id)
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns an iterator over all registered services.
    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }
}
