//! Connection management for workflow services.
//!
//! A connection is a stored credential/authorization linking a user to an
//! external integration. The engine only checks presence and hands the
//! opaque payload to the task's action runner; acquiring and refreshing
//! credentials is an application-layer concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};

/// A stored credential for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection identifier.
    pub id: Uuid,
    /// Service slug this connection authorizes (e.g. `slack`).
    pub service: String,
    /// Opaque credential payload (tokens, workspace ids, ...).
    pub data: Value,
}

impl Connection {
    /// Creates a new connection for a service.
    pub fn new(service: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            service: service.into(),
            data,
        }
    }
}

/// In-memory registry for service connections.
///
/// Connections are stored by service slug and retrieved during execution
/// preflight.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection under its service slug.
    pub fn register(&mut self, connection: Connection) {
        self.connections
            .insert(connection.service.clone(), connection);
    }

    /// Retrieves the connection for a service.
    pub fn get(&self, service: &str) -> WorkflowResult<&Connection> {
        self.connections
            .get(service)
            .ok_or_else(|| WorkflowError::MissingConnection {
                service: service.to_string(),
            })
    }

    /// Returns whether a service has a connection.
    pub fn contains(&self, service: &str) -> bool {
        self.connections.contains_key(service)
    }

    /// Removes the connection for a service.
    pub fn remove(&mut self, service: &str) -> Option<Connection> {
        self.connections.remove(service)
    }

    /// Returns the number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Clears all connections.
    pub fn clear(&mut self) {
        self.connections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_get() {
        let mut registry = ConnectionRegistry::new();
        registry.register(Connection::new("slack", json!({ "token": "xoxb" })));

        assert!(registry.contains("slack"));
        assert_eq!(registry.get("slack").unwrap().service, "slack");
    }

    #[test]
    fn test_missing_connection_error() {
        let registry = ConnectionRegistry::new();
        let result = registry.get("notion");
        assert!(matches!(
            result,
            Err(WorkflowError::MissingConnection { service }) if service == "notion"
        ));
    }
}
