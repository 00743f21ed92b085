//! Structural validation of workflow drafts.
//!
//! Validation runs before a draft is persisted and enforces, in order:
//!
//! 1. every task references a known service;
//! 2. at most one trigger task exists;
//! 3. the trigger never appears as the dependent side of an edge;
//! 4. every task depends on at most one other task (single-parent forest);
//! 5. the dependency edges contain no cycle.
//!
//! The check order is deterministic: a multi-trigger or trigger-dependency
//! violation is a cheaper and more specific diagnosis than a cycle report,
//! so those checks run first and short-circuit.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::draft::WorkflowDraft;
use super::service::ServiceRegistry;

/// Structural validation errors for workflow drafts.
///
/// Each variant maps to a distinct user-displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A task references a service missing from the registry.
    #[error("task '{temp_id}' references an unknown service")]
    UnknownService {
        /// Temp ID of the offending task.
        temp_id: String,
    },

    /// More than one trigger task in the draft.
    #[error("a workflow can only have one trigger task")]
    MultipleTriggers,

    /// The trigger task appears as the dependent side of an edge.
    #[error("the trigger task cannot depend on another task")]
    TriggerHasDependency,

    /// A task appears as the dependent side of more than one edge.
    #[error("task '{temp_id}' depends on more than one task")]
    MultipleParents {
        /// Temp ID of the first task seen with a second parent.
        temp_id: String,
    },

    /// The dependency edges contain a directed cycle.
    #[error("workflow dependencies contain a cycle")]
    CyclicDependency,
}

/// Validates workflow drafts before they are persisted.
///
/// Validation is a pure function over the draft's edge list and
/// trigger-membership info: it performs no I/O, never mutates the draft,
/// and validating the same draft twice yields the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphValidator;

impl GraphValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates a draft against the service registry.
    ///
    /// Returns the first violated invariant; an empty draft trivially
    /// passes all checks.
    pub fn validate(
        &self,
        draft: &WorkflowDraft,
        services: &ServiceRegistry,
    ) -> Result<(), ValidationError> {
        let trigger = self.check_trigger_cardinality(draft, services)?;

        if let Some(trigger_temp_id) = trigger {
            self.check_trigger_isolation(draft, &trigger_temp_id)?;
        }

        self.check_single_parent(draft)?;
        self.check_acyclic(draft)?;

        Ok(())
    }

    /// Resolves every task's service and counts triggers.
    ///
    /// Returns the trigger's temp ID if exactly one trigger exists.
    fn check_trigger_cardinality(
        &self,
        draft: &WorkflowDraft,
        services: &ServiceRegistry,
    ) -> Result<Option<String>, ValidationError> {
        let mut trigger: Option<String> = None;

        for task in &draft.tasks {
            let service =
                services
                    .get(task.service_id)
                    .ok_or_else(|| ValidationError::UnknownService {
                        temp_id: task.temp_id.clone(),
                    })?;

            if service.is_trigger() {
                if trigger.is_some() {
                    return Err(ValidationError::MultipleTriggers);
                }
                trigger = Some(task.temp_id.clone());
            }
        }

        Ok(trigger)
    }

    /// Rejects drafts where the trigger is the dependent side of an edge.
    fn check_trigger_isolation(
        &self,
        draft: &WorkflowDraft,
        trigger_temp_id: &str,
    ) -> Result<(), ValidationError> {
        if draft
            .dependencies
            .iter()
            .any(|dep| dep.task_temp_id == trigger_temp_id)
        {
            return Err(ValidationError::TriggerHasDependency);
        }
        Ok(())
    }

    /// Rejects drafts where a task is the dependent side of two edges.
    fn check_single_parent(&self, draft: &WorkflowDraft) -> Result<(), ValidationError> {
        let mut parents: HashMap<&str, &str> = HashMap::new();

        for dep in &draft.dependencies {
            if parents
                .insert(dep.task_temp_id.as_str(), dep.depends_on_temp_id.as_str())
                .is_some()
            {
                return Err(ValidationError::MultipleParents {
                    temp_id: dep.task_temp_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Rejects drafts whose dependency edges contain a directed cycle.
    ///
    /// Runs a depth-first search over the dependency -> dependents adjacency
    /// list with standard white/gray/black coloring: `on_stack` holds the
    /// current path (gray), `visited` holds fully explored nodes (black).
    /// Both sets are owned by this call; the validator keeps no state.
    fn check_acyclic(&self, draft: &WorkflowDraft) -> Result<(), ValidationError> {
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for dep in &draft.dependencies {
            dependents
                .entry(dep.depends_on_temp_id.as_str())
                .or_default()
                .push(dep.task_temp_id.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_stack: HashSet<&str> = HashSet::new();

        for &start in dependents.keys() {
            if !visited.contains(start) {
                self.dfs(start, &dependents, &mut visited, &mut on_stack)?;
            }
        }

        Ok(())
    }

    fn dfs<'a>(
        &self,
        node: &'a str,
        dependents: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        on_stack: &mut HashSet<&'a str>,
    ) -> Result<(), ValidationError> {
        visited.insert(node);
        on_stack.insert(node);

        if let Some(next) = dependents.get(node) {
            for &dependent in next {
                if on_stack.contains(dependent) {
                    return Err(ValidationError::CyclicDependency);
                }
                if !visited.contains(dependent) {
                    self.dfs(dependent, dependents, visited, on_stack)?;
                }
            }
        }

        on_stack.remove(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::draft::TaskDraft;
    use crate::graph::service::{Service, ServiceId, ServiceRegistry};

    struct Fixture {
        services: ServiceRegistry,
        trigger_id: ServiceId,
        action_id: ServiceId,
    }

    fn fixture() -> Fixture {
        let mut services = ServiceRegistry::new();
        let trigger_id = services.register(Service::trigger("manual"));
        let action_id = services.register(Service::action("slack", "post_message"));
        Fixture {
            services,
            trigger_id,
            action_id,
        }
    }

    fn chain_draft(fx: &Fixture) -> WorkflowDraft {
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("t2", fx.action_id))
            .add_task(TaskDraft::new("t3", fx.action_id))
            .connect("t2", "t1")
            .connect("t3", "t2");
        draft
    }

    #[test]
    fn test_empty_draft_passes() {
        let fx = fixture();
        let draft = WorkflowDraft::new();
        assert!(GraphValidator::new().validate(&draft, &fx.services).is_ok());
    }

    #[test]
    fn test_no_dependencies_passes_regardless_of_task_count() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("t2", fx.action_id))
            .add_task(TaskDraft::new("t3", fx.action_id));
        assert!(GraphValidator::new().validate(&draft, &fx.services).is_ok());
    }

    #[test]
    fn test_chain_passes() {
        let fx = fixture();
        let draft = chain_draft(&fx);
        assert!(GraphValidator::new().validate(&draft, &fx.services).is_ok());
    }

    #[test]
    fn test_fan_out_tree_passes() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .connect("a", "t1")
            .connect("b", "t1");
        assert!(GraphValidator::new().validate(&draft, &fx.services).is_ok());
    }

    #[test]
    fn test_unknown_service_fails() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft.add_task(TaskDraft::new("t1", ServiceId::new()));

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(
            result,
            Err(ValidationError::UnknownService {
                temp_id: "t1".into()
            })
        );
    }

    #[test]
    fn test_multiple_triggers_fails() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("t2", fx.trigger_id));

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(result, Err(ValidationError::MultipleTriggers));
    }

    #[test]
    fn test_multiple_triggers_reported_before_cycle() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("t2", fx.trigger_id))
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .connect("a", "b")
            .connect("b", "a");

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(result, Err(ValidationError::MultipleTriggers));
    }

    #[test]
    fn test_trigger_with_dependency_fails() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("t2", fx.action_id))
            .connect("t1", "t2");

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(result, Err(ValidationError::TriggerHasDependency));
    }

    #[test]
    fn test_multiple_parents_fails_naming_first_offender() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", fx.trigger_id))
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .add_task(TaskDraft::new("c", fx.action_id))
            .connect("c", "t1")
            .connect("c", "a")
            .connect("c", "b");

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(
            result,
            Err(ValidationError::MultipleParents { temp_id: "c".into() })
        );
    }

    #[test]
    fn test_two_node_cycle_fails() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .connect("a", "b")
            .connect("b", "a");

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(result, Err(ValidationError::CyclicDependency));
    }

    #[test]
    fn test_long_cycle_fails() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .add_task(TaskDraft::new("c", fx.action_id))
            .add_task(TaskDraft::new("d", fx.action_id))
            .connect("b", "a")
            .connect("c", "b")
            .connect("d", "c")
            .connect("a", "d");

        let result = GraphValidator::new().validate(&draft, &fx.services);
        assert_eq!(result, Err(ValidationError::CyclicDependency));
    }

    #[test]
    fn test_forest_of_disjoint_chains_passes() {
        let fx = fixture();
        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("a", fx.action_id))
            .add_task(TaskDraft::new("b", fx.action_id))
            .add_task(TaskDraft::new("c", fx.action_id))
            .add_task(TaskDraft::new("d", fx.action_id))
            .connect("b", "a")
            .connect("d", "c");

        assert!(GraphValidator::new().validate(&draft, &fx.services).is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let fx = fixture();
        let draft = chain_draft(&fx);
        let validator = GraphValidator::new();

        let first = validator.validate(&draft, &fx.services);
        let second = validator.validate(&draft, &fx.services);
        assert_eq!(first, second);
    }
}
