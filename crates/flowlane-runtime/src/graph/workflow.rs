//! Persisted workflow graph representation.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::draft::WorkflowDraft;
use super::service::ServiceRegistry;
use super::task::{Task, TaskId, WorkflowId};
use crate::error::{WorkflowError, WorkflowResult};

/// A directed dependency between two persisted tasks.
///
/// `task_id` executes after `depends_on_task_id` completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    /// The dependent task.
    pub task_id: TaskId,
    /// The task it waits for.
    pub depends_on_task_id: TaskId,
}

/// A persisted workflow graph containing tasks and dependency edges.
///
/// Internally uses petgraph's `DiGraph` with edges pointing from a
/// dependency to the tasks it enables, so a task's direct dependents are
/// its outgoing neighbors.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    /// Workflow this graph belongs to.
    id: WorkflowId,
    /// The underlying directed graph.
    graph: DiGraph<Task, ()>,
    /// Mapping from TaskId to petgraph's NodeIndex.
    task_indices: HashMap<TaskId, NodeIndex>,
}

impl WorkflowGraph {
    /// Creates a new empty graph for a workflow.
    pub fn new(id: WorkflowId) -> Self {
        Self {
            id,
            graph: DiGraph::new(),
            task_indices: HashMap::new(),
        }
    }

    /// Returns the workflow ID.
    pub fn workflow_id(&self) -> WorkflowId {
        self.id
    }

    /// Returns the number of tasks in the graph.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of dependency edges in the graph.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Adds a task to the graph and returns its ID.
    pub fn add_task(&mut self, task: Task) -> TaskId {
        let id = task.id;
        let index = self.graph.add_node(task);
        self.task_indices.insert(id, index);
        id
    }

    /// Adds a dependency edge: `task` will execute after `depends_on`.
    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) -> WorkflowResult<()> {
        let task_index = self.index_of(task)?;
        let dependency_index = self.index_of(depends_on)?;
        self.graph.add_edge(dependency_index, task_index, ());
        Ok(())
    }

    /// Returns a reference to a task.
    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        let index = self.task_indices.get(&id)?;
        self.graph.node_weight(*index)
    }

    /// Returns a mutable reference to a task.
    pub fn get_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let index = self.task_indices.get(&id)?;
        self.graph.node_weight_mut(*index)
    }

    /// Returns whether a task exists.
    pub fn contains_task(&self, id: TaskId) -> bool {
        self.task_indices.contains_key(&id)
    }

    /// Returns an iterator over all tasks.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.graph.node_weights()
    }

    /// Returns an iterator over all task IDs.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.task_indices.keys().copied()
    }

    /// Returns an iterator over all dependency edges.
    pub fn dependencies(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.graph.edge_indices().filter_map(|edge| {
            let (dependency, task) = self.graph.edge_endpoints(edge)?;
            Some(DependencyEdge {
                task_id: self.graph.node_weight(task)?.id,
                depends_on_task_id: self.graph.node_weight(dependency)?.id,
            })
        })
    }

    /// Returns the IDs of a task's direct dependents.
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        let Some(index) = self.task_indices.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*index, Direction::Outgoing)
            .filter_map(|neighbor| self.graph.node_weight(neighbor))
            .map(|task| task.id)
            .collect()
    }

    /// Returns the task this task depends on, if any.
    pub fn dependency_of(&self, id: TaskId) -> Option<TaskId> {
        let index = self.task_indices.get(&id)?;
        self.graph
            .neighbors_directed(*index, Direction::Incoming)
            .find_map(|neighbor| self.graph.node_weight(neighbor))
            .map(|task| task.id)
    }

    /// Returns the trigger task, if the graph has one.
    pub fn trigger(&self, services: &ServiceRegistry) -> Option<&Task> {
        self.tasks().find(|task| {
            services
                .get(task.service_id)
                .is_some_and(|service| service.is_trigger())
        })
    }

    /// Builds a persisted graph from a validated draft.
    ///
    /// Tasks keep their persistent ID across saves when a task with the
    /// same `temp_id` exists in the prior revision; files and IDs carry
    /// over, while service, position, and configuration come from the
    /// draft. Dependency edges are recreated wholesale.
    pub fn from_draft(
        id: WorkflowId,
        draft: &WorkflowDraft,
        prior: Option<&WorkflowGraph>,
    ) -> WorkflowResult<Self> {
        let mut graph = Self::new(id);
        let mut by_temp_id: HashMap<&str, TaskId> = HashMap::new();

        for draft_task in &draft.tasks {
            let prior_task =
                prior.and_then(|graph| graph.find_by_temp_id(&draft_task.temp_id));

            let mut task = Task::new(&draft_task.temp_id, draft_task.service_id);
            if let Some(prior_task) = prior_task {
                task.id = prior_task.id;
                task.files = prior_task.files.clone();
            }
            task.position = draft_task.position;
            task.config = draft_task.config.clone();

            by_temp_id.insert(draft_task.temp_id.as_str(), task.id);
            graph.add_task(task);
        }

        for dep in &draft.dependencies {
            let task = *by_temp_id.get(dep.task_temp_id.as_str()).ok_or_else(|| {
                WorkflowError::UnknownTask {
                    temp_id: dep.task_temp_id.clone(),
                }
            })?;
            let depends_on = *by_temp_id
                .get(dep.depends_on_temp_id.as_str())
                .ok_or_else(|| WorkflowError::UnknownTask {
                    temp_id: dep.depends_on_temp_id.clone(),
                })?;
            graph.add_dependency(task, depends_on)?;
        }

        Ok(graph)
    }

    /// Looks up a task by the temp ID it was saved under.
    pub fn find_by_temp_id(&self, temp_id: &str) -> Option<&Task> {
        self.tasks().find(|task| task.temp_id == temp_id)
    }

    fn index_of(&self, id: TaskId) -> WorkflowResult<NodeIndex> {
        self.task_indices
            .get(&id)
            .copied()
            .ok_or_else(|| WorkflowError::Internal(format!("task {id} is not in the graph")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::draft::{TaskDraft, WorkflowDraft};
    use crate::graph::service::{Service, ServiceRegistry};

    fn draft_fixture() -> (ServiceRegistry, WorkflowDraft) {
        let mut services = ServiceRegistry::new();
        let trigger_id = services.register(Service::trigger("manual"));
        let action_id = services.register(Service::action("slack", "post_message"));

        let mut draft = WorkflowDraft::new();
        draft
            .add_task(TaskDraft::new("t1", trigger_id))
            .add_task(TaskDraft::new("t2", action_id))
            .add_task(TaskDraft::new("t3", action_id))
            .connect("t2", "t1")
            .connect("t3", "t2");

        (services, draft)
    }

    #[test]
    fn test_from_draft_builds_chain() {
        let (services, draft) = draft_fixture();
        let graph = WorkflowGraph::from_draft(WorkflowId::new(), &draft, None).unwrap();

        assert_eq!(graph.task_count(), 3);
        assert_eq!(graph.dependency_count(), 2);

        let trigger = graph.trigger(&services).unwrap();
        assert_eq!(trigger.temp_id, "t1");

        let dependents = graph.dependents(trigger.id);
        assert_eq!(dependents.len(), 1);
        assert_eq!(graph.get_task(dependents[0]).unwrap().temp_id, "t2");
    }

    #[test]
    fn test_from_draft_keeps_task_ids_across_saves() {
        let (_, draft) = draft_fixture();
        let workflow_id = WorkflowId::new();
        let first = WorkflowGraph::from_draft(workflow_id, &draft, None).unwrap();
        let second = WorkflowGraph::from_draft(workflow_id, &draft, Some(&first)).unwrap();

        for task in first.tasks() {
            let resaved = second.find_by_temp_id(&task.temp_id).unwrap();
            assert_eq!(resaved.id, task.id);
        }
    }

    #[test]
    fn test_from_draft_replaces_edges_wholesale() {
        let (_, mut draft) = draft_fixture();
        let workflow_id = WorkflowId::new();
        let first = WorkflowGraph::from_draft(workflow_id, &draft, None).unwrap();

        // Re-save with t3 moved from under t2 to directly under the trigger.
        draft.dependencies.retain(|dep| dep.task_temp_id != "t3");
        draft.connect("t3", "t1");
        let second = WorkflowGraph::from_draft(workflow_id, &draft, Some(&first)).unwrap();

        let t1 = second.find_by_temp_id("t1").unwrap().id;
        let t3 = second.find_by_temp_id("t3").unwrap().id;
        assert_eq!(second.dependency_of(t3), Some(t1));
        assert_eq!(second.dependency_count(), 2);
    }

    #[test]
    fn test_from_draft_rejects_unknown_edge_endpoint() {
        let (_, mut draft) = draft_fixture();
        draft.connect("ghost", "t1");

        let result = WorkflowGraph::from_draft(WorkflowId::new(), &draft, None);
        assert!(matches!(
            result,
            Err(WorkflowError::UnknownTask { temp_id }) if temp_id == "ghost"
        ));
    }

    #[test]
    fn test_dependency_of_trigger_is_none() {
        let (services, draft) = draft_fixture();
        let graph = WorkflowGraph::from_draft(WorkflowId::new(), &draft, None).unwrap();
        let trigger = graph.trigger(&services).unwrap();
        assert_eq!(graph.dependency_of(trigger.id), None);
    }
}
