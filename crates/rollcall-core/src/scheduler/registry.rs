//! Item registry: owns every task of a run before and after scheduling.

use crate::domain::{Item, Task};

/// The run's tasks, in discovery order.
///
/// During scheduling the tasks are moved out ([`TaskRegistry::into_tasks`])
/// and travel through the channels by value; the collector hands them back
/// ([`TaskRegistry::restore`]) once every task is terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// One fresh task per item. Slots follow the item order.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let tasks = items
            .into_iter()
            .enumerate()
            .map(|(slot, item)| Task::new(slot, item))
            .collect();
        Self { tasks }
    }

    /// Rebuild the registry from tasks returned in completion order.
    pub fn restore(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(Task::slot);
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}
