use anyhow::Result;

use super::Database;
use crate::models::{Assignee, Assignment, Task};

impl Database {
    /// Tasks linked to an assignee.
    ///
    /// Two sequential lookups: the assignment edges for the assignee, then the
    /// tasks those edges reference. Dangling edges simply match nothing.
    pub fn tasks_for_assignee(&self, assignee_id: &str) -> Result<Vec<Task>> {
        let edges =
            self.find_many_by_field_in::<Assignment>("assigneeId", &[assignee_id.to_string()])?;
        let task_ids: Vec<String> = edges.into_iter().map(|edge| edge.task_id).collect();
        self.find_many_by_field_in::<Task>("id", &task_ids)
    }

    /// Assignees linked to a task.
    pub fn assignees_for_task(&self, task_id: &str) -> Result<Vec<Assignee>> {
        let edges = self.find_many_by_field_in::<Assignment>("taskId", &[task_id.to_string()])?;
        let assignee_ids: Vec<String> = edges.into_iter().map(|edge| edge.assignee_id).collect();
        self.find_many_by_field_in::<Assignee>("id", &assignee_ids)
    }
}
