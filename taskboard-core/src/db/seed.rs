use anyhow::Result;
use rand::Rng;

use super::Database;
use crate::models::{Assignee, CreateAssigneeInput, CreateTaskInput, Task};

pub const SEED_TASK_COUNT: usize = 20;
pub const SEED_ASSIGNEE_COUNT: usize = 10;

/// How many records the seeder inserted per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub tasks: usize,
    pub assignees: usize,
}

/// Fills the task and assignee collections with synthetic records when empty.
///
/// Each collection is checked independently; a non-empty collection is left
/// alone. Assignments are never seeded.
pub fn seed_if_empty(db: &Database) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if db.count::<Task>()? == 0 {
        report.tasks = db.create_many(&seed_tasks())?;
        tracing::info!("Seeded {} tasks", report.tasks);
    }

    if db.count::<Assignee>()? == 0 {
        report.assignees = db.create_many(&seed_assignees())?;
        tracing::info!("Seeded {} assignees", report.assignees);
    }

    Ok(report)
}

fn seed_tasks() -> Vec<Task> {
    let mut rng = rand::rng();
    (1..=SEED_TASK_COUNT)
        .map(|n| {
            Task::new(CreateTaskInput {
                title: format!("Task {}", n),
                description: format!("Description for task {}", n),
                status: None,
                progress: Some(f64::from(rng.random_range(0..=100u8))),
            })
        })
        .collect()
}

fn seed_assignees() -> Vec<Assignee> {
    (1..=SEED_ASSIGNEE_COUNT)
        .map(|n| {
            Assignee::new(CreateAssigneeInput {
                name: format!("Assignee {}", n),
                role: "Developer".to_string(),
                email: format!("assignee{}@example.com", n),
                initials: "AS".to_string(),
                color: "#3b82f6".to_string(),
            })
        })
        .collect()
}
