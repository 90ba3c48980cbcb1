use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::id::new_id;

/// One edge of the many-to-many relation between tasks and assignees.
///
/// Neither side is checked for existence and the same pair may be linked more
/// than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub task_id: String,
    pub assignee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(task_id: impl Into<String>, assignee_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            task_id: task_id.into(),
            assignee_id: assignee_id.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Record for Assignment {
    const COLLECTION: &'static str = "assignments";
    const NAME: &'static str = "Assignment";

    fn id(&self) -> &str {
        &self.id
    }
}
