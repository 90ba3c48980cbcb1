/// One table per collection. `seq` is the storage row key and only orders
/// results by insertion; `id` mirrors the document's own identifier so the
/// UNIQUE constraint can reject duplicates.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assignees (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assignments (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_assignments_task
    ON assignments(json_extract(doc, '$.taskId'));
CREATE INDEX IF NOT EXISTS idx_assignments_assignee
    ON assignments(json_extract(doc, '$.assigneeId'));
"#;
