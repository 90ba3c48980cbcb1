use speculate2::speculate;

speculate! {
    use std::collections::HashSet;

    use taskboard_core::db::{seed_if_empty, Database, SeedReport, SEED_ASSIGNEE_COUNT, SEED_TASK_COUNT};
    use taskboard_core::models::*;
    use taskboard_core::new_id;

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        db
    }

    fn create_test_task(db: &Database, title: &str) -> Task {
        db.create(&Task::new(CreateTaskInput {
            title: title.to_string(),
            description: format!("{} description", title),
            status: Some("open".to_string()),
            progress: Some(10.0),
        }))
        .expect("Failed to create task")
    }

    fn create_test_assignee(db: &Database, name: &str) -> Assignee {
        db.create(&Assignee::new(CreateAssigneeInput {
            name: name.to_string(),
            role: "Reviewer".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            initials: "TA".to_string(),
            color: "#000000".to_string(),
        }))
        .expect("Failed to create assignee")
    }

    describe "identifier generation" {
        it "produces distinct non-empty ids" {
            let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
            assert_eq!(ids.len(), 1000);
            assert!(ids.iter().all(|id| !id.is_empty()));
        }
    }

    describe "create and find" {
        it "reads back every supplied field" {
            let db = setup_db();
            let created = create_test_task(&db, "Write docs");

            let found = db.find_by_field::<Task>("id", &created.id).unwrap().unwrap();

            assert_eq!(found, created);
            assert_eq!(found.title, "Write docs");
            assert_eq!(found.status, "open");
            assert!(found.created_at.is_some());
            assert_eq!(found.created_at, found.updated_at);
        }

        it "returns None for an unknown id" {
            let db = setup_db();
            create_test_task(&db, "Only task");

            let found = db.find_by_field::<Task>("id", "missing").unwrap();
            assert!(found.is_none());
        }

        it "rejects a duplicate identifier" {
            let db = setup_db();
            let task = create_test_task(&db, "Original");

            let result = db.create(&task);

            assert!(result.is_err());
            assert_eq!(db.count::<Task>().unwrap(), 1);
        }

        it "defaults task status to pending" {
            let db = setup_db();
            let task = db.create(&Task::new(CreateTaskInput::default())).unwrap();
            assert_eq!(task.status, "pending");
            assert_eq!(task.progress, 0.0);
        }
    }

    describe "list_all" {
        it "returns records in insertion order" {
            let db = setup_db();
            let first = create_test_task(&db, "first");
            let second = create_test_task(&db, "second");
            let third = create_test_task(&db, "third");

            let ids: Vec<String> = db.list_all::<Task>().unwrap().into_iter().map(|t| t.id).collect();
            assert_eq!(ids, vec![first.id, second.id, third.id]);
        }

        it "returns empty list when no records exist" {
            let db = setup_db();
            assert!(db.list_all::<Assignment>().unwrap().is_empty());
        }
    }

    describe "find_many_by_field_in" {
        it "returns only members of the set" {
            let db = setup_db();
            let a = create_test_task(&db, "a");
            create_test_task(&db, "b");
            let c = create_test_task(&db, "c");

            let found = db
                .find_many_by_field_in::<Task>("id", &[c.id.clone(), a.id.clone(), "nope".to_string()])
                .unwrap();

            let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["a", "c"]);
        }

        it "returns nothing for an empty set" {
            let db = setup_db();
            create_test_task(&db, "a");
            assert!(db.find_many_by_field_in::<Task>("id", &[]).unwrap().is_empty());
        }
    }

    describe "update_by_field" {
        it "changes only the supplied fields" {
            let db = setup_db();
            let task = create_test_task(&db, "Before");

            let updated = db
                .update_by_field::<Task, _>("id", &task.id, &UpdateTaskInput {
                    status: Some("done".to_string()),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert_eq!(updated.status, "done");
            assert_eq!(updated.title, task.title);
            assert_eq!(updated.description, task.description);
            assert_eq!(updated.progress, task.progress);
            assert_eq!(updated.id, task.id);
            assert_eq!(updated.created_at, task.created_at);
        }

        it "cannot overwrite the identifier" {
            let db = setup_db();
            let assignee = create_test_assignee(&db, "Ada");

            let updated = db
                .update_by_field::<Assignee, _>("id", &assignee.id, &serde_json::json!({
                    "id": "hijacked",
                    "name": "Grace",
                }))
                .unwrap()
                .unwrap();

            assert_eq!(updated.id, assignee.id);
            assert_eq!(updated.name, "Grace");
            assert_eq!(updated.role, "Reviewer");
        }

        it "returns None when nothing matches" {
            let db = setup_db();
            let updated = db
                .update_by_field::<Task, _>("id", "missing", &UpdateTaskInput::default())
                .unwrap();
            assert!(updated.is_none());
        }
    }

    describe "delete" {
        it "removes the record" {
            let db = setup_db();
            let task = create_test_task(&db, "Doomed");

            assert_eq!(db.delete_by_field::<Task>("id", &task.id).unwrap(), 1);
            assert!(db.find_by_field::<Task>("id", &task.id).unwrap().is_none());
        }

        it "is a no-op for a missing record" {
            let db = setup_db();
            create_test_task(&db, "Survivor");

            assert_eq!(db.delete_by_field::<Task>("id", "missing").unwrap(), 0);
            assert_eq!(db.count::<Task>().unwrap(), 1);
        }

        it "removes only the first record matching every field" {
            let db = setup_db();
            let first = db.create(&Assignment::new("t1", "a1")).unwrap();
            let second = db.create(&Assignment::new("t1", "a1")).unwrap();
            let other = db.create(&Assignment::new("t1", "a2")).unwrap();

            let removed = db
                .delete_by_fields::<Assignment>(&[("taskId", "t1"), ("assigneeId", "a1")])
                .unwrap();

            assert_eq!(removed, 1);
            let remaining: Vec<String> = db.list_all::<Assignment>().unwrap().into_iter().map(|a| a.id).collect();
            assert_eq!(remaining, vec![second.id, other.id]);
            assert!(!remaining_contains(&db, &first.id));
        }

        it "leaves assignments behind when a task is deleted" {
            let db = setup_db();
            let task = create_test_task(&db, "Linked");
            let assignee = create_test_assignee(&db, "Ada");
            db.create(&Assignment::new(&task.id, &assignee.id)).unwrap();

            db.delete_by_field::<Task>("id", &task.id).unwrap();

            assert_eq!(db.count::<Assignment>().unwrap(), 1);
            assert!(db.tasks_for_assignee(&assignee.id).unwrap().is_empty());
        }
    }

    describe "relationship traversal" {
        it "resolves both sides of an assignment" {
            let db = setup_db();
            let task = create_test_task(&db, "Shared");
            let ada = create_test_assignee(&db, "Ada");
            let grace = create_test_assignee(&db, "Grace");
            create_test_assignee(&db, "Linus");
            db.create(&Assignment::new(&task.id, &ada.id)).unwrap();
            db.create(&Assignment::new(&task.id, &grace.id)).unwrap();

            let assignees = db.assignees_for_task(&task.id).unwrap();
            let names: Vec<&str> = assignees.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, vec!["Ada", "Grace"]);

            let tasks = db.tasks_for_assignee(&ada.id).unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].id, task.id);
        }

        it "returns an empty list when there are no edges" {
            let db = setup_db();
            let ada = create_test_assignee(&db, "Ada");
            assert!(db.tasks_for_assignee(&ada.id).unwrap().is_empty());
        }

        it "lists a task once even with duplicate edges" {
            let db = setup_db();
            let task = create_test_task(&db, "Twice");
            let ada = create_test_assignee(&db, "Ada");
            db.create(&Assignment::new(&task.id, &ada.id)).unwrap();
            db.create(&Assignment::new(&task.id, &ada.id)).unwrap();

            assert_eq!(db.tasks_for_assignee(&ada.id).unwrap().len(), 1);
        }
    }

    describe "seeding" {
        it "fills empty collections" {
            let db = setup_db();

            let report = seed_if_empty(&db).unwrap();

            assert_eq!(report.tasks, SEED_TASK_COUNT);
            assert_eq!(report.assignees, SEED_ASSIGNEE_COUNT);

            let tasks = db.list_all::<Task>().unwrap();
            assert_eq!(tasks.len(), 20);
            for (n, task) in tasks.iter().enumerate() {
                assert_eq!(task.title, format!("Task {}", n + 1));
                assert_eq!(task.status, "pending");
                assert!((0.0..=100.0).contains(&task.progress));
            }

            let assignees = db.list_all::<Assignee>().unwrap();
            assert_eq!(assignees.len(), 10);
            assert!(assignees.iter().all(|a| a.role == "Developer"));
            assert!(db.list_all::<Assignment>().unwrap().is_empty());
        }

        it "does nothing on a second run" {
            let db = setup_db();
            seed_if_empty(&db).unwrap();

            let report = seed_if_empty(&db).unwrap();

            assert_eq!(report, SeedReport::default());
            assert_eq!(db.count::<Task>().unwrap(), 20);
        }

        it "checks each collection independently" {
            let db = setup_db();
            create_test_task(&db, "Existing");

            let report = seed_if_empty(&db).unwrap();

            assert_eq!(report.tasks, 0);
            assert_eq!(report.assignees, SEED_ASSIGNEE_COUNT);
            assert_eq!(db.count::<Task>().unwrap(), 1);
        }
    }

    describe "file-backed store" {
        it "keeps records across reopen" {
            let dir = tempfile::tempdir().unwrap();
            let url = format!("sqlite://{}", dir.path().join("board.db").display());

            let db = Database::open(&url).unwrap();
            db.migrate().unwrap();
            let task = create_test_task(&db, "Persisted");
            db.close().unwrap();

            let db = Database::open(&url).unwrap();
            db.migrate().unwrap();
            let found = db.find_by_field::<Task>("id", &task.id).unwrap();
            assert_eq!(found.map(|t| t.title), Some("Persisted".to_string()));
        }
    }

    fn remaining_contains(db: &Database, id: &str) -> bool {
        db.find_by_field::<Assignment>("id", id).unwrap().is_some()
    }
}
