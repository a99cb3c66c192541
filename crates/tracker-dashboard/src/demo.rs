// crates/tracker-dashboard/src/demo.rs
//
// Seed data for `--demo`: the four fixed workstreams with a handful of
// projects and tasks due around today, held in an in-memory store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use tracker_core::color::WORKSTREAM_PALETTE;
use tracker_protocol::{format_date, Row, Table};
use tracker_store::MemoryStore;

pub const DEMO_USER: &str = "demo-user";
pub const DEMO_EMAIL: &str = "demo@example.org";

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// (workstream index, project id, title)
const PROJECTS: [(usize, &str, &str); 5] = [
    (0, "p-summer-camp", "Summer reading camp"),
    (0, "p-mentors", "Mentor onboarding"),
    (1, "p-grant", "Research grant application"),
    (2, "p-newsletter", "Monthly newsletter"),
    (3, "p-budget", "Annual budget review"),
];

/// (project id, title, due offset in days from today, assignee, done)
const TASKS: [(&str, &str, i64, &str, bool); 10] = [
    ("p-summer-camp", "Book venue", -9, "Lin", false),
    ("p-summer-camp", "Confirm speakers", 1, "Wu", false),
    ("p-summer-camp", "Print flyers", 12, "Lin", false),
    ("p-mentors", "Collect applications", 0, "Chen", false),
    ("p-mentors", "Interview shortlist", 6, "Chen", false),
    ("p-grant", "Draft methodology", -3, "Huang", true),
    ("p-grant", "Budget appendix", 2, "Huang", false),
    ("p-newsletter", "Collect stories", 3, "Tsai", false),
    ("p-newsletter", "Send issue", 20, "Tsai", false),
    ("p-budget", "Quarterly close", 4, "Lee", false),
];

pub async fn seeded_store(today: NaiveDate) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store
        .seed(
            Table::Profiles,
            [row(json!({"id": DEMO_USER, "email": DEMO_EMAIL, "role": "admin"}))],
        )
        .await;

    store
        .seed(
            Table::Workstreams,
            WORKSTREAM_PALETTE.iter().enumerate().map(|(i, (name, color))| {
                row(json!({
                    "id": format!("w-{i}"),
                    "name": name,
                    "color": color.to_hex(),
                    "sort_order": i,
                }))
            }),
        )
        .await;

    store
        .seed(
            Table::Projects,
            PROJECTS.iter().enumerate().map(|(i, (ws, id, title))| {
                row(json!({
                    "id": id,
                    "title": title,
                    "status": "active",
                    "workstream_id": format!("w-{ws}"),
                    "sort_order": i + 1,
                }))
            }),
        )
        .await;

    store
        .seed(
            Table::Tasks,
            TASKS
                .iter()
                .enumerate()
                .map(|(i, (project, title, offset, assignee, done))| {
                    row(json!({
                        "id": format!("t-{i}"),
                        "project_id": project,
                        "title": title,
                        "due_date": format_date(today + Duration::days(*offset)),
                        "assignee": assignee,
                        "done": done,
                        "sort_order": i + 1,
                    }))
                }),
        )
        .await;

    store
}
