//! In-memory snapshot of everything loaded from the store.
//!
//! The board is rebuilt from scratch after every mutation; it is never
//! patched in place. All sibling lists it hands out are in read order.

use std::collections::HashMap;

use crate::color::Rgb;
use crate::ids::{ProjectId, TaskId, WorkstreamId};
use crate::ordering::sort_siblings;
use crate::project::Project;
use crate::task::Task;
use crate::workstream::Workstream;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    workstreams: Vec<Workstream>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
}

impl Board {
    /// Build a board, putting each collection into read order.
    pub fn new(
        mut workstreams: Vec<Workstream>,
        mut projects: Vec<Project>,
        mut tasks: Vec<Task>,
    ) -> Self {
        sort_siblings(&mut workstreams);
        sort_siblings(&mut projects);
        sort_siblings(&mut tasks);
        Board {
            workstreams,
            projects,
            tasks,
        }
    }

    pub fn workstreams(&self) -> &[Workstream] {
        &self.workstreams
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn workstream(&self, id: &WorkstreamId) -> Option<&Workstream> {
        self.workstreams.iter().find(|w| &w.id == id)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Projects owned by a workstream, in read order.
    pub fn projects_in(&self, workstream: &WorkstreamId) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| &p.workstream_id == workstream)
            .collect()
    }

    /// Tasks owned by a project, in read order.
    pub fn tasks_in(&self, project: &ProjectId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| &t.project_id == project)
            .collect()
    }

    /// All tasks bucketed by owning project. Each bucket keeps read order.
    pub fn group_tasks_by_project(&self) -> HashMap<&ProjectId, Vec<&Task>> {
        let mut groups: HashMap<&ProjectId, Vec<&Task>> = HashMap::new();
        for task in &self.tasks {
            groups.entry(&task.project_id).or_default().push(task);
        }
        groups
    }

    pub fn workstream_color(&self, id: &WorkstreamId) -> Rgb {
        self.workstream(id)
            .map(Workstream::display_color)
            .unwrap_or(Rgb::FALLBACK)
    }

    pub fn project_color(&self, id: &ProjectId) -> Rgb {
        self.project(id)
            .map(|p| self.workstream_color(&p.workstream_id))
            .unwrap_or(Rgb::FALLBACK)
    }

    /// A task inherits its color from its project's workstream.
    pub fn task_color(&self, task: &Task) -> Rgb {
        self.project_color(&task.project_id)
    }

    pub fn is_empty(&self) -> bool {
        self.workstreams.is_empty() && self.projects.is_empty() && self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ws(id: &str, name: &str, pos: i64) -> Workstream {
        Workstream {
            id: id.into(),
            name: name.to_string(),
            color: None,
            sort_order: Some(pos),
            created_at: None,
        }
    }

    fn project(id: &str, ws: &str, pos: Option<i64>, minute: u32) -> Project {
        Project {
            id: id.into(),
            title: id.to_uppercase(),
            status: Some("active".into()),
            workstream_id: ws.into(),
            sort_order: pos,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 8, minute, 0).unwrap(),
        }
    }

    fn task(id: &str, project: &str, pos: Option<i64>, minute: u32) -> Task {
        Task {
            id: id.into(),
            project_id: project.into(),
            title: id.to_string(),
            due_date: None,
            assignee: None,
            done: false,
            sort_order: pos,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn siblings_come_back_in_read_order() {
        let board = Board::new(
            vec![ws("w2", "研發組", 1), ws("w1", "兒少組", 0)],
            vec![
                project("p3", "w1", None, 0),
                project("p2", "w1", Some(1), 5),
                project("p1", "w1", Some(1), 1),
                project("px", "w2", Some(0), 0),
            ],
            vec![],
        );

        let names: Vec<_> = board.workstreams().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(names, vec!["w1", "w2"]);

        let in_w1: Vec<_> = board
            .projects_in(&"w1".into())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(in_w1, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn task_color_is_inherited_from_workstream() {
        let board = Board::new(
            vec![ws("w1", "數位推廣組", 0)],
            vec![project("p1", "w1", Some(0), 0)],
            vec![task("t1", "p1", Some(0), 0), task("orphan", "missing", Some(0), 1)],
        );
        let t1 = board.task(&"t1".into()).unwrap();
        assert_eq!(board.task_color(t1), Rgb::new(0x7c, 0x3a, 0xed));

        let orphan = board.task(&"orphan".into()).unwrap();
        assert_eq!(board.task_color(orphan), Rgb::FALLBACK);
    }

    #[test]
    fn tasks_grouped_per_project() {
        let board = Board::new(
            vec![],
            vec![],
            vec![
                task("b", "p1", Some(1), 0),
                task("x", "p2", Some(0), 0),
                task("a", "p1", Some(0), 1),
            ],
        );
        let groups = board.group_tasks_by_project();
        let p1: Vec<_> = groups[&ProjectId::new("p1")].iter().map(|t| t.id.as_str()).collect();
        assert_eq!(p1, vec!["a", "b"]);
        assert_eq!(groups[&ProjectId::new("p2")].len(), 1);
    }
}
