// crates/tracker-dashboard/src/components/mod.rs

pub mod workstreams;
pub mod project_tree;
pub mod calendar;
pub mod digest;
pub mod entry_form;
pub mod dialog;
pub mod status_bar;
pub mod help;
