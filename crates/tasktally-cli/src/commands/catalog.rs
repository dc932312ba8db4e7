use clap::Subcommand;
use tasktally_core::Tracker;

use super::{print_json, CommandResult};

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// List all tasks with their row index
    List,
    /// Register a task
    Add {
        task: String,
        /// Hierarchical code such as 1_2
        code: String,
        priority: f64,
    },
}

pub fn run(action: CatalogAction, tracker: &mut Tracker) -> CommandResult {
    match action {
        CatalogAction::List => {
            let catalog = tracker.catalog()?;
            let rows: Vec<serde_json::Value> = catalog
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    serde_json::json!({
                        "index": index,
                        "task": entry.task,
                        "code": entry.code,
                        "priority": entry.priority,
                    })
                })
                .collect();
            print_json(&rows)
        }
        CatalogAction::Add {
            task,
            code,
            priority,
        } => {
            let entry = tracker.add_task(&task, &code, priority)?;
            tracing::info!(task = %entry.task, code = %entry.code, priority, "task registered");
            print_json(&entry)
        }
    }
}
