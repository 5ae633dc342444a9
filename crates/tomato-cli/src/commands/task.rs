//! Task list commands.

use clap::Subcommand;

use super::{print_json, with_controller, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },
    /// List tasks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task's completed flag
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    with_controller(|ctl, _| {
        match action {
            TaskAction::Add { text } => {
                let task = ctl.add_task(&text)?;
                println!("Task added: {}", task.id);
                print_json(&task)?;
            }
            TaskAction::List { json } => {
                if json {
                    print_json(ctl.tasks().as_slice())?;
                } else if ctl.tasks().is_empty() {
                    println!("No tasks.");
                } else {
                    for task in ctl.tasks().iter() {
                        let mark = if task.completed { "x" } else { " " };
                        println!("[{mark}] {}  {}", task.id, task.text);
                    }
                }
            }
            TaskAction::Toggle { id } => {
                let task = ctl.toggle_task(id)?;
                print_json(&task)?;
            }
            TaskAction::Delete { id } => {
                ctl.delete_task(id)?;
                println!("Task deleted: {id}");
            }
        }

        Ok(())
    })
}
