//! Task commands
//!
//! Each handler runs one [`TaskStore`](crate::stores::TaskStore) action and
//! renders the store's state afterwards.

use colored::{ColoredString, Colorize};
use prettytable::{cell, format, row, Table};

use super::App;
use crate::api::{
    CreateTaskRequest, Pagination, Task, TaskListParams, TaskStatus, UpdateTaskRequest,
};
use crate::cli::TaskCommand;
use crate::error::Result;

/// Longest title shown in a list row before it is shortened.
const MAX_TITLE_WIDTH: usize = 48;

/// Handle task commands
pub async fn handle_tasks(app: &App, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::List {
            page,
            limit,
            status,
            search,
            sort,
            order,
            json,
        } => {
            app.tasks.update_filters(TaskListParams {
                page,
                limit,
                status,
                search,
                sort_field: sort,
                sort_order: order,
            });
            let tasks = app.tasks.fetch_tasks(None).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }

            if tasks.is_empty() {
                println!("{}", "No tasks found.".yellow());
                return Ok(());
            }

            task_table(&tasks).printstd();
            println!("{}", page_summary(&app.tasks.pagination()));
        }
        TaskCommand::Show { id, json } => {
            let task = app.tasks.fetch_task(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                task_detail(&task).printstd();
            }
        }
        TaskCommand::Create { title } => {
            let task = app.tasks.create_task(&CreateTaskRequest { title }).await?;
            println!("{}", format!("Created task {}", task.id).green());
        }
        TaskCommand::Update { id, title, status } => {
            if title.is_none() && status.is_none() {
                anyhow::bail!("Nothing to update: pass --title and/or --status");
            }
            let task = app
                .tasks
                .update_task(&id, &UpdateTaskRequest { title, status })
                .await?;
            println!(
                "{} {} ({})",
                "Updated task".green(),
                task.id,
                status_label(task.status)
            );
        }
        TaskCommand::Delete { id } => {
            app.tasks.delete_task(&id).await?;
            println!("{}", format!("Deleted task {}", id).green());
        }
    }

    Ok(())
}

fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "ID".bold(),
        "Title".bold(),
        "Status".bold(),
        "Updated".bold()
    ]);

    for task in tasks {
        table.add_row(row![
            task.id.cyan(),
            shorten(&task.title, MAX_TITLE_WIDTH),
            status_label(task.status),
            task.updated_at.format("%Y-%m-%d %H:%M")
        ]);
    }
    table
}

fn task_detail(task: &Task) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row!["ID".bold(), task.id]);
    table.add_row(row!["Title".bold(), task.title]);
    table.add_row(row!["Status".bold(), status_label(task.status)]);
    table.add_row(row!["Owner".bold(), task.user_id]);
    table.add_row(row![
        "Created".bold(),
        task.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ]);
    table.add_row(row![
        "Updated".bold(),
        task.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ]);
    table
}

fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => status.as_str().yellow(),
        TaskStatus::InProgress => status.as_str().cyan(),
        TaskStatus::Completed => status.as_str().green(),
        TaskStatus::Cancelled => status.as_str().dimmed(),
    }
}

fn page_summary(pagination: &Pagination) -> String {
    format!(
        "Page {} of {} ({} tasks)",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total
    )
}

fn shorten(title: &str, width: usize) -> String {
    if title.chars().count() > width {
        let kept: String = title.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}
