/*
Board reducer.
Pure: (current tasks, action, now) -> new tasks. Independent from HTTP / Axum
and from the store, so every rule here is testable on plain slices.
*/

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::action::Action;
use crate::checklist;
use crate::error::Skip;
use crate::models::{Status, Task};
use crate::ordering;

// Apply one action.
//
// Ok carries the next collection; Err means the action changed nothing and
// the input is still authoritative. The input slice is never modified.
pub fn reduce(tasks: &[Task], action: Action, now: DateTime<Utc>) -> Result<Vec<Task>, Skip> {
    match action {
        Action::AddTask { title, description } => Ok(add_task(tasks, title, description, now)),
        Action::MoveTask { id, to_status } => move_task(tasks, id, to_status, now),
        Action::SetDue { id, due_at } => edit(tasks, id, |t| {
            // a future date re-arms the overdue alert; a past one leaves it as is
            if due_at.is_some_and(|due| due > now) {
                t.overdue_notified = false;
            }
            t.due_at = due_at;
            Ok(())
        }),
        Action::ReorderInColumn { status, active_id, over_id } => {
            reorder_in_column(tasks, status, active_id, over_id)
        }
        Action::MarkOverdueNotified { id, value } => edit(tasks, id, |t| {
            t.overdue_notified = value;
            Ok(())
        }),
        Action::DeleteTask(id) => delete_task(tasks, id),
        Action::ToggleAssignee { id, user_id } => edit_open(tasks, id, |t| {
            if t.is_assigned(&user_id) {
                t.assigned_user_ids.retain(|u| *u != user_id);
            } else {
                t.assigned_user_ids.push(user_id);
            }
            Ok(())
        }),
        Action::AddChecklist { task_id, title } => edit_open(tasks, task_id, |t| {
            checklist::add_checklist(t, title);
            Ok(())
        }),
        Action::UpdateChecklistTitle { task_id, checklist_id, title } => {
            edit_open(tasks, task_id, |t| checklist::rename_checklist(t, checklist_id, title))
        }
        Action::AddChecklistItem { task_id, checklist_id, title } => {
            edit_open(tasks, task_id, |t| checklist::add_item(t, checklist_id, title).map(|_| ()))
        }
        Action::ToggleChecklistItem { task_id, checklist_id, item_id } => {
            edit_open(tasks, task_id, |t| checklist::toggle_item(t, checklist_id, item_id))
        }
        Action::UpdateTaskTitle { id, title } => edit_open(tasks, id, |t| {
            t.title = title;
            Ok(())
        }),
        Action::UpdateTaskDescription { id, description } => edit_open(tasks, id, |t| {
            // blank text clears the optional field
            t.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
            Ok(())
        }),
        // persisted data is trusted as-is
        Action::HydrateFromStorage(loaded) => Ok(loaded),
    }
}

fn find(tasks: &[Task], id: Uuid) -> Result<&Task, Skip> {
    tasks.iter().find(|t| t.id == id).ok_or(Skip::TaskNotFound(id))
}

// Copy-on-write edit of a single task; every other entry is carried over unchanged.
fn edit<F>(tasks: &[Task], id: Uuid, f: F) -> Result<Vec<Task>, Skip>
where
    F: FnOnce(&mut Task) -> Result<(), Skip>,
{
    let pos = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(Skip::TaskNotFound(id))?;

    let mut updated = tasks[pos].clone();
    f(&mut updated)?;

    let mut next = tasks.to_vec();
    next[pos] = updated;
    Ok(next)
}

// Same as `edit`, but refuses tasks that are already Done.
// Applies to every content edit: title, description, assignees, checklists.
fn edit_open<F>(tasks: &[Task], id: Uuid, f: F) -> Result<Vec<Task>, Skip>
where
    F: FnOnce(&mut Task) -> Result<(), Skip>,
{
    edit(tasks, id, |t| {
        if t.status == Status::Done {
            return Err(Skip::TaskDone(t.id));
        }
        f(t)
    })
}

// New task goes on top of the New column; everything below shifts down one.
fn add_task(
    tasks: &[Task],
    title: String,
    description: Option<String>,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(Task::new(title, description, now));
    next.extend(tasks.iter().cloned().map(|mut t| {
        if t.status == Status::New {
            t.order_index += 1;
        }
        t
    }));
    next
}

// Timestamp rules for a status change, in this order:
// 1) first entry into Ongoing stamps moved_to_ongoing_at
// 2) every entry into Done refreshes completed_at
// 3) back to New wipes progress, due date and the overdue flag
fn apply_transition(task: &mut Task, to: Status, now: DateTime<Utc>) {
    if to == Status::Ongoing && task.moved_to_ongoing_at.is_none() {
        task.moved_to_ongoing_at = Some(now);
    }
    if to == Status::Done {
        task.completed_at = Some(now);
    }
    if to == Status::New {
        task.moved_to_ongoing_at = None;
        task.completed_at = None;
        task.due_at = None;
        task.overdue_notified = false;
    }
}

// Moved task is appended to the end of the destination column.
fn move_task(tasks: &[Task], id: Uuid, to: Status, now: DateTime<Utc>) -> Result<Vec<Task>, Skip> {
    let task = find(tasks, id)?;
    if task.status == to {
        return Err(Skip::AlreadyInStatus { id, status: to });
    }

    let mut moved = task.clone();
    moved.status = to;
    moved.order_index = tasks.iter().filter(|t| t.status == to).count();
    apply_transition(&mut moved, to, now);

    let mut next: Vec<Task> = tasks.iter().filter(|t| t.id != id).cloned().collect();
    ordering::close_gap(&mut next, task.status, task.order_index);
    next.push(moved);
    Ok(next)
}

// Take `active` out of the column and put it where `over` sits, then re-rank the column.
fn reorder_in_column(
    tasks: &[Task],
    status: Status,
    active_id: Uuid,
    over_id: Uuid,
) -> Result<Vec<Task>, Skip> {
    if active_id == over_id {
        return Err(Skip::SameTask(active_id));
    }

    let column = ordering::sorted_column(tasks, status);
    let position = |id: Uuid| -> Result<usize, Skip> {
        find(tasks, id)?;
        column
            .iter()
            .position(|t| t.id == id)
            .ok_or(Skip::NotInColumn { id, status })
    };
    let from = position(active_id)?;
    let to = position(over_id)?;

    let mut reordered: Vec<Task> = column.into_iter().cloned().collect();
    let active = reordered.remove(from);
    reordered.insert(to, active);
    ordering::resequence(&mut reordered);

    let mut next: Vec<Task> = tasks.iter().filter(|t| t.status != status).cloned().collect();
    next.extend(reordered);
    Ok(next)
}

fn delete_task(tasks: &[Task], id: Uuid) -> Result<Vec<Task>, Skip> {
    let task = find(tasks, id)?;
    let mut next: Vec<Task> = tasks.iter().filter(|t| t.id != id).cloned().collect();
    ordering::close_gap(&mut next, task.status, task.order_index);
    Ok(next)
}
