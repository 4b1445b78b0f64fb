// Every mutation the board accepts.
//
// The wire form is `{ "type": "MOVE_TASK", "payload": { ... } }`, the same
// object a client dispatches, so POST /api/dispatch can take it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Status, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    AddTask {
        title: String,
        #[serde(default)]
        description: Option<String>,
    },
    MoveTask {
        id: Uuid,
        to_status: Status,
    },
    SetDue {
        id: Uuid,
        #[serde(default)]
        due_at: Option<DateTime<Utc>>,
    },
    ReorderInColumn {
        status: Status,
        active_id: Uuid,
        over_id: Uuid,
    },
    MarkOverdueNotified {
        id: Uuid,
        value: bool,
    },
    DeleteTask(Uuid),
    ToggleAssignee {
        id: Uuid,
        user_id: String,
    },
    AddChecklist {
        task_id: Uuid,
        title: String,
    },
    UpdateChecklistTitle {
        task_id: Uuid,
        checklist_id: Uuid,
        title: String,
    },
    AddChecklistItem {
        task_id: Uuid,
        checklist_id: Uuid,
        title: String,
    },
    ToggleChecklistItem {
        task_id: Uuid,
        checklist_id: Uuid,
        item_id: Uuid,
    },
    UpdateTaskTitle {
        id: Uuid,
        title: String,
    },
    UpdateTaskDescription {
        id: Uuid,
        description: String,
    },
    HydrateFromStorage(Vec<Task>),
}

impl Action {
    // Short name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddTask { .. } => "add_task",
            Action::MoveTask { .. } => "move_task",
            Action::SetDue { .. } => "set_due",
            Action::ReorderInColumn { .. } => "reorder_in_column",
            Action::MarkOverdueNotified { .. } => "mark_overdue_notified",
            Action::DeleteTask(_) => "delete_task",
            Action::ToggleAssignee { .. } => "toggle_assignee",
            Action::AddChecklist { .. } => "add_checklist",
            Action::UpdateChecklistTitle { .. } => "update_checklist_title",
            Action::AddChecklistItem { .. } => "add_checklist_item",
            Action::ToggleChecklistItem { .. } => "toggle_checklist_item",
            Action::UpdateTaskTitle { .. } => "update_task_title",
            Action::UpdateTaskDescription { .. } => "update_task_description",
            Action::HydrateFromStorage(_) => "hydrate_from_storage",
        }
    }

    // Title carried by the action, if any. Callers reject blank ones before dispatch.
    pub fn title(&self) -> Option<&str> {
        match self {
            Action::AddTask { title, .. }
            | Action::AddChecklist { title, .. }
            | Action::UpdateChecklistTitle { title, .. }
            | Action::AddChecklistItem { title, .. }
            | Action::UpdateTaskTitle { title, .. } => Some(title),
            _ => None,
        }
    }
}
