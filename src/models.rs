use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Board columns, in display order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    Ongoing,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::New, Status::Ongoing, Status::Done];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::New => "new",
            Status::Ongoing => "ongoing",
            Status::Done => "done",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Status::New),
            "ongoing" => Ok(Status::Ongoing),
            "done" => Ok(Status::Done),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn new(title: String) -> Self {
        Checklist {
            id: Uuid::new_v4(),
            title,
            items: Vec::new(),
        }
    }

    // (completed, total)
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|i| i.is_completed).count();
        (done, self.items.len())
    }
}

// Persisted shape of a task. Field names follow the stored JSON blob,
// so older saves without the optional fields still decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_to_ongoing_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub overdue_notified: bool,
    pub order_index: usize, // rank inside its status column
    #[serde(default)]
    pub assigned_user_ids: Vec<String>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
}

impl Task {
    // Fresh task at the top of the New column
    pub fn new(title: String, description: Option<String>, now: DateTime<Utc>) -> Self {
        Task {
            id: Uuid::new_v4(),
            title,
            description,
            status: Status::New,
            created_at: now,
            moved_to_ongoing_at: None,
            completed_at: None,
            due_at: None,
            overdue_notified: false,
            order_index: 0,
            assigned_user_ids: Vec::new(),
            checklists: Vec::new(),
        }
    }

    pub fn is_assigned(&self, user_id: &str) -> bool {
        self.assigned_user_ids.iter().any(|u| u == user_id)
    }
}

// Someone a task can be assigned to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
