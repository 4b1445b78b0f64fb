// Checklist mutations on a task the reducer already cloned.
// Callers check the Done guard; these only locate and edit.

use uuid::Uuid;

use crate::error::Skip;
use crate::models::{Checklist, ChecklistItem, Task};

fn find_checklist(task: &mut Task, checklist_id: Uuid) -> Result<&mut Checklist, Skip> {
    let task_id = task.id;
    task.checklists
        .iter_mut()
        .find(|cl| cl.id == checklist_id)
        .ok_or(Skip::ChecklistNotFound { task_id, checklist_id })
}

// Appends an empty checklist, returns its id
pub fn add_checklist(task: &mut Task, title: String) -> Uuid {
    let checklist = Checklist::new(title);
    let id = checklist.id;
    task.checklists.push(checklist);
    id
}

pub fn rename_checklist(task: &mut Task, checklist_id: Uuid, title: String) -> Result<(), Skip> {
    find_checklist(task, checklist_id)?.title = title;
    Ok(())
}

pub fn add_item(task: &mut Task, checklist_id: Uuid, title: String) -> Result<Uuid, Skip> {
    let checklist = find_checklist(task, checklist_id)?;
    let item = ChecklistItem {
        id: Uuid::new_v4(),
        title,
        is_completed: false,
    };
    let id = item.id;
    checklist.items.push(item);
    Ok(id)
}

pub fn toggle_item(task: &mut Task, checklist_id: Uuid, item_id: Uuid) -> Result<(), Skip> {
    let checklist = find_checklist(task, checklist_id)?;
    let item = checklist
        .items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or(Skip::ItemNotFound { checklist_id, item_id })?;
    item.is_completed = !item.is_completed;
    Ok(())
}
