/*
Per-column ordering helpers.
Every column keeps a dense, zero-based order_index (0..n-1).
*/

use std::collections::HashMap;

use crate::models::{Status, Task};

// Tasks of one column in display order.
//
// Sorted by order_index; equal ranks (only possible with corrupted data)
// fall back to created_at, then id, so the result is still deterministic.
pub fn sorted_column(tasks: &[Task], status: Status) -> Vec<&Task> {
    let mut column: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
    column.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    column
}

// Close the hole left at `removed` in `status` after a task leaves that column.
pub fn close_gap(tasks: &mut [Task], status: Status, removed: usize) {
    for t in tasks.iter_mut() {
        if t.status == status && t.order_index > removed {
            t.order_index -= 1;
        }
    }
}

// Assign order_index = position for a column already in the desired order.
pub fn resequence(column: &mut [Task]) {
    for (i, t) in column.iter_mut().enumerate() {
        t.order_index = i;
    }
}

// true when every column's order_index values are exactly {0, .., n-1}
pub fn is_dense(tasks: &[Task]) -> bool {
    let mut seen: HashMap<Status, Vec<usize>> = HashMap::new();
    for t in tasks {
        seen.entry(t.status).or_default().push(t.order_index);
    }

    seen.into_values().all(|mut ranks| {
        ranks.sort_unstable();
        ranks.iter().enumerate().all(|(i, r)| i == *r)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(title: &str, status: Status, order_index: usize) -> Task {
        let mut t = Task::new(title.to_string(), None, Utc::now());
        t.status = status;
        t.order_index = order_index;
        t
    }

    fn titles(column: &[&Task]) -> Vec<String> {
        column.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn sorted_column_filters_and_orders() {
        let tasks = vec![
            task("b", Status::New, 1),
            task("x", Status::Done, 0),
            task("a", Status::New, 0),
        ];
        assert_eq!(titles(&sorted_column(&tasks, Status::New)), vec!["a", "b"]);
        assert_eq!(titles(&sorted_column(&tasks, Status::Done)), vec!["x"]);
        assert!(sorted_column(&tasks, Status::Ongoing).is_empty());
    }

    #[test]
    fn duplicate_ranks_break_ties_by_creation_time() {
        let mut older = task("older", Status::New, 0);
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = task("newer", Status::New, 0);
        let tasks = vec![newer, older];

        assert_eq!(titles(&sorted_column(&tasks, Status::New)), vec!["older", "newer"]);
    }

    #[test]
    fn close_gap_only_touches_the_given_column() {
        let mut tasks = vec![
            task("a", Status::New, 0),
            task("c", Status::New, 2),
            task("o", Status::Ongoing, 2),
        ];
        close_gap(&mut tasks, Status::New, 1);

        assert_eq!(tasks[0].order_index, 0);
        assert_eq!(tasks[1].order_index, 1);
        assert_eq!(tasks[2].order_index, 2);
    }

    #[test]
    fn resequence_assigns_positions() {
        let mut column = vec![task("a", Status::New, 7), task("b", Status::New, 3)];
        resequence(&mut column);
        assert_eq!(column[0].order_index, 0);
        assert_eq!(column[1].order_index, 1);
    }

    #[test]
    fn density_check() {
        let good = vec![
            task("a", Status::New, 1),
            task("b", Status::New, 0),
            task("c", Status::Done, 0),
        ];
        assert!(is_dense(&good));
        assert!(is_dense(&[]));

        let gap = vec![task("a", Status::New, 0), task("b", Status::New, 2)];
        assert!(!is_dense(&gap));

        let dup = vec![task("a", Status::Ongoing, 0), task("b", Status::Ongoing, 0)];
        assert!(!is_dense(&dup));
    }
}
