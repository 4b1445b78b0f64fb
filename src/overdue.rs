// --------------------------------------------------
// Overdue detection.
//
// `is_overdue` is a plain predicate. `scan` turns it into one alert per
// due date: the overdue_notified flag on the task keeps repeated scans
// quiet. `spawn_scanner` runs `scan` on a fixed interval.
// --------------------------------------------------

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::action::Action;
use crate::board::{SharedStore, TaskStore};
use crate::models::{Status, Task};

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

// Ongoing, has a due date, and that date is strictly before now
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == Status::Ongoing && task.due_at.is_some_and(|due| due < now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Destructive,
}

// Where alerts go; the board does not care how they are shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

// Default notifier: alerts end up in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        tracing::warn!(%title, %message, ?severity, "notification");
    }
}

// Alert on every overdue task that has not been alerted yet, then mark it.
// Returns the ids that were notified.
pub fn scan(store: &mut TaskStore, notifier: &dyn Notifier, now: DateTime<Utc>) -> Vec<Uuid> {
    let pending: Vec<(Uuid, String)> = store
        .tasks()
        .iter()
        .filter(|t| is_overdue(t, now) && !t.overdue_notified)
        .map(|t| (t.id, t.title.clone()))
        .collect();

    for (id, title) in &pending {
        notifier.notify(
            "Task Overdue",
            &format!("Task \"{title}\" is past its due date!"),
            Severity::Destructive,
        );
        store.dispatch_at(Action::MarkOverdueNotified { id: *id, value: true }, now);
    }

    pending.into_iter().map(|(id, _)| id).collect()
}

// Periodic driver. The first tick fires immediately.
pub fn spawn_scanner(
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let mut guard = store.lock().await;
            let notified = scan(&mut guard, notifier.as_ref(), Utc::now());
            if !notified.is_empty() {
                tracing::info!(count = notified.len(), "overdue tasks notified");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String, Severity)>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, title: &str, message: &str, severity: Severity) {
            self.seen.lock().push((title.to_string(), message.to_string(), severity));
        }
    }

    fn ongoing_due(store: &mut TaskStore, title: &str, due: DateTime<Utc>) -> Uuid {
        store.dispatch(Action::AddTask { title: title.into(), description: None });
        let id = store.tasks()[0].id;
        store.dispatch(Action::MoveTask { id, to_status: Status::Ongoing });
        store.dispatch(Action::SetDue { id, due_at: Some(due) });
        id
    }

    #[test]
    fn predicate_requires_ongoing_and_past_due() {
        let now = Utc::now();
        let mut task = Task::new("A".into(), None, now);
        task.due_at = Some(now - ChronoDuration::seconds(1));
        assert!(!is_overdue(&task, now), "New tasks are never overdue");

        task.status = Status::Ongoing;
        assert!(is_overdue(&task, now));

        task.due_at = None;
        assert!(!is_overdue(&task, now));

        task.status = Status::Done;
        task.due_at = Some(now - ChronoDuration::days(1));
        assert!(!is_overdue(&task, now));
    }

    #[test]
    fn scan_notifies_once_per_due_date() {
        let mut store = TaskStore::new();
        let now = Utc::now();
        let late = ongoing_due(&mut store, "Late", now - ChronoDuration::minutes(1));
        ongoing_due(&mut store, "Fine", now + ChronoDuration::hours(1));
        let recorder = Recorder::default();

        assert_eq!(scan(&mut store, &recorder, now), vec![late]);
        assert!(store.get(late).unwrap().overdue_notified);
        assert!(scan(&mut store, &recorder, now).is_empty());

        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Task Overdue");
        assert_eq!(seen[0].1, "Task \"Late\" is past its due date!");
        assert_eq!(seen[0].2, Severity::Destructive);
    }

    #[test]
    fn new_future_due_date_rearms_the_alert() {
        let mut store = TaskStore::new();
        let now = Utc::now();
        let id = ongoing_due(&mut store, "Late", now - ChronoDuration::minutes(1));
        let recorder = Recorder::default();
        scan(&mut store, &recorder, now);

        store.dispatch_at(Action::SetDue { id, due_at: Some(now + ChronoDuration::minutes(10)) }, now);
        assert!(!store.get(id).unwrap().overdue_notified);

        let later = now + ChronoDuration::minutes(11);
        assert_eq!(scan(&mut store, &recorder, later), vec![id]);
        assert_eq!(recorder.seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn scanner_marks_tasks_in_the_background() {
        let mut store = TaskStore::new();
        let id = ongoing_due(&mut store, "Late", Utc::now() - ChronoDuration::minutes(5));
        let shared = store.into_shared();
        let recorder = Arc::new(Recorder::default());

        // first tick is immediate, so one short wait is enough
        let handle = spawn_scanner(shared.clone(), recorder.clone(), DEFAULT_SCAN_INTERVAL);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        assert!(shared.lock().await.get(id).unwrap().overdue_notified);
        assert_eq!(recorder.seen.lock().len(), 1);
    }
}
