use std::sync::Arc;

use sysdeck_core::*;

struct Harness {
    sink: Arc<MemoryLogSink>,
    ledger: Arc<MemoryProgressLedger>,
    runner: TaskRunner,
}

async fn setup() -> Harness {
    let sink = Arc::new(MemoryLogSink::new());
    let ledger = Arc::new(MemoryProgressLedger::new(sink.clone()));
    ledger.initialize().await.expect("Failed to initialize ledger");
    let runner = TaskRunner::new("AssetManager", sink.clone(), ledger.clone());
    Harness {
        sink,
        ledger,
        runner,
    }
}

fn task_logs(sink: &MemoryLogSink, title: &str) -> Vec<LogEntry> {
    sink.get_by_manager("AssetManager", None)
        .into_iter()
        .filter(|e| e.message.contains(title))
        .collect()
}

mod execute_task {
    use super::*;

    #[tokio::test]
    async fn returns_the_work_result() {
        let h = setup().await;

        let value = h
            .runner
            .execute_task("Load assets", || async { Ok::<_, anyhow::Error>(42) }, None)
            .await
            .expect("Task failed");

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn success_produces_one_log_pair_and_one_finished_task() {
        let h = setup().await;

        h.runner
            .execute_task("Load assets", || async { Ok::<_, anyhow::Error>(()) }, Some(500))
            .await
            .unwrap();

        let logs = task_logs(&h.sink, "Load assets");
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|e| e.level == LogLevel::Info));
        assert_eq!(logs.iter().filter(|e| e.message.contains("started")).count(), 1);
        assert_eq!(logs.iter().filter(|e| e.message.contains("completed")).count(), 1);

        let tasks = h.ledger.get_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Load assets");
        assert_eq!(tasks[0].status, ProgressStatus::Success);
        assert_eq!(tasks[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn failure_returns_the_original_error_and_records_it() {
        let h = setup().await;

        let err = h
            .runner
            .execute_task("T", || async { Err::<(), _>(anyhow::anyhow!("boom")) }, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");

        let task = &h.ledger.get_tasks()[0];
        assert_eq!(task.status, ProgressStatus::Error);
        assert!(task.error_message.as_deref().unwrap().contains("boom"));

        let failures = h.sink.search(LogFilter {
            level: Some(LogLevel::Error),
            ..LogFilter::default()
        });
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "Task failed: T - boom");
    }

    #[tokio::test]
    async fn failure_message_keeps_the_cause_chain() {
        use anyhow::Context;

        let h = setup().await;

        h.runner
            .execute_task(
                "Import",
                || async {
                    Err::<(), _>(anyhow::anyhow!("disk full")).context("Failed to write asset")
                },
                None,
            )
            .await
            .unwrap_err();

        let task = &h.ledger.get_tasks()[0];
        assert_eq!(
            task.error_message.as_deref(),
            Some("Failed to write asset: disk full")
        );
        assert_eq!(
            task_logs(&h.sink, "Task failed: Import")[0].message,
            "Task failed: Import - Failed to write asset: disk full"
        );
    }

    #[tokio::test]
    async fn custom_error_types_pass_through_unchanged() {
        #[derive(Debug, PartialEq)]
        struct Quota(u32);
        impl std::fmt::Display for Quota {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "quota {} exceeded", self.0)
            }
        }

        let h = setup().await;
        let err = h
            .runner
            .execute_task("T", || async { Err::<(), _>(Quota(7)) }, None)
            .await
            .unwrap_err();

        assert_eq!(err, Quota(7));
    }

    #[tokio::test]
    async fn log_entries_reference_the_progress_task() {
        let h = setup().await;

        h.runner
            .execute_task("T", || async { Ok::<_, anyhow::Error>(()) }, None)
            .await
            .unwrap();

        let id = h.ledger.get_tasks()[0].id.to_string();
        for entry in task_logs(&h.sink, "T") {
            assert_eq!(entry.metadata.unwrap()["task_id"], id.as_str());
        }
    }

    #[tokio::test]
    async fn work_still_runs_when_ledger_is_down() {
        let h = setup().await;
        h.ledger.shutdown().await.unwrap();

        let value = h
            .runner
            .execute_task("T", || async { Ok::<_, anyhow::Error>("ran") }, None)
            .await
            .unwrap();

        assert_eq!(value, "ran");
        assert!(h.ledger.get_tasks().is_empty());
        assert_eq!(task_logs(&h.sink, "Task completed: T").len(), 1);
    }
}

mod execute_task_with_progress {
    use super::*;

    #[tokio::test]
    async fn work_can_report_intermediate_progress() {
        let h = setup().await;
        let ledger = h.ledger.clone();

        h.runner
            .execute_task_with_progress(
                "Sync",
                |progress| async move {
                    progress.update(40.0)?;
                    let id = progress.task_id().expect("task should be tracked");
                    let seen = ledger.get_task(id).unwrap().percentage;
                    Ok::<_, CoreError>(seen)
                },
                None,
            )
            .await
            .map(|seen| assert_eq!(seen, 40.0))
            .unwrap();

        assert_eq!(h.ledger.get_tasks()[0].status, ProgressStatus::Success);
    }

    #[tokio::test]
    async fn reaching_100_inside_the_work_still_completes_cleanly() {
        let h = setup().await;

        h.runner
            .execute_task_with_progress(
                "Sync",
                |progress| async move {
                    progress.update(100.0)?;
                    Ok::<_, CoreError>(())
                },
                None,
            )
            .await
            .unwrap();

        let task = &h.ledger.get_tasks()[0];
        assert_eq!(task.status, ProgressStatus::Success);
        assert_eq!(task_logs(&h.sink, "Task completed: Sync").len(), 1);
    }

    #[tokio::test]
    async fn reported_100_does_not_finish_the_task_early() {
        let h = setup().await;
        let ledger = h.ledger.clone();

        h.runner
            .execute_task_with_progress(
                "Sync",
                |progress| async move {
                    progress.update(100.0)?;
                    let id = progress.task_id().expect("task should be tracked");
                    Ok::<_, CoreError>(ledger.get_task(id).unwrap().status)
                },
                None,
            )
            .await
            .map(|status| assert_eq!(status, ProgressStatus::Running))
            .unwrap();
    }

    #[tokio::test]
    async fn failure_after_reporting_100_marks_the_task_errored() {
        let h = setup().await;

        let result = h
            .runner
            .execute_task_with_progress(
                "Sync",
                |progress| async move {
                    progress.update(100.0)?;
                    Err::<(), _>(anyhow::anyhow!("commit rejected"))
                },
                None,
            )
            .await;

        assert!(result.is_err());
        let task = &h.ledger.get_tasks()[0];
        assert_eq!(task.status, ProgressStatus::Error);
        assert_eq!(task.error_message.as_deref(), Some("commit rejected"));
        assert_eq!(task_logs(&h.sink, "Task failed: Sync").len(), 1);
        assert!(task_logs(&h.sink, "Task completed: Sync").is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_reported_percentage() {
        let h = setup().await;

        let result = h
            .runner
            .execute_task_with_progress(
                "Sync",
                |progress| async move {
                    progress.update(60.0)?;
                    Err::<(), _>(anyhow::anyhow!("link lost"))
                },
                None,
            )
            .await;

        assert!(result.is_err());
        let task = &h.ledger.get_tasks()[0];
        assert_eq!(task.status, ProgressStatus::Error);
        assert_eq!(task.percentage, 60.0);
    }
}
