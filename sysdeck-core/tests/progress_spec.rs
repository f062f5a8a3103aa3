use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use speculate2::speculate;
use sysdeck_core::*;
use uuid::Uuid;

fn initialized_ledger(clock: Arc<ManualClock>) -> MemoryProgressLedger {
    let ledger = MemoryProgressLedger::with_clock(Arc::new(NullLogSink), clock);
    block_on(ledger.initialize()).expect("Failed to initialize ledger");
    ledger
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

speculate! {
    before {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ledger = initialized_ledger(clock.clone());
    }

    describe "start_task" {
        it "creates a running task at zero percent" {
            let id = ledger.start_task("Import", None).expect("Failed to start");

            let task = ledger.get_task(id).expect("Task missing");
            assert_eq!(task.title, "Import");
            assert_eq!(task.percentage, 0.0);
            assert_eq!(task.status, ProgressStatus::Running);
            assert_eq!(task.remaining_time, 0);
            assert!(task.error_message.is_none());
        }

        it "uses the estimate as the initial remaining time" {
            let id = ledger.start_task("Import", Some(1_000)).expect("Failed to start");
            assert_eq!(ledger.get_task(id).unwrap().remaining_time, 1_000);
        }

        it "hands out unique ids" {
            let a = ledger.start_task("A", None).unwrap();
            let b = ledger.start_task("A", None).unwrap();
            assert_ne!(a, b);
        }
    }

    describe "update_progress" {
        it "extrapolates the remaining time from elapsed time" {
            let id = ledger.start_task("T", Some(1_000)).unwrap();
            clock.advance(Duration::from_millis(250));

            ledger.update_progress(id, 25.0).expect("Update failed");

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.elapsed_time, 250);
            assert_eq!(task.remaining_time, 750);
            assert_eq!(task.status, ProgressStatus::Running);
        }

        it "keeps the previous estimate at zero percent" {
            let id = ledger.start_task("T", Some(1_000)).unwrap();
            clock.advance(Duration::from_millis(100));

            ledger.update_progress(id, 0.0).unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.elapsed_time, 100);
            assert_eq!(task.remaining_time, 1_000);
        }

        it "completes the task at 100 percent" {
            let id = ledger.start_task("T", Some(5_000)).unwrap();
            clock.advance(Duration::from_millis(10));

            ledger.update_progress(id, 100.0).unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.status, ProgressStatus::Success);
            assert_eq!(task.remaining_time, 0);
        }

        it "clamps out-of-range percentages" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.update_progress(id, -20.0).unwrap();
            assert_eq!(ledger.get_task(id).unwrap().percentage, 0.0);

            ledger.update_progress(id, 250.0).unwrap();
            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.percentage, 100.0);
            assert_eq!(task.status, ProgressStatus::Success);
        }

        it "allows the percentage to go down" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.update_progress(id, 60.0).unwrap();
            ledger.update_progress(id, 40.0).unwrap();
            assert_eq!(ledger.get_task(id).unwrap().percentage, 40.0);
        }

        it "rejects unknown ids" {
            let err = ledger.update_progress(Uuid::new_v4(), 10.0).unwrap_err();
            assert!(matches!(err, CoreError::TaskNotFound(_)));
        }

        it "rejects updates to finished tasks" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.error_task(id, "broken").unwrap();

            let err = ledger.update_progress(id, 50.0).unwrap_err();
            assert!(matches!(err, CoreError::TaskFinished { status: ProgressStatus::Error, .. }));
            assert!(err.is_task_not_found());
            assert_eq!(ledger.get_task(id).unwrap().percentage, 0.0);
        }
    }

    describe "record_progress" {
        it "stays running at 100 percent" {
            let id = ledger.start_task("T", Some(5_000)).unwrap();
            clock.advance(Duration::from_millis(10));

            ledger.record_progress(id, 100.0).unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.status, ProgressStatus::Running);
            assert_eq!(task.percentage, 100.0);
            assert_eq!(task.remaining_time, 0);
        }

        it "lets an explicit error finish a task at 100 percent" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.record_progress(id, 100.0).unwrap();

            ledger.error_task(id, "late failure").unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.status, ProgressStatus::Error);
            assert_eq!(task.error_message.as_deref(), Some("late failure"));
        }

        it "rejects finished tasks" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.complete_task(id).unwrap();

            assert!(matches!(
                ledger.record_progress(id, 50.0),
                Err(CoreError::TaskFinished { status: ProgressStatus::Success, .. })
            ));
        }
    }

    describe "complete_task" {
        it "forces success at 100 percent" {
            let id = ledger.start_task("T", Some(900)).unwrap();
            ledger.update_progress(id, 30.0).unwrap();

            ledger.complete_task(id).unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.percentage, 100.0);
            assert_eq!(task.status, ProgressStatus::Success);
            assert_eq!(task.remaining_time, 0);
        }

        it "does not overwrite an error" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.error_task(id, "boom").unwrap();
            ledger.complete_task(id).unwrap();

            assert_eq!(ledger.get_task(id).unwrap().status, ProgressStatus::Error);
        }

        it "rejects unknown ids" {
            assert!(matches!(
                ledger.complete_task(Uuid::new_v4()),
                Err(CoreError::TaskNotFound(_))
            ));
        }
    }

    describe "error_task" {
        it "stores the message and keeps the percentage" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.update_progress(id, 35.0).unwrap();

            ledger.error_task(id, "disk full").unwrap();

            let task = ledger.get_task(id).unwrap();
            assert_eq!(task.status, ProgressStatus::Error);
            assert_eq!(task.error_message.as_deref(), Some("disk full"));
            assert_eq!(task.percentage, 35.0);
        }

        it "rejects unknown ids" {
            assert!(matches!(
                ledger.error_task(Uuid::new_v4(), "x"),
                Err(CoreError::TaskNotFound(_))
            ));
        }
    }

    describe "queries" {
        it "lists tasks in start order and filters running ones" {
            let a = ledger.start_task("A", None).unwrap();
            let b = ledger.start_task("B", None).unwrap();
            ledger.complete_task(a).unwrap();

            let titles: Vec<String> = ledger.get_tasks().into_iter().map(|t| t.title).collect();
            assert_eq!(titles, vec!["A", "B"]);

            let running = ledger.get_running_tasks();
            assert_eq!(running.len(), 1);
            assert_eq!(running[0].id, b);
        }

        it "returns None for unknown ids" {
            assert!(ledger.get_task(Uuid::new_v4()).is_none());
        }
    }

    describe "remove_task" {
        it "removes finished tasks" {
            let id = ledger.start_task("T", None).unwrap();
            ledger.complete_task(id).unwrap();

            assert!(ledger.remove_task(id).unwrap());
            assert!(ledger.get_task(id).is_none());
        }

        it "skips running tasks" {
            let id = ledger.start_task("T", None).unwrap();

            assert!(!ledger.remove_task(id).unwrap());
            assert!(ledger.get_task(id).is_some());
        }

        it "ignores unknown ids" {
            assert!(!ledger.remove_task(Uuid::new_v4()).unwrap());
        }
    }

    describe "cleanup" {
        it "removes every finished task and keeps running ones" {
            let done = ledger.start_task("done", None).unwrap();
            let failed = ledger.start_task("failed", None).unwrap();
            let running = ledger.start_task("running", None).unwrap();
            ledger.complete_task(done).unwrap();
            ledger.error_task(failed, "x").unwrap();

            assert_eq!(ledger.cleanup().unwrap(), 2);

            let remaining = ledger.get_tasks();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].id, running);
        }
    }

    describe "lifecycle" {
        it "rejects mutations after shutdown but still answers queries" {
            let id = ledger.start_task("T", None).unwrap();
            block_on(ledger.shutdown()).unwrap();

            assert!(matches!(
                ledger.update_progress(id, 10.0),
                Err(CoreError::NotInitialized { .. })
            ));
            assert!(ledger.get_task(id).is_some());
        }
    }

    describe "null ledger" {
        it "hands out ids without remembering tasks" {
            let null = NullProgressLedger;
            let id = null.start_task("T", None).unwrap();

            assert!(null.update_progress(id, 50.0).is_ok());
            assert!(null.get_task(id).is_none());
            assert!(null.get_tasks().is_empty());
            assert_eq!(null.cleanup().unwrap(), 0);
        }
    }
}
