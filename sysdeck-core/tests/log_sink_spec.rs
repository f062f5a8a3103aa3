use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use speculate2::speculate;
use sysdeck_core::*;

speculate! {
    before {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sink = MemoryLogSink::with_clock(DEFAULT_MAX_LOG_ENTRIES, clock.clone());
    }

    describe "record" {
        it "assigns distinct ids to every entry" {
            sink.info("X", "a", None);
            sink.info("X", "a", None);

            let entries = sink.get_recent(10);
            assert_eq!(entries.len(), 2);
            assert_ne!(entries[0].id, entries[1].id);
        }

        it "keeps metadata attached to the entry" {
            let mut metadata = Metadata::new();
            metadata.insert("host".to_string(), serde_json::json!("db-1"));
            sink.warn("Network", "Host unreachable", Some(metadata));

            let entry = &sink.get_recent(1)[0];
            assert_eq!(entry.level, LogLevel::Warn);
            assert_eq!(entry.metadata.as_ref().unwrap()["host"], "db-1");
        }

        it "evicts the oldest entries once the bound is exceeded" {
            let total = DEFAULT_MAX_LOG_ENTRIES + 25;
            for i in 0..total {
                sink.info("X", &format!("message {}", i), None);
            }

            let entries = sink.get_recent(total);
            assert_eq!(entries.len(), DEFAULT_MAX_LOG_ENTRIES);
            assert_eq!(entries[0].message, "message 25");
            assert_eq!(entries.last().unwrap().message, format!("message {}", total - 1));
        }

        it "respects a custom bound" {
            let small = MemoryLogSink::with_max_size(3);
            for i in 0..5 {
                small.info("X", &i.to_string(), None);
            }

            let messages: Vec<String> = small.get_recent(10).into_iter().map(|e| e.message).collect();
            assert_eq!(messages, vec!["2", "3", "4"]);
        }
    }

    describe "get_recent" {
        it "returns the newest window oldest first" {
            for m in ["a", "b", "c", "d"] {
                sink.info("X", m, None);
            }

            let messages: Vec<String> = sink.get_recent(2).into_iter().map(|e| e.message).collect();
            assert_eq!(messages, vec!["c", "d"]);
        }

        it "returns nothing for a zero limit" {
            sink.info("X", "a", None);
            assert!(sink.get_recent(0).is_empty());
        }
    }

    describe "search" {
        it "matches keywords case-insensitively against message and source" {
            sink.info("Network", "Scan finished", None);
            sink.info("Assets", "Asset created", None);
            sink.info("Schedule", "nothing here", None);

            assert_eq!(sink.search("SCAN").len(), 1);
            assert_eq!(sink.search("network").len(), 1);
            assert_eq!(sink.search("asset").len(), 1);
        }

        it "combines structured predicates with AND" {
            sink.info("Network", "Host up", None);
            sink.warn("Network", "Host down", None);
            sink.warn("Assets", "Host field missing", None);

            let found = sink.search(LogFilter {
                source: Some("Network".to_string()),
                level: Some(LogLevel::Warn),
                keyword: Some("host".to_string()),
                ..LogFilter::default()
            });
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].message, "Host down");
        }

        it "filters by an inclusive date range" {
            sink.info("X", "early", None);
            clock.advance(Duration::from_secs(60));
            let middle = clock.now();
            sink.info("X", "middle", None);
            clock.advance(Duration::from_secs(60));
            sink.info("X", "late", None);

            let found = sink.search(LogFilter {
                start_date: Some(middle),
                end_date: Some(middle),
                ..LogFilter::default()
            });
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].message, "middle");
        }

        it "returns matches in insertion order" {
            sink.info("X", "job one", None);
            sink.info("Y", "other", None);
            sink.info("X", "job two", None);

            let messages: Vec<String> = sink.search("job").into_iter().map(|e| e.message).collect();
            assert_eq!(messages, vec!["job one", "job two"]);
        }
    }

    describe "get_by_manager" {
        it "filters by exact source and keeps the last entries" {
            sink.info("Network", "1", None);
            sink.info("NetworkExtra", "x", None);
            sink.info("Network", "2", None);
            sink.info("Network", "3", None);

            assert_eq!(sink.get_by_manager("Network", None).len(), 3);

            let messages: Vec<String> = sink
                .get_by_manager("Network", Some(2))
                .into_iter()
                .map(|e| e.message)
                .collect();
            assert_eq!(messages, vec!["2", "3"]);
        }
    }

    describe "clear" {
        it "removes every entry" {
            sink.info("X", "a", None);
            sink.error("X", "b", None);
            sink.clear();

            assert!(sink.is_empty());
            assert_eq!(sink.get_stats().total, 0);
        }
    }

    describe "get_stats" {
        it "counts entries per level and lists sources" {
            sink.record(LogLevel::Info, "X", "a", None);
            sink.record(LogLevel::Warn, "X", "b", None);

            let stats = sink.get_stats();
            assert_eq!(stats, LogStats {
                total: 2,
                by_level: LevelCounts { info: 1, warn: 1, error: 0 },
                managers: vec!["X".to_string()],
            });
        }

        it "lists sources in first-seen order" {
            sink.info("B", "1", None);
            sink.info("A", "2", None);
            sink.info("B", "3", None);

            assert_eq!(sink.get_stats().managers, vec!["B".to_string(), "A".to_string()]);
        }
    }

    describe "null sink" {
        it "accepts records without storing anything" {
            let null: Arc<dyn LogSink> = Arc::new(NullLogSink);
            null.error("X", "ignored", None);
            assert!(sink.is_empty());
        }
    }
}
