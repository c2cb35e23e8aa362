//! Concurrency stress tests
//!
//! These tests verify:
//! - Concurrent `get_logger` calls agree on one instance per name
//! - Per-thread diagnostic context stays isolated under load
//! - Records from one thread reach a sink in emission order
//! - Level changes racing with logging never tear state

use rust_diagnostic_logger::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const MESSAGES_PER_THREAD: usize = 500;

struct CountingSink {
    count: AtomicUsize,
}

impl Sink for CountingSink {
    fn deliver(&self, _record: Arc<LogRecord>) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_concurrent_get_logger_single_instance() {
    let registry = Arc::new(LoggerRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ["Shared", "Shared.Child", "Shared.Child.Leaf"]
                    .iter()
                    .map(|name| registry.get_logger(name).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<Arc<Logger>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for other in &results[1..] {
        for (a, b) in results[0].iter().zip(other) {
            assert!(Arc::ptr_eq(a, b), "two instances for {}", a.name());
        }
    }
    assert_eq!(registry.current_loggers().len(), 3);

    // Whatever the creation order, each logger ends up under its nearest ancestor
    let leaf = registry.get_logger("Shared.Child.Leaf").unwrap();
    assert_eq!(leaf.parent().unwrap().name(), "Shared.Child");
    assert_eq!(leaf.parent().unwrap().parent().unwrap().name(), "Shared");
}

#[test]
fn test_no_records_lost_under_contention() {
    let counter = Arc::new(CountingSink {
        count: AtomicUsize::new(0),
    });
    let registry = Arc::new(
        LoggerRegistry::builder()
            .shared_root_sink(counter.clone())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let log = registry.get_logger(&format!("worker.{}", t)).unwrap();
                for i in 0..MESSAGES_PER_THREAD {
                    log.info(format!("message {}", i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = THREADS * MESSAGES_PER_THREAD;
    assert_eq!(counter.count.load(Ordering::Relaxed), total);
    assert_eq!(registry.metrics().deliveries(), total as u64);
}

#[test]
fn test_thread_context_isolation_and_order() {
    let memory = Arc::new(MemorySink::new());
    let registry = Arc::new(
        LoggerRegistry::builder()
            .shared_root_sink(memory.clone())
            .build()
            .unwrap(),
    );
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let log = registry.get_logger("isolation").unwrap();
                mdc::set("thread", t.to_string());
                let _tag = ndc::push(format!("t{}", t));
                barrier.wait();

                for i in 0..MESSAGES_PER_THREAD {
                    let _step = ndc::push(format!("step{}", i));
                    log.info(format!("{}:{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut next_index: HashMap<String, usize> = HashMap::new();
    for record in memory.records() {
        let (thread_tag, index) = record.message.split_once(':').unwrap();
        let index: usize = index.parse().unwrap();

        // Context never leaks between threads
        assert_eq!(record.mdc_value("thread"), Some(thread_tag));
        assert_eq!(
            record.ndc,
            vec![format!("t{}", thread_tag), format!("step{}", index)]
        );

        // Per-thread emission order is preserved at the sink
        let expected = next_index.entry(thread_tag.to_string()).or_insert(0);
        assert_eq!(index, *expected);
        *expected += 1;
    }

    assert_eq!(next_index.len(), THREADS);
    assert!(next_index.values().all(|&n| n == MESSAGES_PER_THREAD));
}

#[test]
fn test_level_changes_race_with_logging() {
    let counter = Arc::new(CountingSink {
        count: AtomicUsize::new(0),
    });
    let registry = Arc::new(
        LoggerRegistry::builder()
            .shared_root_sink(counter.clone())
            .build()
            .unwrap(),
    );

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..MESSAGES_PER_THREAD {
                let level = if i % 2 == 0 { LogLevel::Error } else { LogLevel::Trace };
                registry.set_level("Race", level).unwrap();
            }
            registry.set_level("Race", LogLevel::Info).unwrap();
        })
    };

    let loggers: Vec<_> = (0..THREADS / 2)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let log = registry.get_logger(&format!("Race.Reader{}", t)).unwrap();
                for _ in 0..MESSAGES_PER_THREAD {
                    log.debug("maybe");
                    log.error("always");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for handle in loggers {
        handle.join().unwrap();
    }

    let errors = (THREADS / 2) * MESSAGES_PER_THREAD;
    let delivered = counter.count.load(Ordering::Relaxed);
    assert!(delivered >= errors);
    assert!(delivered <= errors * 2);

    for t in 0..THREADS / 2 {
        let log = registry.get_logger(&format!("Race.Reader{}", t)).unwrap();
        assert_eq!(log.effective_level(), LogLevel::Info);
    }
}
