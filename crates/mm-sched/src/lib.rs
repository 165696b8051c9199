//! Concurrent build execution (component C5): drives the dirty rules of a
//! [`RuleGraph`] through a bounded worker-thread pool, grounded on the
//! original `ThreadPool`/`Environment::compile` pump (mutex-guarded ready
//! queue, atomic completion counters, bail out on first failure).

pub mod progress;
pub mod sink;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

pub use sink::RealTaskSink;

use mm_core::{mm_error, mm_info};
use mm_core::{BuildError, BuildResult, RuleGraph, RuleId, TaskSink};

/// What happened after a [`run`] call: how many dirty rules actually ran,
/// and which dirty rules never got a chance to (because of a bailout).
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub executed: usize,
    pub never_built: Vec<RuleId>,
}

struct Shared<'a> {
    graph: &'a RuleGraph,
    sink: &'a (dyn TaskSink + Sync),
    waiting: Vec<AtomicUsize>,
    queue: Mutex<VecDeque<RuleId>>,
    not_empty: Condvar,
    total: usize,
    completed: AtomicUsize,
    bailout: AtomicBool,
    error: Mutex<Option<BuildError>>,
    verbose: bool,
    /// Last integer percent printed to stdout (spec §5: progress output is
    /// rate-limited to changes in integer percent, not one line per rule).
    last_percent: AtomicUsize,
}

impl Shared<'_> {
    fn done(&self) -> bool {
        self.bailout.load(Ordering::SeqCst) || self.completed.load(Ordering::SeqCst) >= self.total
    }

    fn notify_subscribers(&self, id: RuleId) {
        for &sub in &self.graph.get(id).subscribers {
            if !self.graph.get(sub).dirty {
                continue;
            }
            let prev = self.waiting[sub.0].fetch_sub(1, Ordering::SeqCst);
            if prev == 1 {
                self.queue.lock().unwrap().push_back(sub);
                self.not_empty.notify_all();
            }
        }
    }
}

fn worker_loop(shared: &Shared<'_>) {
    loop {
        let id = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(id) = queue.pop_front() {
                    break Some(id);
                }
                if shared.done() {
                    break None;
                }
                queue = shared.not_empty.wait(queue).unwrap();
            }
        };

        let Some(id) = id else { break };

        match shared.sink.run(shared.graph, id) {
            Ok(()) => {
                let done = shared.completed.fetch_add(1, Ordering::SeqCst) + 1;
                mm_info!(sched, rule = shared.graph.get(id).target.as_str(), progress = done, total = shared.total, "rule finished");
                if !shared.verbose {
                    let percent = done * 100 / shared.total;
                    let previous = shared.last_percent.swap(percent, Ordering::SeqCst);
                    if percent != previous {
                        print!("{}", progress::render_progress_bar(done, shared.total));
                    }
                }
                shared.notify_subscribers(id);
                if done >= shared.total {
                    shared.not_empty.notify_all();
                }
            }
            Err(e) => {
                mm_error!(sched, rule = shared.graph.get(id).target.as_str(), error = %e, "rule failed, bailing out");
                *shared.error.lock().unwrap() = Some(e);
                shared.bailout.store(true, Ordering::SeqCst);
                shared.not_empty.notify_all();
            }
        }
    }
}

/// Run every dirty rule in `graph` to completion (or until the first
/// failure), using up to `thread_count` worker threads.
pub fn run(graph: &RuleGraph, sink: &(dyn TaskSink + Sync), thread_count: usize, verbose: bool) -> BuildResult<RunOutcome> {
    let mut waiting = Vec::with_capacity(graph.len());
    let mut initial = VecDeque::new();
    let mut total = 0;

    for id in graph.ids() {
        let rule = graph.get(id);
        if !rule.dirty {
            waiting.push(AtomicUsize::new(0));
            continue;
        }
        total += 1;
        let dirty_deps = rule.deps.iter().filter(|&&d| graph.get(d).dirty).count();
        waiting.push(AtomicUsize::new(dirty_deps));
        if dirty_deps == 0 {
            initial.push_back(id);
        }
    }

    let shared = Shared {
        graph,
        sink,
        waiting,
        queue: Mutex::new(initial),
        not_empty: Condvar::new(),
        total,
        completed: AtomicUsize::new(0),
        bailout: AtomicBool::new(false),
        error: Mutex::new(None),
        verbose,
        last_percent: AtomicUsize::new(usize::MAX),
    };

    if total == 0 {
        return Ok(RunOutcome::default());
    }

    let worker_count = thread_count.max(1).min(total);
    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| worker_loop(&shared));
        }
    });

    if !verbose {
        println!();
    }

    if let Some(err) = shared.error.into_inner().unwrap() {
        let never_built: Vec<RuleId> = graph
            .ids()
            .filter(|&id| graph.get(id).dirty && shared.waiting[id.0].load(Ordering::SeqCst) > 0)
            .collect();
        for id in &never_built {
            mm_error!(sched, rule = graph.get(*id).target.as_str(), "file was never built");
        }
        return Err(err);
    }

    Ok(RunOutcome {
        executed: shared.completed.load(Ordering::SeqCst),
        never_built: Vec::new(),
    })
}
