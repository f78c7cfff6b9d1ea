//! Feeds a JSON-lines stream of watch events into per-kind dump stores.
//!
//! Every watched kind gets its own worker thread owning that kind's store, so
//! kinds are written concurrently while each store still sees one serial
//! stream of events.

use anyhow::{bail, Context, Result};
use crossbeam_channel as channel;
use kfzf_core::WatchEvent;
use kfzf_resources::ResourceKind;
use kfzf_store::{ResourceEventHandler, StoreConfig};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::thread::JoinHandle;

/// Events buffered per worker before the reader blocks.
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// What one worker did before it shut down.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub events: usize,
    pub write_errors: usize,
    /// Whether the forced dump at end of input reached the disk.
    pub converged: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub malformed: usize,
    pub unwatched: usize,
    /// Events for a watched kind whose worker had already stopped.
    pub dropped: usize,
    pub workers: BTreeMap<ResourceKind, WorkerReport>,
}

/// Where [`Dispatcher::dispatch`] sent an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    /// No worker is running for the event's kind.
    Unwatched,
    /// The kind's worker has stopped; the event was discarded.
    Dropped,
}

struct Worker {
    sender: channel::Sender<WatchEvent>,
    handle: JoinHandle<WorkerReport>,
}

/// Routes watch events to the worker of their resource kind.
pub struct Dispatcher {
    workers: BTreeMap<ResourceKind, Worker>,
}

impl Dispatcher {
    /// Opens a store and starts a worker for each kind.
    ///
    /// A kind whose store cannot be opened is logged and skipped. Fails only
    /// when no kind could be started.
    pub fn open(kinds: &[ResourceKind], config: &StoreConfig) -> Result<Self> {
        if kinds.is_empty() {
            bail!("no resource kinds to watch");
        }

        let mut workers = BTreeMap::new();
        for &kind in kinds {
            if workers.contains_key(&kind) {
                continue;
            }

            let store = match kind.open_store(config) {
                Ok(store) => store,
                Err(err) => {
                    tracing::error!(
                        target = "kfzf.watch",
                        kind = %kind,
                        error = %err,
                        "failed to open store; skipping kind"
                    );
                    continue;
                }
            };

            match spawn_worker(kind, store) {
                Ok(worker) => {
                    tracing::debug!(
                        target = "kfzf.watch",
                        kind = %kind,
                        path = %config.dest_path(kind.name()).display(),
                        "watching"
                    );
                    workers.insert(kind, worker);
                }
                Err(err) => tracing::error!(
                    target = "kfzf.watch",
                    kind = %kind,
                    error = %err,
                    "failed to spawn worker; skipping kind"
                ),
            }
        }

        if workers.is_empty() {
            bail!(
                "no resource store could be opened under {}",
                config.dest_dir().display()
            );
        }
        Ok(Self { workers })
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.workers.keys().copied()
    }

    /// Hands `event` to its kind's worker.
    pub fn dispatch(&self, event: WatchEvent) -> Dispatch {
        let Ok(kind) = event.kind().parse::<ResourceKind>() else {
            return Dispatch::Unwatched;
        };
        let Some(worker) = self.workers.get(&kind) else {
            return Dispatch::Unwatched;
        };
        match worker.sender.send(event) {
            Ok(()) => Dispatch::Sent,
            Err(_) => {
                tracing::error!(
                    target = "kfzf.watch",
                    kind = %kind,
                    "worker has stopped; dropping event"
                );
                Dispatch::Dropped
            }
        }
    }

    /// Closes every queue and waits for the workers' final dumps.
    pub fn finish(self) -> BTreeMap<ResourceKind, WorkerReport> {
        let (senders, handles): (Vec<_>, Vec<_>) = self
            .workers
            .into_iter()
            .map(|(kind, worker)| (worker.sender, (kind, worker.handle)))
            .unzip();
        drop(senders);

        let mut reports = BTreeMap::new();
        for (kind, handle) in handles {
            match handle.join() {
                Ok(report) => {
                    reports.insert(kind, report);
                }
                Err(_) => tracing::error!(target = "kfzf.watch", kind = %kind, "worker panicked"),
            }
        }
        reports
    }
}

fn spawn_worker(
    kind: ResourceKind,
    mut store: Box<dyn ResourceEventHandler>,
) -> std::io::Result<Worker> {
    let (sender, receiver) = channel::bounded::<WatchEvent>(EVENT_QUEUE_CAPACITY);
    let handle = std::thread::Builder::new()
        .name(format!("kfzf-{kind}"))
        .spawn(move || {
            let mut report = WorkerReport::default();
            for event in receiver.iter() {
                report.events += 1;
                match store.handle(&event) {
                    Ok(outcome) => tracing::trace!(
                        target = "kfzf.watch",
                        kind = %kind,
                        ?outcome,
                        "event applied"
                    ),
                    Err(err) => {
                        report.write_errors += 1;
                        tracing::warn!(
                            target = "kfzf.watch",
                            kind = %kind,
                            error = %err,
                            "failed to update dump"
                        );
                    }
                }
            }

            match store.flush() {
                Ok(_) => report.converged = true,
                Err(err) => {
                    report.write_errors += 1;
                    tracing::warn!(
                        target = "kfzf.watch",
                        kind = %kind,
                        error = %err,
                        "final dump failed; file may lag behind the cache"
                    );
                }
            }
            report
        })?;
    Ok(Worker { sender, handle })
}

/// Reads JSON-lines watch events from `input` until end of input.
///
/// Blank lines are ignored. Malformed lines and events for kinds that are not
/// watched are logged and skipped. Workers are always shut down, even when
/// reading fails.
pub fn run(input: impl BufRead, dispatcher: Dispatcher) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                dispatcher.finish();
                return Err(err).with_context(|| format!("failed to read input line {line_no}"));
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;

        let event: WatchEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                summary.malformed += 1;
                tracing::warn!(
                    target = "kfzf.watch",
                    line = line_no,
                    error = %err,
                    "skipping malformed event"
                );
                continue;
            }
        };

        let kind = event.kind().to_owned();
        match dispatcher.dispatch(event) {
            Dispatch::Sent => {}
            Dispatch::Unwatched => {
                summary.unwatched += 1;
                tracing::debug!(
                    target = "kfzf.watch",
                    line = line_no,
                    kind = %kind,
                    "skipping event for unwatched kind"
                );
            }
            Dispatch::Dropped => summary.dropped += 1,
        }
    }

    summary.workers = dispatcher.finish();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_kinds_share_one_worker() {
        let cache = TempDir::new().unwrap();
        let config = StoreConfig::new(cache.path(), "c");
        let dispatcher = Dispatcher::open(
            &[ResourceKind::Pods, ResourceKind::Pods, ResourceKind::Nodes],
            &config,
        )
        .unwrap();
        assert_eq!(
            dispatcher.kinds().collect::<Vec<_>>(),
            vec![ResourceKind::Nodes, ResourceKind::Pods]
        );
        dispatcher.finish();
    }

    #[test]
    fn summary_counts_each_line_once() {
        let cache = TempDir::new().unwrap();
        let config = StoreConfig::new(cache.path(), "c");
        let dispatcher = Dispatcher::open(&[ResourceKind::Pods], &config).unwrap();

        let input = concat!(
            "{\"type\":\"add\",\"kind\":\"pods\",\"object\":{\"metadata\":{\"name\":\"a\"}}}\n",
            "{\"type\":\"add\",\"kind\":\"Pod\",\"object\":{\"metadata\":{\"name\":\"b\"}}}\n",
            "{\"type\":\"add\",\"kind\":\"nodes\",\"object\":{\"metadata\":{\"name\":\"n\"}}}\n",
            "{broken\n",
            "\n",
        );
        let summary = run(input.as_bytes(), dispatcher).unwrap();

        assert_eq!(summary.lines, 4);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.unwatched, 1);
        assert_eq!(summary.dropped, 0);
        assert_eq!(
            summary.workers[&ResourceKind::Pods],
            WorkerReport {
                events: 2,
                write_errors: 0,
                converged: true,
            }
        );
    }

    #[test]
    fn events_for_a_stopped_worker_are_counted_as_dropped() {
        let (sender, receiver) = channel::bounded::<WatchEvent>(1);
        drop(receiver);
        let handle = std::thread::spawn(WorkerReport::default);
        let dispatcher = Dispatcher {
            workers: BTreeMap::from([(ResourceKind::Pods, Worker { sender, handle })]),
        };

        let input = concat!(
            "{\"type\":\"add\",\"kind\":\"pods\",\"object\":{\"metadata\":{\"name\":\"a\"}}}\n",
            "{\"type\":\"add\",\"kind\":\"nodes\",\"object\":{\"metadata\":{\"name\":\"n\"}}}\n",
        );
        let summary = run(input.as_bytes(), dispatcher).unwrap();

        assert_eq!(summary.lines, 2);
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.unwatched, 1);
        assert_eq!(summary.workers[&ResourceKind::Pods], WorkerReport::default());
    }

    #[test]
    fn empty_kind_list_is_an_error() {
        let cache = TempDir::new().unwrap();
        let config = StoreConfig::new(cache.path(), "c");
        assert!(Dispatcher::open(&[], &config).is_err());
    }
}
