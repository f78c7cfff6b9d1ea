use crate::config::{scratch_path_for, StoreConfig};
use crate::error::{Result, StoreError};
use crate::resource::Resource;
use crate::scheduler::DumpScheduler;
use crate::writer::{self, StagedDump};
use kfzf_core::{DeleteTarget, RawObject, ResourceKey};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Which write strategy (if any) a mutation ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The destination was atomically replaced with a full dump.
    FullDump,
    /// A full dump was requested but dropped by the throttle.
    Throttled,
    /// One line was appended to the destination.
    Appended,
    /// The update did not change the record; nothing was written.
    Unchanged,
    /// The object could not be resolved to an identity; nothing was done.
    Ignored,
}

/// In-memory cache of one resource kind, mirrored to a line-oriented dump file.
///
/// The cache is authoritative: write failures are returned to the caller but
/// never roll back or corrupt the in-memory state. The destination file is
/// only ever replaced through an atomic rename, so readers always see a
/// complete dump.
///
/// A store expects a serial stream of calls; wrap it in a lock before sharing
/// it across threads.
pub struct Store<R: Resource> {
    data: HashMap<ResourceKey, R>,
    dest: PathBuf,
    scratch: PathBuf,
    /// Handle receiving appends. Before the first write it points at the scratch
    /// file; afterwards it always refers to the file at `dest`.
    current: Option<File>,
    scheduler: DumpScheduler,
    has_written: bool,
}

impl<R: Resource> Store<R> {
    /// Creates the cluster directory and the initial scratch file.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let dest_dir = config.dest_dir();
        std::fs::create_dir_all(&dest_dir).map_err(|source| StoreError::CreateDir {
            path: dest_dir.clone(),
            source,
        })?;

        let dest = config.dest_path(R::NAME);
        let scratch = scratch_path_for(&dest);
        let current = writer::open_scratch(&scratch)?;

        tracing::debug!(
            target = "kfzf.store",
            resource = R::NAME,
            dest = %dest.display(),
            interval_ms = config.time_between_full_dump.as_millis() as u64,
            "opened store"
        );

        Ok(Self {
            data: HashMap::new(),
            dest,
            scratch,
            current: Some(current),
            scheduler: DumpScheduler::new(config.time_between_full_dump),
            has_written: false,
        })
    }

    pub fn resource_name(&self) -> &'static str {
        R::NAME
    }

    pub fn dest_path(&self) -> &Path {
        &self.dest
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&R> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.data.contains_key(key)
    }

    /// Whether anything (header included) has been written to the destination yet.
    pub fn has_written(&self) -> bool {
        self.has_written
    }

    pub fn last_full_dump(&self) -> Option<Instant> {
        self.scheduler.last_full_dump()
    }

    /// Rendered lines for the current cache contents, in no particular order.
    pub fn rendered_lines(&self) -> Vec<String> {
        self.data.values().map(Resource::render).collect()
    }

    /// Discards the cache and rebuilds it from `objects` (a full resync), then
    /// requests a full dump.
    pub fn replace_all(&mut self, objects: &[RawObject]) -> Result<WriteOutcome> {
        let mut data = HashMap::with_capacity(objects.len());
        for obj in objects {
            let Some(key) = ResourceKey::from_meta(&obj.metadata) else {
                tracing::debug!(
                    target = "kfzf.store",
                    resource = R::NAME,
                    "skipping listed object without a name"
                );
                continue;
            };
            data.insert(key, R::from_raw(obj));
        }
        self.data = data;
        self.dump_full_state()
    }

    /// Inserts (or overwrites) one object and appends its line to the dump.
    pub fn insert(&mut self, obj: &RawObject) -> Result<WriteOutcome> {
        let Some(key) = ResourceKey::from_meta(&obj.metadata) else {
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                "ignoring added object without a name"
            );
            return Ok(WriteOutcome::Ignored);
        };

        let record = R::from_raw(obj);
        let line = record.render();
        tracing::trace!(target = "kfzf.store", resource = R::NAME, %key, "added");
        self.data.insert(key, record);

        self.append(&line)?;
        Ok(WriteOutcome::Appended)
    }

    /// Removes the identity `target` resolves to and requests a full dump.
    ///
    /// Unresolvable targets are logged and ignored without any I/O.
    pub fn remove(&mut self, target: &DeleteTarget) -> Result<WriteOutcome> {
        let Some(key) = target.resource_key() else {
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                ?target,
                "unknown delete target"
            );
            return Ok(WriteOutcome::Ignored);
        };

        if self.data.remove(&key).is_some() {
            tracing::trace!(target = "kfzf.store", resource = R::NAME, %key, "deleted");
        } else {
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                %key,
                "deleted object was not cached"
            );
        }

        self.dump_full_state()
    }

    /// Replaces the cached record for `new` if the adapter reports a change, then
    /// requests a full dump. Unchanged updates do no I/O.
    pub fn update(&mut self, old: &RawObject, new: &RawObject) -> Result<WriteOutcome> {
        let Some(key) = ResourceKey::from_meta(&new.metadata)
            .or_else(|| ResourceKey::from_meta(&old.metadata))
        else {
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                "ignoring updated object without a name"
            );
            return Ok(WriteOutcome::Ignored);
        };

        let candidate = R::from_raw(new);
        let changed = match self.data.get(&key) {
            Some(previous) => candidate.has_changed(previous),
            None => true,
        };
        if !changed {
            return Ok(WriteOutcome::Unchanged);
        }

        tracing::trace!(target = "kfzf.store", resource = R::NAME, %key, "changed");
        self.data.insert(key, candidate);
        self.dump_full_state()
    }

    /// Rewrites the whole dump unless the last rewrite is more recent than the
    /// configured interval. A throttled request is dropped, not deferred.
    pub fn dump_full_state(&mut self) -> Result<WriteOutcome> {
        let now = Instant::now();
        if !self.scheduler.try_acquire(now) {
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                since_last = ?self.scheduler.elapsed_since_last(now),
                "last full dump too recent, ignoring it"
            );
            return Ok(WriteOutcome::Throttled);
        }
        self.write_full_dump()
    }

    /// Rewrites the whole dump regardless of the throttle.
    pub fn force_full_dump(&mut self) -> Result<WriteOutcome> {
        self.scheduler.record(Instant::now());
        self.write_full_dump()
    }

    fn write_full_dump(&mut self) -> Result<WriteOutcome> {
        tracing::debug!(
            target = "kfzf.store",
            resource = R::NAME,
            entries = self.data.len(),
            "doing full dump"
        );

        let staged = StagedDump::stage(
            &self.scratch,
            R::HEADER,
            self.data.values().map(Resource::render),
        )?;
        let file = staged.commit(&self.dest, &mut self.current)?;
        self.current = Some(file);
        self.has_written = true;
        Ok(WriteOutcome::FullDump)
    }

    fn append(&mut self, line: &str) -> Result<()> {
        if !self.has_written {
            let file = match self.current.take() {
                Some(file) => file,
                None => writer::open_scratch(&self.scratch)?,
            };
            let file = self.current.insert(file);
            writer::bootstrap(file, &self.scratch, &self.dest, R::HEADER)?;
            self.has_written = true;
            tracing::debug!(
                target = "kfzf.store",
                resource = R::NAME,
                dest = %self.dest.display(),
                "created dump file"
            );
        }

        let file = match self.current.take() {
            Some(file) => file,
            None => writer::reopen_dest(&self.dest)?,
        };
        let file = self.current.insert(file);
        writer::append_line(file, &self.dest, line)
    }
}

impl<R: Resource> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("resource", &R::NAME)
            .field("entries", &self.data.len())
            .field("dest", &self.dest)
            .field("has_written", &self.has_written)
            .field("time_between_full_dump", &self.scheduler.min_interval())
            .field("last_full_dump", &self.scheduler.last_full_dump())
            .finish()
    }
}
