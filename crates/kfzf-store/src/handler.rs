use crate::error::Result;
use crate::resource::Resource;
use crate::store::{Store, WriteOutcome};
use kfzf_core::{DeleteTarget, RawObject, WatchEvent};

/// Object-safe view of a [`Store`] as the receiver of one kind's watch events.
///
/// Lets integration code hold stores of different resource kinds side by side.
pub trait ResourceEventHandler: Send {
    fn resource_name(&self) -> &str;

    fn on_list(&mut self, objects: &[RawObject]) -> Result<WriteOutcome>;

    fn on_add(&mut self, object: &RawObject) -> Result<WriteOutcome>;

    fn on_update(&mut self, old: &RawObject, new: &RawObject) -> Result<WriteOutcome>;

    fn on_delete(&mut self, target: &DeleteTarget) -> Result<WriteOutcome>;

    /// Forces a full dump so the file matches the cache.
    fn flush(&mut self) -> Result<WriteOutcome>;

    /// Dispatches `event` to the matching callback. The event's kind is not checked.
    fn handle(&mut self, event: &WatchEvent) -> Result<WriteOutcome> {
        match event {
            WatchEvent::List { objects, .. } => self.on_list(objects),
            WatchEvent::Add { object, .. } => self.on_add(object),
            WatchEvent::Update { old, new, .. } => self.on_update(old, new),
            WatchEvent::Delete { target, .. } => self.on_delete(target),
        }
    }
}

impl<R: Resource> ResourceEventHandler for Store<R> {
    fn resource_name(&self) -> &str {
        R::NAME
    }

    fn on_list(&mut self, objects: &[RawObject]) -> Result<WriteOutcome> {
        self.replace_all(objects)
    }

    fn on_add(&mut self, object: &RawObject) -> Result<WriteOutcome> {
        self.insert(object)
    }

    fn on_update(&mut self, old: &RawObject, new: &RawObject) -> Result<WriteOutcome> {
        self.update(old, new)
    }

    fn on_delete(&mut self, target: &DeleteTarget) -> Result<WriteOutcome> {
        self.remove(target)
    }

    fn flush(&mut self) -> Result<WriteOutcome> {
        self.force_full_dump()
    }
}
