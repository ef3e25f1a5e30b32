//! # Change Notifications
//!
//! A [`crate::Dataset`] reports every state transition to one
//! [`DatasetObserver`], inline, before the triggering call returns. Every
//! method has a default that logs the event at `trace` level, so an observer
//! only implements the notifications it cares about.
//!
//! ## Ordering
//!
//! Within one store call notifications fire in a fixed order, skipping those
//! that do not apply:
//!
//! 1. the operation's own event (`on_append`, `on_modify`, `on_remove`, ...)
//! 2. `on_dataset_change`
//! 3. `on_current_change`
//! 4. `on_selection_change`
//! 5. `on_dirty_state_change`, only when the aggregate flipped
//!
//! Observers receive shared references. Mutating the store from inside a
//! callback is not supported; the borrow checker rejects it for plain
//! references and a shared-ownership wrapper would see a half-applied call.

use crate::item::DataItem;
use crate::store::Dataset;
use tracing::trace;

const TARGET: &str = "dataset";

pub trait DatasetObserver {
    /// The collection was (re)loaded or its layout changed.
    fn on_dataset_change(&self, dataset: &Dataset) {
        trace!(target: TARGET, len = dataset.len(), "Dataset changed");
    }

    fn on_current_change(&self, current: Option<&DataItem>) {
        trace!(target: TARGET, current = ?current.map(|item| item.key()), "Current changed");
    }

    fn on_selection_change(&self, selected: &[&DataItem]) {
        trace!(target: TARGET, count = selected.len(), "Selection changed");
    }

    fn on_append(&self, appended: &[&DataItem]) {
        trace!(target: TARGET, count = appended.len(), "Data appended");
    }

    /// `changed` names the properties whose values differ after the edit.
    fn on_modify(&self, changed: &[String], item: &DataItem, is_current: bool) {
        trace!(
            target: TARGET,
            key = %item.key(),
            ?changed,
            is_current,
            "Data modified"
        );
    }

    /// An edit was rejected by value parsing and left the record unchanged.
    ///
    /// Renderers use this to restore the displayed value.
    fn on_modify_rejected(&self, item: &DataItem, is_current: bool) {
        trace!(target: TARGET, key = %item.key(), is_current, "Modification rejected");
    }

    fn on_replace(&self, replaced: &[&DataItem]) {
        trace!(target: TARGET, count = replaced.len(), "Data replaced");
    }

    fn on_remove(&self, removed: &[&DataItem]) {
        trace!(target: TARGET, count = removed.len(), "Data removed");
    }

    /// Erased items are no longer held by the store and are handed over by value.
    fn on_erase(&self, erased: &[DataItem]) {
        trace!(target: TARGET, count = erased.len(), "Data erased");
    }

    fn on_dirty_state_change(&self, dirty: bool) {
        trace!(target: TARGET, dirty, "Dirty state changed");
    }
}

/// Observer that only logs, used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl DatasetObserver for LoggingObserver {}
