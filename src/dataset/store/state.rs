use super::Dataset;
use crate::model::{Key, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Points at one record across a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Key(Key),
    /// Property values the record is found by.
    Properties(Record),
}

/// Current item and selection of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetState {
    pub current: Option<Anchor>,
    pub selected: Vec<Anchor>,
}

impl Dataset {
    /// Snapshot of the current item and selection that survives a reload.
    ///
    /// Under derived identity records are anchored by key. Surrogate keys are
    /// not reproducible, so records are anchored by the configured state keys
    /// when there are any.
    pub fn get_state(&self) -> DatasetState {
        if self.identity.is_derived() || self.state_keys.is_empty() {
            return self.snapshot();
        }
        let anchor = |pos: usize| Anchor::Properties(self.items[pos].properties(&self.state_keys));
        DatasetState {
            current: self.current_position().map(anchor),
            selected: self.selected_positions().into_iter().map(anchor).collect(),
        }
    }

    /// Restores a snapshot taken by [`Dataset::get_state`].
    ///
    /// An anchor that no longer resolves is dropped; a missing current item falls
    /// back to the first reachable item. Selection becomes exactly the resolved set.
    pub fn set_state(&mut self, state: DatasetState) {
        self.apply_state(Some(state));
    }

    /// Key-anchored snapshot, valid while the items stay in the store.
    pub(crate) fn snapshot(&self) -> DatasetState {
        let anchor = |pos: usize| Anchor::Key(self.items[pos].key().clone());
        DatasetState {
            current: self.current_position().map(anchor),
            selected: self.selected_positions().into_iter().map(anchor).collect(),
        }
    }

    /// Reapplies `state` (or the present one) and announces the result:
    /// dataset, current, selection, then the dirty flag when it flipped.
    pub(crate) fn apply_state(&mut self, state: Option<DatasetState>) {
        self.notify_dataset();

        if self.is_empty() {
            self.current = None;
        } else {
            let state = state.unwrap_or_else(|| self.snapshot());
            let current = state
                .current
                .as_ref()
                .and_then(|anchor| self.resolve(anchor))
                .or_else(|| self.reachable_positions().first().copied());
            self.current = current.map(|pos| self.items[pos].key().clone());

            let selected: HashSet<usize> = state
                .selected
                .iter()
                .filter_map(|anchor| self.resolve(anchor))
                .collect();
            for (pos, item) in self.items.iter_mut().enumerate() {
                item.select(selected.contains(&pos));
            }
        }

        self.notify_current();
        self.notify_selection();
        self.refresh_dirty();
    }

    /// Position of the reachable item `anchor` points at.
    fn resolve(&self, anchor: &Anchor) -> Option<usize> {
        match anchor {
            Anchor::Key(key) => self
                .position_of(key)
                .filter(|&pos| !self.items[pos].is_unreachable()),
            Anchor::Properties(probe) => self
                .items
                .iter()
                .position(|item| !item.is_unreachable() && item.equal_properties(probe)),
        }
    }

    fn selected_positions(&self) -> Vec<usize> {
        self.reachable_positions()
            .into_iter()
            .filter(|&pos| self.items[pos].is_selected())
            .collect()
    }
}
