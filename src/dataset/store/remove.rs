use super::{Anchor, Dataset};
use crate::filter::{Filter, Reach};
use crate::item::DataItem;

impl Dataset {
    /// Soft-removes the reachable items matching `filter`.
    ///
    /// Removed items stay in the store as dirty (items added locally become
    /// ignored instead) and drop out of the default views. A removed current
    /// item hands the cursor to the reachable item now at its position, or to
    /// the last one. Returns the number of removed items.
    pub fn remove(&mut self, filter: &Filter) -> usize {
        if self.is_empty() {
            return 0;
        }
        let removed = self.positions(filter, Reach::Reachable);
        if removed.is_empty() {
            return 0;
        }

        let mut state = self.snapshot();
        let current = self.current_position();
        let current_at =
            current.and_then(|pos| self.reachable_positions().iter().position(|&p| p == pos));

        for &pos in &removed {
            let item = &mut self.items[pos];
            item.set_state(item.state().removed());
        }

        if let (Some(pos), Some(at)) = (current, current_at) {
            if removed.contains(&pos) {
                let rest = self.reachable_positions();
                state.current = rest
                    .get(at.min(rest.len().saturating_sub(1)))
                    .map(|&p| Anchor::Key(self.items[p].key().clone()));
            }
        }

        self.notify_remove(&removed);
        self.apply_state(Some(state));
        removed.len()
    }

    /// Physically deletes every item matching `filter`, reachable or not.
    ///
    /// Erased items leave no trace: they are gone from every query and from the
    /// dirty aggregate. A current item that is erased hands the cursor to the
    /// next reachable item after it, or the last reachable one before it.
    /// Returns the erased items.
    pub fn erase(&mut self, filter: &Filter) -> Vec<DataItem> {
        let targets = self.positions(filter, Reach::Any);
        if targets.is_empty() {
            return Vec::new();
        }

        let mut state = self.snapshot();
        if let Some(current) = self.current_position() {
            if targets.contains(&current) {
                let survivor = |pos: &usize| !targets.contains(pos);
                let next = self
                    .reachable_positions()
                    .into_iter()
                    .filter(survivor)
                    .find(|&pos| pos > current)
                    .or_else(|| {
                        self.reachable_positions()
                            .into_iter()
                            .filter(survivor)
                            .last()
                    });
                state.current = next.map(|pos| Anchor::Key(self.items[pos].key().clone()));
            }
        }

        let mut erased = Vec::with_capacity(targets.len());
        let mut kept = Vec::with_capacity(self.items.len() - targets.len());
        for (pos, item) in std::mem::take(&mut self.items).into_iter().enumerate() {
            if targets.contains(&pos) {
                erased.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        self.reindex();

        self.notify_erase(&erased);
        self.apply_state(Some(state));
        erased
    }
}
