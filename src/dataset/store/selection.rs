use super::Dataset;
use crate::filter::{Filter, Reach};

impl Dataset {
    /// Selects or unselects the reachable items matching `filter`.
    ///
    /// Returns whether any selection flag changed; observers are notified only then.
    pub fn select(&mut self, filter: &Filter, selected: bool) -> bool {
        self.apply_selection(filter, selected, false)
    }

    /// Like [`Dataset::select`], notifying observers even when nothing changed.
    pub fn select_forced(&mut self, filter: &Filter, selected: bool) -> bool {
        self.apply_selection(filter, selected, true)
    }

    pub fn select_all(&mut self, selected: bool) -> bool {
        self.select(&Filter::all(), selected)
    }

    /// Flips the selection of the reachable items matching `filter`.
    ///
    /// Always notifies. Returns whether any of them is selected afterwards.
    pub fn toggle(&mut self, filter: &Filter) -> bool {
        let mut any_selected = false;
        for pos in self.positions(filter, Reach::Reachable) {
            any_selected |= self.items[pos].toggle();
        }
        self.notify_selection();
        any_selected
    }

    fn apply_selection(&mut self, filter: &Filter, selected: bool, force: bool) -> bool {
        let mut changed = false;
        for pos in self.positions(filter, Reach::Reachable) {
            changed |= self.items[pos].select(selected);
        }
        if changed || force {
            self.notify_selection();
        }
        changed
    }
}
