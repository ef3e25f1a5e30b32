use super::Dataset;
use crate::error::Result;
use crate::filter::{Filter, Reach};
use crate::item::DataItem;
use crate::model::Record;

impl Dataset {
    /// The current item, if any.
    pub fn current(&self) -> Option<&DataItem> {
        self.current_position().map(|pos| &self.items[pos])
    }

    pub fn current_info(&self) -> Option<&Record> {
        self.current().and_then(DataItem::record)
    }

    /// Makes the only reachable item matching `filter` current.
    ///
    /// Observers hear about it only when the current item actually changed.
    pub fn set_current(&mut self, filter: &Filter) -> Result<()> {
        let pos = self.position_strict(filter, Reach::Reachable)?;
        self.focus(pos);
        Ok(())
    }

    /// Moves the cursor by `offset` reachable items, stopping at either end.
    ///
    /// Returns whether the current item changed.
    pub fn scroll(&mut self, offset: isize) -> bool {
        let reachable = self.reachable_positions();
        if offset == 0 || reachable.len() < 2 {
            return false;
        }

        let at = self
            .current_position()
            .and_then(|pos| reachable.iter().position(|&p| p == pos))
            .map_or(-1, |i| i as isize);
        let last = reachable.len() as isize - 1;
        let target = at.saturating_add(offset).clamp(0, last);

        match usize::try_from(target).ok().and_then(|i| reachable.get(i)) {
            Some(&pos) => self.focus(pos),
            None => false,
        }
    }

    pub(crate) fn current_position(&self) -> Option<usize> {
        self.current
            .as_ref()
            .and_then(|key| self.position_of(key))
            .filter(|&pos| !self.items[pos].is_unreachable())
    }

    /// Points the cursor at `pos`, notifying on change.
    fn focus(&mut self, pos: usize) -> bool {
        if self.current_position() == Some(pos) {
            return false;
        }
        self.current = Some(self.items[pos].key().clone());
        self.notify_current();
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::Filter;
    use crate::fixtures::{numbered, Event};
    use crate::model::Key;
    use crate::DatasetError;

    #[test]
    fn set_current_notifies_on_change_only() {
        let (mut dataset, recorder) = numbered(3);
        recorder.clear();

        dataset.set_current(&Filter::id(2)).unwrap();
        dataset.set_current(&Filter::id(2)).unwrap();

        assert_eq!(recorder.events(), vec![Event::Current(Some(Key::from(2)))]);
        assert_eq!(dataset.current_info().unwrap()["name"], "n2");
    }

    #[test]
    fn set_current_is_strict() {
        let (mut dataset, _) = numbered(3);
        assert!(matches!(
            dataset.set_current(&Filter::id(7)),
            Err(DatasetError::NotFound(_))
        ));
        assert!(matches!(
            dataset.set_current(&Filter::all()),
            Err(DatasetError::Ambiguous { .. })
        ));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(1));
    }

    #[test]
    fn set_current_ignores_removed_items() {
        let (mut dataset, _) = numbered(3);
        dataset.remove(&Filter::id(2));
        assert!(dataset.set_current(&Filter::id(2)).is_err());
    }

    #[test]
    fn scroll_clamps_at_both_ends() {
        let (mut dataset, recorder) = numbered(3);
        recorder.clear();

        assert!(!dataset.scroll(-1));
        assert!(dataset.scroll(5));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(3));
        assert!(!dataset.scroll(1));
        assert!(dataset.scroll(-1));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(2));

        assert_eq!(
            recorder.events(),
            vec![
                Event::Current(Some(Key::from(3))),
                Event::Current(Some(Key::from(2))),
            ]
        );
    }

    #[test]
    fn scroll_saturates_on_extreme_offsets() {
        let (mut dataset, _) = numbered(3);
        dataset.set_current(&Filter::id(2)).unwrap();

        assert!(dataset.scroll(isize::MAX));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(3));
        assert!(dataset.scroll(isize::MIN));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(1));

        dataset.current = None;
        assert!(dataset.scroll(isize::MIN));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(1));
    }

    #[test]
    fn scroll_skips_unreachable_items() {
        let (mut dataset, _) = numbered(4);
        dataset.remove(&Filter::ids([2, 3]));
        dataset.set_current(&Filter::id(1)).unwrap();

        assert!(dataset.scroll(1));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(4));
    }

    #[test]
    fn scroll_needs_two_items() {
        let (mut dataset, _) = numbered(1);
        assert!(!dataset.scroll(1));
        assert!(!dataset.scroll(0));
        assert_eq!(dataset.current().unwrap().key(), &Key::from(1));
    }
}
