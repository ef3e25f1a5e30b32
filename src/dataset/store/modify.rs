use super::Dataset;
use crate::error::Result;
use crate::filter::{Filter, Reach};
use crate::format::InvalidValue;
use crate::item::DataItem;
use crate::model::{loose_eq, Record};
use serde_json::Value;
use tracing::warn;

impl Dataset {
    /// Runs `modifier` on the only reachable item matching `filter`.
    ///
    /// Properties whose values differ (loosely) afterwards are reported to
    /// observers and mark the item modified. When nothing changed but the
    /// modifier returned `Err(InvalidValue)`, observers get a rejection
    /// instead, so a renderer can restore the displayed value.
    ///
    /// Returns the names of the changed properties.
    pub fn modify<F>(&mut self, filter: &Filter, modifier: F) -> Result<Vec<String>>
    where
        F: FnOnce(&mut DataItem) -> std::result::Result<(), InvalidValue>,
    {
        let pos = self.position_strict(filter, Reach::Reachable)?;
        let is_current = self.current_position() == Some(pos);
        let before = self.items[pos].record().cloned().unwrap_or_default();

        let outcome = modifier(&mut self.items[pos]);

        let changed = match self.items[pos].record() {
            Some(after) => changed_properties(&before, after),
            None => Vec::new(),
        };
        if !changed.is_empty() {
            let item = &mut self.items[pos];
            item.set_state(item.state().modified());
            self.notify_modify(&changed, pos, is_current);
            self.refresh_dirty();
        } else if outcome.is_err() {
            self.notify_modify_rejected(pos, is_current);
        }
        Ok(changed)
    }

    /// Parses `raw` with the property's format and writes it to the matching item.
    pub fn set_value(
        &mut self,
        filter: &Filter,
        property: &str,
        raw: impl Into<Value>,
    ) -> Result<Vec<String>> {
        let raw = raw.into();
        self.modify(filter, |item| item.set_value(property, &raw).map(|_| ()))
    }

    /// [`Dataset::set_value`] on the current item. Without one, nothing happens.
    pub fn set_current_value(
        &mut self,
        property: &str,
        raw: impl Into<Value>,
    ) -> Result<Vec<String>> {
        let Some(key) = self.current().map(|item| item.key().clone()) else {
            warn!(target: "dataset", property, "Current item is missing");
            return Ok(Vec::new());
        };
        self.set_value(&Filter::Id(key), property, raw)
    }

    /// Formatted value of `property` on the first item matching `filter`.
    pub fn get_value(&self, filter: &Filter, property: &str) -> String {
        self.get_item(filter)
            .map(|item| item.get_value(property))
            .unwrap_or_default()
    }

    pub fn current_value(&self, property: &str) -> String {
        self.current()
            .map(|item| item.get_value(property))
            .unwrap_or_default()
    }
}

/// Properties whose values differ between `before` and `after`, including removed ones.
fn changed_properties(before: &Record, after: &Record) -> Vec<String> {
    let mut changed: Vec<String> = after
        .iter()
        .filter(|(name, value)| !loose_eq(before.get(*name).unwrap_or(&Value::Null), value))
        .map(|(name, _)| name.clone())
        .collect();
    changed.extend(
        before
            .iter()
            .filter(|(name, value)| !after.contains_key(*name) && !value.is_null())
            .map(|(name, _)| name.clone()),
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{numbered, DatasetFixture, Event};
    use crate::format::NumberFormat;
    use crate::model::{ItemState, Key};
    use crate::{DatasetBuilder, LoadOptions};
    use serde_json::json;

    #[test]
    fn set_value_marks_modified() {
        let (mut dataset, recorder) = numbered(2);
        recorder.clear();

        let changed = dataset.set_value(&Filter::id(1), "name", "z").unwrap();

        assert_eq!(changed, vec!["name".to_string()]);
        assert_eq!(dataset.get_info(&Filter::id(1)).unwrap()["name"], json!("z"));
        assert_eq!(dataset.get_item(&Filter::id(1)).unwrap().state(), ItemState::Modified);
        assert!(dataset.is_dirty());
        assert_eq!(
            recorder.events(),
            vec![
                Event::Modify(vec!["name".to_string()], Key::from(1), true),
                Event::Dirty(true),
            ]
        );
    }

    #[test]
    fn unchanged_value_is_silent() {
        let (mut dataset, recorder) = numbered(2);
        recorder.clear();

        let changed = dataset.set_value(&Filter::id(2), "id", "2").unwrap();
        assert!(changed.is_empty());
        assert!(recorder.events().is_empty());
        assert_eq!(dataset.get_item(&Filter::id(2)).unwrap().state(), ItemState::Clean);
    }

    #[test]
    fn rejected_value_notifies_rejection() {
        let fixture = DatasetFixture::from_builder(
            DatasetBuilder::new()
                .key_properties(["id"])
                .format("price", NumberFormat),
        );
        let (mut dataset, recorder) = fixture.into_parts();
        dataset
            .set_data(vec![json!({"id": 1, "price": 10})], LoadOptions::default())
            .unwrap();
        recorder.clear();

        let changed = dataset.set_value(&Filter::id(1), "price", "ten").unwrap();

        assert!(changed.is_empty());
        assert_eq!(dataset.get_info(&Filter::id(1)).unwrap()["price"], json!(10));
        assert_eq!(recorder.events(), vec![Event::ModifyRejected(Key::from(1), true)]);
        assert!(!dataset.is_dirty());
    }

    #[test]
    fn added_items_stay_added() {
        let (mut dataset, _) = numbered(1);
        dataset
            .add_record(json!({"id": 2, "name": "new"}), LoadOptions::local())
            .unwrap();
        dataset.set_value(&Filter::id(2), "name", "newer").unwrap();

        assert_eq!(dataset.get_item(&Filter::id(2)).unwrap().state(), ItemState::Added);
    }

    #[test]
    fn modify_reports_added_and_dropped_properties() {
        let (mut dataset, _) = numbered(2);
        let changed = dataset
            .modify(&Filter::id(2), |item| {
                if let Some(record) = item.record_mut() {
                    record.remove("name");
                    record.insert("note".to_string(), json!("hi"));
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(changed, vec!["note".to_string(), "name".to_string()]);
    }

    #[test]
    fn modify_requires_single_reachable_item() {
        let (mut dataset, _) = numbered(2);
        dataset.remove(&Filter::id(2));
        assert!(dataset.set_value(&Filter::id(2), "name", "x").is_err());
        assert!(dataset.modify(&Filter::all(), |_| Ok(())).is_ok());
        assert!(dataset.modify(&Filter::id(9), |_| Ok(())).is_err());
    }

    #[test]
    fn current_value_access() {
        let (mut dataset, _) = numbered(2);
        assert_eq!(dataset.current_value("name"), "n1");

        dataset.set_current_value("name", "first").unwrap();
        assert_eq!(dataset.get_value(&Filter::id(1), "name"), "first");
        assert_eq!(dataset.get_value(&Filter::id(9), "name"), "");
    }

    #[test]
    fn set_current_value_without_current_is_noop() {
        let (mut dataset, recorder) = DatasetFixture::keyed().into_parts();
        let changed = dataset.set_current_value("name", "x").unwrap();
        assert!(changed.is_empty());
        assert!(recorder.events().is_empty());
        assert_eq!(dataset.current_value("name"), "");
    }
}
