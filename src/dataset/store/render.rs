use super::Dataset;
use crate::filter::Filter;
use crate::item::DataItem;

impl Dataset {
    /// `template` filled in once per reachable item, in order.
    pub fn in_strings(&self, template: &str) -> Vec<String> {
        self.get_items(&Filter::all())
            .into_iter()
            .map(|item| item.in_string(template))
            .collect()
    }

    /// Like [`Dataset::in_strings`], with `custom` handling its own placeholders first.
    pub fn in_strings_with<F>(&self, template: &str, custom: F) -> Vec<String>
    where
        F: Fn(&str, &DataItem) -> String,
    {
        self.get_items(&Filter::all())
            .into_iter()
            .map(|item| item.in_string_with(template, &custom))
            .collect()
    }
}
