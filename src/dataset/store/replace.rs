use super::Dataset;
use crate::error::{DatasetError, Result};
use crate::item::DataItem;
use crate::model::{Key, Record};
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::warn;

/// A record superseding the one held under `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    /// Identity of the record to replace. Defaults to the identity of `record`.
    pub key: Option<Key>,
    pub record: Value,
}

impl Replacement {
    pub fn new(record: Value) -> Self {
        Self { key: None, record }
    }

    pub fn of(key: impl Into<Key>, record: Value) -> Self {
        Self {
            key: Some(key.into()),
            record,
        }
    }
}

struct Plan {
    target: Option<usize>,
    key: Key,
    record: Record,
}

impl Dataset {
    /// Substitutes held records, typically with what a backend returned after a commit.
    ///
    /// A replaced item keeps its position and selection and becomes clean. Its
    /// identity follows the new record under derived identity and is kept
    /// under surrogate identity. A replacement whose target is not held is
    /// appended as a clean item. Invalid input fails before the store is touched.
    pub fn replace(&mut self, replacements: Vec<Replacement>) -> Result<()> {
        let plans = self.plan_replacements(replacements)?;
        if plans.is_empty() {
            return Ok(());
        }

        let current = self.current_position();
        let mut replaced = Vec::with_capacity(plans.len());
        for plan in plans {
            match plan.target {
                Some(pos) => {
                    self.items[pos].replace(plan.key, plan.record);
                    replaced.push(pos);
                }
                None => {
                    self.items
                        .push(DataItem::new(plan.key, plan.record, Rc::clone(&self.formats)));
                    replaced.push(self.items.len() - 1);
                }
            }
        }
        self.reindex();
        if let Some(pos) = current {
            self.current = Some(self.items[pos].key().clone());
        }

        self.notify_replace(&replaced);
        self.refresh_dirty();
        Ok(())
    }

    fn plan_replacements(&mut self, replacements: Vec<Replacement>) -> Result<Vec<Plan>> {
        let derived = self.identity.is_derived();
        let mut plans: Vec<Plan> = Vec::with_capacity(replacements.len());

        for (pos, replacement) in replacements.into_iter().enumerate() {
            let Value::Object(record) = replacement.record else {
                return Err(DatasetError::NotAnObject(pos));
            };
            let identified = if derived {
                Some(
                    self.identity
                        .identify(&record)
                        .ok_or(DatasetError::Unidentifiable(pos))?,
                )
            } else {
                None
            };

            let target_key = replacement.key.clone().or_else(|| identified.clone());
            let target = target_key.as_ref().and_then(|key| self.position_of(key));
            if let (Some(key), None) = (&replacement.key, target) {
                warn!(target: "dataset", %key, "Replacement target not found, appending");
            }

            let key = match (identified, target) {
                (Some(key), _) => key,
                (None, Some(pos)) => self.items[pos].key().clone(),
                (None, None) => self
                    .identity
                    .identify(&record)
                    .ok_or(DatasetError::Unidentifiable(pos))?,
            };
            plans.push(Plan {
                target,
                key,
                record,
            });
        }

        let mut targets: HashSet<usize> = HashSet::with_capacity(plans.len());
        for pos in plans.iter().filter_map(|plan| plan.target) {
            if !targets.insert(pos) {
                return Err(DatasetError::DuplicateTarget(self.items[pos].key().clone()));
            }
        }
        let mut seen: HashSet<&Key> = HashSet::with_capacity(plans.len());
        for plan in &plans {
            let taken = self
                .position_of(&plan.key)
                .is_some_and(|pos| plan.target != Some(pos) && !targets.contains(&pos));
            if taken || !seen.insert(&plan.key) {
                return Err(DatasetError::DuplicateKey(plan.key.clone()));
            }
        }
        Ok(plans)
    }
}
