use crate::error::{DatasetError, Result};
use crate::format::{FormatRegistry, ValueFormat};
use crate::identity::{IdentityStrategy, KeyMapper, PropertyKey, SurrogateKey};
use crate::model::{Key, Record};
use crate::observer::{DatasetObserver, LoggingObserver};
use crate::store::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// How records are identified, as written in configuration files.
///
/// ```json
/// {"identity": {"properties": ["group", "code"]}}
/// {"identity": "surrogate"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityConfig {
    Properties(Vec<String>),
    Surrogate,
}

/// Serializable part of a store's configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetConfig {
    #[serde(default)]
    pub identity: Option<IdentityConfig>,

    /// Emit a debug event for every notification.
    #[serde(default)]
    pub trace: bool,

    /// Properties used to carry state across reloads under surrogate identity.
    #[serde(default)]
    pub state_keys: Vec<String>,

    /// JSON pointer to the record array when loading from an object, e.g. `/data/items`
    #[serde(default)]
    pub records_pointer: Option<String>,
}

impl DatasetConfig {
    /// Load config from a JSON file, or return defaults if not found
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(DatasetError::Io)?;
        let config: DatasetConfig =
            serde_json::from_str(&content).map_err(DatasetError::Serialization)?;
        Ok(config)
    }
}

/// Assembles a [`Dataset`] from a [`DatasetConfig`] and the parts that cannot
/// be serialized: a key function, value formats and the observer.
pub struct DatasetBuilder {
    config: DatasetConfig,
    key_mapper: Option<KeyMapper>,
    formats: FormatRegistry,
    observer: Option<Rc<dyn DatasetObserver>>,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DatasetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetBuilder")
            .field("config", &self.config)
            .field("key_mapper", &self.key_mapper.is_some())
            .field("formats", &self.formats)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::from_config(DatasetConfig::default())
    }

    pub fn from_config(config: DatasetConfig) -> Self {
        Self {
            config,
            key_mapper: None,
            formats: FormatRegistry::new(),
            observer: None,
        }
    }

    /// Derive identities from `properties`.
    pub fn key_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties = properties.into_iter().map(Into::into).collect();
        self.config.identity = Some(IdentityConfig::Properties(properties));
        self
    }

    /// Derive identities with `mapper`. Takes precedence over configured identity.
    pub fn key_mapper(mut self, mapper: impl Fn(&Record) -> Option<Key> + 'static) -> Self {
        self.key_mapper = Some(KeyMapper::new(mapper));
        self
    }

    pub fn surrogate(mut self) -> Self {
        self.config.identity = Some(IdentityConfig::Surrogate);
        self
    }

    pub fn format(
        mut self,
        property: impl Into<String>,
        format: impl ValueFormat + 'static,
    ) -> Self {
        self.formats.register(property, Rc::new(format));
        self
    }

    pub fn formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn observer(mut self, observer: Rc<dyn DatasetObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    pub fn state_keys<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.state_keys = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn records_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.config.records_pointer = Some(pointer.into());
        self
    }

    /// Builds an empty store. Fails when no identity was specified.
    pub fn build(self) -> Result<Dataset> {
        let identity: Box<dyn IdentityStrategy> = match (self.key_mapper, &self.config.identity) {
            (Some(mapper), _) => Box::new(mapper),
            (None, Some(IdentityConfig::Properties(properties))) if !properties.is_empty() => {
                Box::new(PropertyKey::new(properties.iter().cloned()))
            }
            (None, Some(IdentityConfig::Surrogate)) => Box::new(SurrogateKey::new()),
            _ => return Err(DatasetError::MissingIdentity),
        };
        let observer = self
            .observer
            .unwrap_or_else(|| Rc::new(LoggingObserver));

        Ok(Dataset::from_parts(
            identity,
            Rc::new(self.formats),
            observer,
            self.config,
        ))
    }
}
