use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::backends::{ClientContext, RawItem, RawKind};
use crate::models::{ClientType, MediaContent, MediaData, MediaItem, MediaType};
use crate::utils::errors::ConversionError;

/// Pure transform from one raw backend item to a media payload.
pub type ConvertFn = fn(&ClientContext, &RawItem) -> Result<MediaContent, ConversionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConverterKey {
    pub client_type: ClientType,
    pub raw_kind: RawKind,
    pub target: MediaType,
}

impl ConverterKey {
    pub const fn new(client_type: ClientType, raw_kind: RawKind, target: MediaType) -> Self {
        Self {
            client_type,
            raw_kind,
            target,
        }
    }
}

impl fmt::Display for ConverterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} -> {}", self.client_type, self.raw_kind, self.target)
    }
}

/// Table of converters, built once at startup.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<ConverterKey, ConvertFn>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.converters.keys()).finish()
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every converter shipped with the crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::backends::register_all(&mut registry);
        registry
    }

    /// Returns the converter previously registered under `key`, if any.
    pub fn register(&mut self, key: ConverterKey, convert: ConvertFn) -> Option<ConvertFn> {
        self.converters.insert(key, convert)
    }

    pub fn get(&self, key: &ConverterKey) -> Option<ConvertFn> {
        self.converters.get(key).copied()
    }

    pub fn contains(&self, key: &ConverterKey) -> bool {
        self.converters.contains_key(key)
    }

    /// Every registered pairing, in a stable order.
    pub fn keys(&self) -> impl Iterator<Item = &ConverterKey> {
        self.converters.keys()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Targets a backend can produce from one raw shape.
    pub fn targets_for(&self, client_type: ClientType, raw_kind: RawKind) -> Vec<MediaType> {
        self.converters
            .keys()
            .filter(|k| k.client_type == client_type && k.raw_kind == raw_kind)
            .map(|k| k.target)
            .collect()
    }

    pub fn convert(
        &self,
        ctx: &ClientContext,
        raw: &RawItem,
        target: MediaType,
    ) -> Result<MediaContent, ConversionError> {
        let key = ConverterKey::new(ctx.client_type, raw.kind(), target);
        let convert = self.get(&key).ok_or(ConversionError::NoConverter {
            client_type: key.client_type,
            raw_kind: key.raw_kind,
            target: key.target,
        })?;
        convert(ctx, raw)
    }

    /// Convert and wrap into a fresh envelope carrying the client identity and
    /// the payload's external ids.
    pub fn convert_item(
        &self,
        ctx: &ClientContext,
        raw: &RawItem,
        target: MediaType,
    ) -> Result<MediaItem, ConversionError> {
        let content = self.convert(ctx, raw, target)?;
        let client_key = content
            .details()
            .external_ids
            .get_id(ctx.client_type.as_str())
            .map(str::to_string)
            .ok_or(ConversionError::missing(ctx.client_type, raw.kind(), "id"))?;

        let mut item = MediaItem::new(content);
        item.set_client_info(ctx.client_id, ctx.client_type, client_key.as_str());
        item.adopt_external_ids();
        debug!(
            client_id = %ctx.client_id,
            key = %client_key,
            media_type = %target,
            title = %item.title(),
            "Converted backend item"
        );
        Ok(item)
    }
}
