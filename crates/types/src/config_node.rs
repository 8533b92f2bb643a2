//! Generic hierarchical configuration tree
//!
//! `ConfigNode` is the single intermediate form used to persist a display and
//! to copy one display into another. It is a recursive value that is either
//! empty, a scalar, an ordered sequence of nodes, or an ordered mapping from
//! names to nodes. Mapping keys keep their insertion order so a saved file
//! reads back in the same order it was written.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A leaf value in a config tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered name -> node mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<(String, ConfigNode)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a value, replacing an existing entry in place so its position
    /// is kept. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigNode) -> Option<ConfigNode> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A node in a config tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigNode {
    /// No value yet. Becomes a mapping or sequence on first write.
    #[default]
    Empty,
    Scalar(Scalar),
    Sequence(Vec<ConfigNode>),
    Mapping(Mapping),
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Create an empty mapping node
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigNode::Empty)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigNode::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ConfigNode::Sequence(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers are widened so `1` and `1.0` both read back.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigNode::Scalar(Scalar::Float(x)) => Some(*x),
            ConfigNode::Scalar(Scalar::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Look up a child of a mapping node
    pub fn map_get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn map_get_str(&self, key: &str) -> Option<&str> {
        self.map_get(key).and_then(ConfigNode::as_str)
    }

    pub fn map_get_bool(&self, key: &str) -> Option<bool> {
        self.map_get(key).and_then(ConfigNode::as_bool)
    }

    pub fn map_get_i64(&self, key: &str) -> Option<i64> {
        self.map_get(key).and_then(ConfigNode::as_i64)
    }

    pub fn map_get_f64(&self, key: &str) -> Option<f64> {
        self.map_get(key).and_then(ConfigNode::as_f64)
    }

    /// Set `key` on this node, turning it into a mapping if it is anything else.
    pub fn map_set(&mut self, key: impl Into<String>, value: impl Into<ConfigNode>) {
        self.ensure_mapping().insert(key, value.into());
    }

    /// Get or create the child at `key`, turning this node into a mapping
    /// if needed.
    pub fn map_child_mut(&mut self, key: &str) -> &mut ConfigNode {
        let map = self.ensure_mapping();
        if !map.contains_key(key) {
            map.insert(key, ConfigNode::Empty);
        }
        // Entry was inserted above
        match map.get_mut(key) {
            Some(child) => child,
            None => unreachable!("mapping entry {} vanished after insert", key),
        }
    }

    /// Items of a sequence node; other node kinds have no items.
    pub fn list_items(&self) -> &[ConfigNode] {
        match self {
            ConfigNode::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Append an empty node and return it for filling in.
    pub fn list_append_new(&mut self) -> &mut ConfigNode {
        let items = self.ensure_sequence();
        items.push(ConfigNode::Empty);
        let last = items.len() - 1;
        &mut items[last]
    }

    fn ensure_mapping(&mut self) -> &mut Mapping {
        if !self.is_mapping() {
            *self = ConfigNode::mapping();
        }
        match self {
            ConfigNode::Mapping(m) => m,
            _ => unreachable!(),
        }
    }

    fn ensure_sequence(&mut self) -> &mut Vec<ConfigNode> {
        if !self.is_sequence() {
            *self = ConfigNode::Sequence(Vec::new());
        }
        match self {
            ConfigNode::Sequence(items) => items,
            _ => unreachable!(),
        }
    }
}

impl From<Scalar> for ConfigNode {
    fn from(value: Scalar) -> Self {
        ConfigNode::Scalar(value)
    }
}

impl From<bool> for ConfigNode {
    fn from(value: bool) -> Self {
        ConfigNode::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for ConfigNode {
    fn from(value: i64) -> Self {
        ConfigNode::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for ConfigNode {
    fn from(value: i32) -> Self {
        ConfigNode::Scalar(Scalar::Int(value as i64))
    }
}

impl From<u32> for ConfigNode {
    fn from(value: u32) -> Self {
        ConfigNode::Scalar(Scalar::Int(value as i64))
    }
}

impl From<f64> for ConfigNode {
    fn from(value: f64) -> Self {
        ConfigNode::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for ConfigNode {
    fn from(value: &str) -> Self {
        ConfigNode::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for ConfigNode {
    fn from(value: String) -> Self {
        ConfigNode::Scalar(Scalar::String(value))
    }
}

impl From<Vec<ConfigNode>> for ConfigNode {
    fn from(value: Vec<ConfigNode>) -> Self {
        ConfigNode::Sequence(value)
    }
}

impl From<Mapping> for ConfigNode {
    fn from(value: Mapping) -> Self {
        ConfigNode::Mapping(value)
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigNode::Empty => serializer.serialize_unit(),
            ConfigNode::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            ConfigNode::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            ConfigNode::Scalar(Scalar::Float(x)) => serializer.serialize_f64(*x),
            ConfigNode::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            ConfigNode::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigNode::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

struct ConfigNodeVisitor;

impl<'de> Visitor<'de> for ConfigNodeVisitor {
    type Value = ConfigNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a config value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Empty)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ConfigNode, D::Error> {
        ConfigNode::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ConfigNode, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ConfigNode, E> {
        Ok(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ConfigNode, E> {
        match i64::try_from(v) {
            Ok(i) => Ok(i.into()),
            Err(_) => Ok((v as f64).into()),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ConfigNode, E> {
        Ok(v.into())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ConfigNode, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ConfigNode, E> {
        Ok(v.into())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ConfigNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigNode::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ConfigNode, A::Error> {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, ConfigNode>()? {
            map.insert(key, value);
        }
        Ok(ConfigNode::Mapping(map))
    }
}

impl<'de> Deserialize<'de> for ConfigNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigNodeVisitor)
    }
}
