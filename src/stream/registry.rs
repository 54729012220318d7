//! Ordered set of stream definitions
//!
//! Holds streams in declaration order, validates parent links, and resolves
//! which streams a run emits and which it only traverses.

use super::types::StreamDefinition;
use crate::config::Catalog;
use crate::error::{Error, Result};
use crate::template;
use std::collections::BTreeSet;

/// Streams a run emits, plus the ancestors it must walk to reach them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<String>,
    traversed: BTreeSet<String>,
}

impl Selection {
    /// Records of this stream are emitted
    pub fn is_selected(&self, stream: &str) -> bool {
        self.selected.contains(stream)
    }

    /// This stream is requested, either for its own records or for a descendant
    pub fn is_traversed(&self, stream: &str) -> bool {
        self.traversed.contains(stream)
    }

    /// Selected stream names, sorted
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

/// Validated stream definitions in declaration order
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    /// Validate and wrap a list of streams
    ///
    /// Names must be unique, parents must be declared before their
    /// children, and every path placeholder must be provided by the
    /// parent's child context.
    pub fn new(streams: Vec<StreamDefinition>) -> Result<Self> {
        let mut seen: Vec<&StreamDefinition> = Vec::with_capacity(streams.len());

        for stream in &streams {
            if seen.iter().any(|s| s.name == stream.name) {
                return Err(Error::config(format!("Duplicate stream '{}'", stream.name)));
            }

            let provided: BTreeSet<&str> = match &stream.parent {
                None => BTreeSet::new(),
                Some(parent_name) => {
                    let parent = seen
                        .iter()
                        .find(|s| &s.name == parent_name)
                        .ok_or_else(|| {
                            Error::config(format!(
                                "Stream '{}' declares unknown or later parent '{parent_name}'",
                                stream.name
                            ))
                        })?;
                    let rule = parent.child_context.as_ref().ok_or_else(|| {
                        Error::config(format!(
                            "Parent stream '{parent_name}' of '{}' has no child context",
                            stream.name
                        ))
                    })?;
                    rule.keys().collect()
                }
            };

            if template::has_templates(&stream.path) {
                for var in template::extract_variables(&stream.path) {
                    if !provided.contains(var.as_str()) {
                        return Err(Error::config(format!(
                            "Path of stream '{}' uses '{{{var}}}' which its context does not provide",
                            stream.name
                        )));
                    }
                }
            }

            seen.push(stream);
        }

        Ok(Self { streams })
    }

    /// All streams in declaration order
    pub fn streams(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }

    /// Root streams in declaration order
    pub fn roots(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter().filter(|s| s.is_root())
    }

    /// Direct children of `parent` in declaration order
    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a StreamDefinition> {
        self.streams
            .iter()
            .filter(move |s| s.parent.as_deref() == Some(parent))
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&StreamDefinition> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Look up a stream by name, failing if unknown
    pub fn require(&self, name: &str) -> Result<&StreamDefinition> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Resolve a stream selection; `None` selects every stream
    pub fn select(&self, names: Option<&[String]>) -> Result<Selection> {
        let selected: BTreeSet<String> = match names {
            None => self.streams.iter().map(|s| s.name.clone()).collect(),
            Some(names) => {
                let mut set = BTreeSet::new();
                for name in names {
                    set.insert(self.require(name.trim())?.name.clone());
                }
                set
            }
        };

        let mut traversed = BTreeSet::new();
        for name in &selected {
            let mut current = self.get(name);
            while let Some(stream) = current {
                if !traversed.insert(stream.name.clone()) {
                    break;
                }
                current = stream.parent.as_deref().and_then(|p| self.get(p));
            }
        }

        Ok(Selection {
            selected,
            traversed,
        })
    }

    /// Catalog of every stream
    pub fn catalog(&self) -> Catalog {
        Catalog {
            streams: self.streams.iter().map(StreamDefinition::catalog_entry).collect(),
        }
    }
}
