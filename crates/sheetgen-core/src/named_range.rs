//! Named range definitions
//!
//! Named ranges let a template refer to a rectangle by a user-chosen name
//! instead of by position, e.g. `{{RANGE[left]_LOOP_START}}`.
//!
//! # Example
//!
//! ```rust
//! use sheetgen_core::NamedRangeRegistry;
//!
//! let mut names = NamedRangeRegistry::new();
//! names.define("left", "A1:B2").unwrap();
//!
//! let range = names.get("left").unwrap();
//! assert_eq!(range.col_count(), 2);
//! assert!(names.define("left", "C1:C2").is_err());
//! ```

use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::range::RangeSpec;

/// Collection of named ranges with efficient lookup
///
/// Names are case-sensitive, like the markers that reference them, and are
/// iterated in definition order.
#[derive(Debug, Default, Clone)]
pub struct NamedRangeRegistry {
    ranges: AHashMap<String, RangeSpec>,
    order: Vec<String>,
}

impl NamedRangeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that a name can appear inside a `RANGE[...]` marker
    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidName("name is empty".into()));
        }
        if name.contains(|c| matches!(c, '[' | ']' | '{' | '}')) {
            return Err(Error::InvalidName(format!(
                "'{}' contains a bracket or brace",
                name
            )));
        }
        Ok(())
    }

    /// Define a new named range from A1 notation
    ///
    /// Returns an error if the name is already defined or the notation does
    /// not parse.
    pub fn define(&mut self, name: impl Into<String>, notation: &str) -> Result<()> {
        let range = RangeSpec::parse(notation)?;
        self.define_range(name, range)
    }

    /// Define a new named range from an already resolved [`RangeSpec`]
    pub fn define_range(&mut self, name: impl Into<String>, range: RangeSpec) -> Result<()> {
        let name = name.into();
        Self::validate_name(&name)?;

        if self.ranges.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }

        self.order.push(name.clone());
        self.ranges.insert(name, range);
        Ok(())
    }

    /// Get a named range by name
    pub fn get(&self, name: &str) -> Option<&RangeSpec> {
        self.ranges.get(name)
    }

    /// Check if a name is defined
    pub fn contains(&self, name: &str) -> bool {
        self.ranges.contains_key(name)
    }

    /// Remove a named range
    pub fn remove(&mut self, name: &str) -> Option<RangeSpec> {
        let removed = self.ranges.remove(name)?;
        self.order.retain(|n| n != name);
        Some(removed)
    }

    /// Iterate over `(name, range)` pairs in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RangeSpec)> {
        self.order
            .iter()
            .filter_map(move |name| self.ranges.get(name).map(|r| (name.as_str(), r)))
    }

    /// Get the number of named ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
