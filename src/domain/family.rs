//! Plugin families
//!
//! A family is a category of pluggable content. The set is fixed by the
//! system: plugins advertise which family they belong to, and four of the
//! families additionally back a JSON collection with payload directories
//! on disk.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of pluggable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Pod,
    Podview,
    Orb,
    Link,
    Model,
    Modelview,
    Overview,
    Theme,
    Pack,
}

impl Family {
    /// Every known family, in declaration order
    pub const ALL: [Family; 9] = [
        Family::Pod,
        Family::Podview,
        Family::Orb,
        Family::Link,
        Family::Model,
        Family::Modelview,
        Family::Overview,
        Family::Theme,
        Family::Pack,
    ];

    /// Singular name, as used in plugin metadata
    pub fn singular(&self) -> &'static str {
        match self {
            Family::Pod => "pod",
            Family::Podview => "podview",
            Family::Orb => "orb",
            Family::Link => "link",
            Family::Model => "model",
            Family::Modelview => "modelview",
            Family::Overview => "overview",
            Family::Theme => "theme",
            Family::Pack => "pack",
        }
    }

    /// Plural name, as used for collection files and payload directories
    pub fn plural(&self) -> &'static str {
        match self {
            Family::Pod => "pods",
            Family::Podview => "podviews",
            Family::Orb => "orbs",
            Family::Link => "links",
            Family::Model => "models",
            Family::Modelview => "modelviews",
            Family::Overview => "overviews",
            Family::Theme => "themes",
            Family::Pack => "packs",
        }
    }

    /// Whether this family backs a JSON collection and sharded payload
    /// directories on disk
    pub fn has_collection(&self) -> bool {
        matches!(
            self,
            Family::Pod | Family::Orb | Family::Link | Family::Model
        )
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}
