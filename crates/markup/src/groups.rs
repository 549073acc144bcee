//! Tag groups: which tags may nest inside which others.
//!
//! Every tag belongs to exactly one group, either through an explicit entry in
//! [`GroupConfig::tags`] or through the default group. Each group lists the
//! groups its members accept as direct children. A group that accepts nothing
//! is *verbatim*: the interior of its tags is never interpreted as markup.
//!
//! The registry is validated once at construction and read-only afterwards, so
//! a single instance can be shared freely between parses and threads.
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Per-tag override.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TagConfig {
    /// Group the tag belongs to; `None` means the default group.
    pub group: Option<String>,
    /// Single tags never take a closer (`[hr]`, `[br]`).
    pub single: bool,
}

/// Raw registry configuration, as supplied by the embedding application.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
    /// Group name -> groups accepted as direct children, in order.
    pub groups: BTreeMap<String, Vec<String>>,
    pub default_group: String,
    pub initial_group: String,
    pub tags: BTreeMap<String, TagConfig>,
}

impl GroupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual forum configuration: block tags nest blocks and inlines,
    /// inline tags nest inlines, and `code` is verbatim.
    pub fn bbcode() -> Self {
        Self::new()
            .group("block", ["block", "blockignore", "inline"])
            .group("inline", ["inline"])
            .group("blockignore", Vec::<String>::new())
            .default_group("block")
            .initial_group("block")
            .tag("code", "blockignore")
    }

    pub fn group<I, S>(mut self, name: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), children.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_group(mut self, name: impl Into<String>) -> Self {
        self.default_group = name.into();
        self
    }

    pub fn initial_group(mut self, name: impl Into<String>) -> Self {
        self.initial_group = name.into();
        self
    }

    pub fn tag(mut self, name: impl Into<String>, group: impl Into<String>) -> Self {
        self.tags.entry(name.into()).or_default().group = Some(group.into());
        self
    }

    pub fn single_tag(mut self, name: impl Into<String>) -> Self {
        self.tags.entry(name.into()).or_default().single = true;
        self
    }
}

/// Registry configuration that references groups it never defines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupConfigError {
    UnknownDefaultGroup { group: String },
    UnknownInitialGroup { group: String },
    UnknownChildGroup { group: String, child: String },
    UnknownTagGroup { tag: String, group: String },
}

impl fmt::Display for GroupConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupConfigError::UnknownDefaultGroup { group } => {
                write!(f, "default group '{group}' is not defined")
            }
            GroupConfigError::UnknownInitialGroup { group } => {
                write!(f, "initial group '{group}' is not defined")
            }
            GroupConfigError::UnknownChildGroup { group, child } => {
                write!(f, "group '{group}' permits undefined child group '{child}'")
            }
            GroupConfigError::UnknownTagGroup { tag, group } => {
                write!(f, "tag '{tag}' is assigned to undefined group '{group}'")
            }
        }
    }
}

impl std::error::Error for GroupConfigError {}

#[derive(Clone, Debug)]
struct TagEntry {
    group: Option<String>,
    single: bool,
}

/// Validated, immutable group lookup.
#[derive(Clone, Debug)]
pub struct GroupRegistry {
    groups: HashMap<String, Vec<String>>,
    tags: HashMap<String, TagEntry>,
    default_group: String,
    initial_group: String,
}

impl GroupRegistry {
    pub fn new(config: GroupConfig) -> Result<Self, GroupConfigError> {
        let GroupConfig {
            groups,
            default_group,
            initial_group,
            tags,
        } = config;

        if !groups.contains_key(&default_group) {
            return Err(GroupConfigError::UnknownDefaultGroup {
                group: default_group,
            });
        }
        if !groups.contains_key(&initial_group) {
            return Err(GroupConfigError::UnknownInitialGroup {
                group: initial_group,
            });
        }
        for (group, children) in &groups {
            if let Some(child) = children.iter().find(|c| !groups.contains_key(*c)) {
                return Err(GroupConfigError::UnknownChildGroup {
                    group: group.clone(),
                    child: child.clone(),
                });
            }
        }
        for (tag, entry) in &tags {
            if let Some(group) = &entry.group
                && !groups.contains_key(group)
            {
                return Err(GroupConfigError::UnknownTagGroup {
                    tag: tag.clone(),
                    group: group.clone(),
                });
            }
        }

        let groups = groups
            .into_iter()
            .map(|(name, children)| {
                let mut unique: Vec<String> = Vec::with_capacity(children.len());
                for child in children {
                    if !unique.contains(&child) {
                        unique.push(child);
                    }
                }
                (name, unique)
            })
            .collect();
        let tags = tags
            .into_iter()
            .map(|(name, tag)| {
                (
                    name,
                    TagEntry {
                        group: tag.group,
                        single: tag.single,
                    },
                )
            })
            .collect();

        Ok(Self {
            groups,
            tags,
            default_group,
            initial_group,
        })
    }

    /// Group of a tag name (without the closer marker).
    pub fn group_of(&self, tag: &str) -> &str {
        self.tags
            .get(tag)
            .and_then(|entry| entry.group.as_deref())
            .unwrap_or(&self.default_group)
    }

    /// Groups accepted as direct children. Empty for verbatim and unknown
    /// groups.
    pub fn permitted_child_groups(&self, group: &str) -> &[String] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn permits(&self, parent_group: &str, child_group: &str) -> bool {
        self.permitted_child_groups(parent_group)
            .iter()
            .any(|g| g == child_group)
    }

    pub fn is_verbatim(&self, group: &str) -> bool {
        self.permitted_child_groups(group).is_empty()
    }

    pub fn is_single(&self, tag: &str) -> bool {
        self.tags.get(tag).is_some_and(|entry| entry.single)
    }

    pub fn initial_group(&self) -> &str {
        &self.initial_group
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }
}
