//! Resource list view: filtering, sorting and per-row status.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{Resource, ResourceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortField {
    #[default]
    Name,
    #[strum(to_string = "modified", serialize = "modified_at")]
    ModifiedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Knowledge-base status per `resource_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMap {
    statuses: HashMap<String, ResourceStatus>,
}

impl StatusMap {
    /// Builds the map from a knowledge-base listing; entries without a status
    /// are skipped.
    pub fn from_resources(resources: &[Resource]) -> Self {
        let statuses = resources
            .iter()
            .filter_map(|r| r.status.clone().map(|s| (r.resource_id.clone(), s)))
            .collect();
        Self { statuses }
    }

    pub fn get(&self, resource_id: &str) -> Option<&ResourceStatus> {
        self.statuses.get(resource_id)
    }

    /// Present in the knowledge base and not on its way out.
    pub fn is_resource_indexed(&self, resource_id: &str) -> bool {
        self.get(resource_id)
            .map(ResourceStatus::counts_as_indexed)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Case-insensitive substring match on the leaf name. Order is preserved.
pub fn filter_resources<'a>(resources: &'a [Resource], query: &str) -> Vec<&'a Resource> {
    let needle = query.to_lowercase();
    resources
        .iter()
        .filter(|r| r.name().to_lowercase().contains(&needle))
        .collect()
}

/// Directories before files, then by the configured field and direction.
pub fn sort_resources(resources: &mut [&Resource], sort: SortConfig) {
    resources.sort_by(|a, b| {
        let kind = b.is_directory().cmp(&a.is_directory());
        if kind != Ordering::Equal {
            return kind;
        }
        let field = match sort.field {
            SortField::Name => locale_compare(a.name(), b.name()),
            SortField::ModifiedAt => compare_modified(a, b),
        };
        match sort.direction {
            SortDirection::Asc => field,
            SortDirection::Desc => field.reverse(),
        }
    });
}

/// Collation close to a default-locale string compare.
///
/// Levels, in order: base letters with accents and case folded away, then
/// accents, then case (lower before upper), then raw code points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = base_letters(a).cmp(base_letters(b));
    if primary != Ordering::Equal {
        return primary;
    }
    let secondary = a
        .nfd()
        .flat_map(char::to_lowercase)
        .cmp(b.nfd().flat_map(char::to_lowercase));
    if secondary != Ordering::Equal {
        return secondary;
    }
    let tertiary = a
        .chars()
        .map(|c| c.is_uppercase())
        .cmp(b.chars().map(|c| c.is_uppercase()));
    tertiary.then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Parsed timestamps first, in time order; unparseable values after them,
/// by raw string.
fn compare_modified(a: &Resource, b: &Resource) -> Ordering {
    match (a.modified_time(), b.modified_time()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.modified_at.cmp(&b.modified_at),
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRow {
    pub resource: Resource,
    pub selected: bool,
    pub status: Option<ResourceStatus>,
    /// The unindex action is offered for this row.
    pub can_unindex: bool,
    /// An unindex call for this row is in flight.
    pub busy: bool,
}

impl ResourceRow {
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn is_directory(&self) -> bool {
        self.resource.is_directory()
    }
}

/// What the list area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListDisplay {
    Loading,
    Empty,
    Rows(Vec<ResourceRow>),
}

impl ListDisplay {
    pub fn rows(&self) -> &[ResourceRow] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Everything the list needs to render.
pub struct ResourceListView<'a> {
    pub resources: &'a [Resource],
    pub is_loading: bool,
    pub search_query: &'a str,
    pub sort: SortConfig,
    pub statuses: &'a StatusMap,
    pub selection: &'a BTreeSet<String>,
    pub busy: &'a HashSet<String>,
}

impl ResourceListView<'_> {
    pub fn build(&self) -> ListDisplay {
        if self.is_loading {
            return ListDisplay::Loading;
        }

        let mut visible = filter_resources(self.resources, self.search_query);
        if visible.is_empty() {
            return ListDisplay::Empty;
        }
        sort_resources(&mut visible, self.sort);

        let rows = visible
            .into_iter()
            .map(|resource| {
                let id = resource.resource_id.as_str();
                ResourceRow {
                    selected: self.selection.contains(id),
                    status: self.statuses.get(id).cloned(),
                    can_unindex: self.statuses.is_resource_indexed(id),
                    busy: self.busy.contains(id),
                    resource: resource.clone(),
                }
            })
            .collect();
        ListDisplay::Rows(rows)
    }
}
