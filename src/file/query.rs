//! Query construction for listing the files a user may see.

use crate::backend::Query;
use crate::user::UserRecord;

use super::FileType;

/// Sort used when none is given: newest first.
pub const DEFAULT_SORT: &str = "$createdAt-desc";

/// A parsed `field-direction` sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Attribute to sort on.
    pub field: String,
    /// Whether the direction token was `asc`.
    pub ascending: bool,
}

impl SortSpec {
    /// Parse `field-direction`, splitting on the first `-`.
    ///
    /// Any direction other than `asc` (including a missing one) sorts
    /// descending. An empty spec falls back to [`DEFAULT_SORT`].
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let spec = if spec.is_empty() { DEFAULT_SORT } else { spec };
        let (field, direction) = spec.split_once('-').unwrap_or((spec, ""));
        Self {
            field: field.to_string(),
            ascending: direction == "asc",
        }
    }

    /// The ordering predicate for this spec.
    pub fn to_query(&self) -> Query {
        if self.ascending {
            Query::OrderAsc(self.field.clone())
        } else {
            Query::OrderDesc(self.field.clone())
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::parse(DEFAULT_SORT)
    }
}

/// Filters for listing files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileQuery {
    /// Only these file types (all when empty).
    pub types: Vec<FileType>,
    /// Name substring to search for (no filter when empty).
    pub search: String,
    /// Sort specification.
    pub sort: SortSpec,
    /// Maximum number of results.
    pub limit: Option<u32>,
}

impl FileQuery {
    /// Query with no filters and the default sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given file types.
    pub fn with_types(mut self, types: impl IntoIterator<Item = FileType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Search file names for a substring.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sort by a `field-direction` spec such as `size-asc`.
    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = SortSpec::parse(sort);
        self
    }

    /// Cap the number of results.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Files `user` owns or that are shared with their email.
    pub fn visibility(user: &UserRecord) -> Query {
        Query::Or(vec![
            Query::equal("owner", user.id.as_str()),
            Query::contains("users", user.email.as_str()),
        ])
    }

    /// Build the predicates for `user`, in fixed order:
    /// visibility, type, search, limit, sort.
    pub fn build(&self, user: &UserRecord) -> Vec<Query> {
        let mut queries = vec![Self::visibility(user)];

        if !self.types.is_empty() {
            queries.push(Query::equal_any(
                "type",
                self.types.iter().map(FileType::as_str),
            ));
        }

        let search = self.search.trim();
        if !search.is_empty() {
            queries.push(Query::contains("name", search));
        }

        if let Some(limit) = self.limit {
            queries.push(Query::Limit(limit));
        }

        queries.push(self.sort.to_query());
        queries
    }
}
