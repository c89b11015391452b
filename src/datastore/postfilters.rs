//! Ways to filter post listings. Filter semantics work just like SQL:
//! if a field is unset, its filter won't be applied.
//! If set, posts that don't match the filter are dropped.
use crate::datastore::structs::{Category, Post};
use serde::Deserialize;

/// Filters that can be applied to post listings on the datastore.
#[derive(Default, Deserialize, Debug, Eq, PartialEq)]
pub struct PostFilters {
    pub category: Option<Category>,
    pub author_id: Option<String>,
    pub body_contains: Option<String>,
    /// Maximum number of posts to let match the filter
    #[serde(default = "default_limit")]
    pub limit: u8,
}

fn default_limit() -> u8 {
    100
}

impl Post {
    /// Does this post match all specified filters?
    pub fn matches(&self, filters: &PostFilters) -> bool {
        if let Some(category) = filters.category {
            if category != self.category {
                return false;
            }
        }
        if let Some(author_id) = &filters.author_id {
            if author_id != &self.author_id {
                return false;
            }
        }
        if let Some(substring) = &filters.body_contains {
            if !self.body.contains(substring) {
                return false;
            }
        }
        true
    }
}
