//! The materialized view model.

use crate::resource::{Links, PageMeta, Resource};

/// One fully loaded page, as produced by the collection loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    /// Individually fetched items, in collection order.
    pub items: Vec<Resource>,
    /// Editable field names, from the filtered schema.
    pub attributes: Vec<String>,
    /// Pagination metadata, absent for unpaged results.
    pub page: Option<PageMeta>,
    /// Pagination links (`first`, `prev`, `next`, `last`, `self`, ...).
    pub links: Links,
    /// Page size the view was loaded with.
    pub page_size: u32,
}

/// What the view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Items of the current page.
    pub items: Vec<Resource>,
    /// Editable field names.
    pub attributes: Vec<String>,
    /// Pagination metadata of the current page.
    pub page: Option<PageMeta>,
    /// Pagination links of the current page.
    pub links: Links,
    /// Current page size.
    pub page_size: u32,
    /// Authenticated manager, fixed for the session.
    pub logged_in_manager: Option<String>,
}

impl AppState {
    /// The state before the first load.
    pub fn new(page_size: u32, logged_in_manager: Option<String>) -> Self {
        Self {
            page_size,
            logged_in_manager,
            ..Self::default()
        }
    }

    /// Replaces the loaded slice wholesale, keeping the manager identity.
    pub fn apply(&mut self, view: PageView) {
        let PageView {
            items,
            attributes,
            page,
            links,
            page_size,
        } = view;
        self.items = items;
        self.attributes = attributes;
        self.page = page;
        self.links = links;
        self.page_size = page_size;
    }

    /// Current 0-based page number, `0` before the first load.
    pub fn page_number(&self) -> u32 {
        self.page.map_or(0, |page| page.number)
    }
}
