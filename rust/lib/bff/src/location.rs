//! Relative links for pages served from the site root or from `/pages/`.

const PAGES_SEGMENT: &str = "/pages/";

/// Path component of the current page URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pathname: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn in_pages(&self) -> bool {
        self.pathname.contains(PAGES_SEGMENT)
    }

    /// Prefix that reaches the site root.
    pub fn base_path(&self) -> &'static str {
        if self.in_pages() { "../" } else { "" }
    }

    /// Prefix that reaches the `pages/` directory.
    pub fn pages_path(&self) -> &'static str {
        if self.in_pages() { "" } else { "pages/" }
    }
}
