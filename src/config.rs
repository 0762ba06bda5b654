//! Application-level configuration constants.

// Mount point and the data attributes read from it at startup
pub const MOUNT_ID: &str = "app";
pub const ATTR_REDIRECT: &str = "data-redirect";
pub const ATTR_REDIRECT_DELAY: &str = "data-redirect-delay";
pub const ATTR_RECOMMENDATIONS_URL: &str = "data-recommendations-url";
pub const ATTR_SEARCH_URL: &str = "data-search-url";

// Element ids and classes the page stylesheet targets
pub const GENRE_CHECKBOX_CLASS: &str = "genre-checkbox";
pub const DECADE_CHECKBOX_CLASS: &str = "search-checkbox";
pub const RECCO_LIMIT_ID: &str = "recco_limit";
pub const SEARCH_LIMIT_ID: &str = "search_limit";
pub const SUBMIT_ID: &str = "search_value";
pub const MODAL_ID: &str = "myModal";
pub const FILTER_INPUT_ID: &str = "myInput";
pub const GENRE_LIST_ID: &str = "genreSearch";

// Min/Max limits for the limit inputs
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 50;

// Embedded option catalogs: (id column, label column)
pub const CATALOG_COLUMNS: (usize, usize) = (0, 1);
