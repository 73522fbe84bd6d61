/// Quiet period before a typed search is applied.
pub const SEARCH_DEBOUNCE_MS: u32 = 300;
/// Delay before scrolling an opened entry, so the expand transition has started.
pub const SCROLL_DELAY_MS: u32 = 100;
/// Delay before honouring the fragment present at page load.
pub const HASH_NAVIGATION_DELAY_MS: u32 = 500;
pub const PRINT_DELAY_MS: u32 = 300;
/// Searches are reported to analytics only when longer than this many characters.
pub const MIN_TRACKED_SEARCH_LEN: usize = 2;

pub const CONTACT_PAGE_URL: &str = "/contact";

#[cfg(debug_assertions)]
pub fn analytics_debug() -> bool {
    true // Log every tracked event when running locally
}

#[cfg(not(debug_assertions))]
pub fn analytics_debug() -> bool {
    false
}
