//! Storefront chrome state: search overlay, contact modal, mobile menu and
//! the auto-hiding header.

/// Above this offset the header is always shown.
const HEADER_PINNED_ZONE: f64 = 50.0;
/// Scrolling down hides the header only past this offset.
const HEADER_HIDE_AFTER: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    search_open: bool,
    search_query: String,
    contact_open: bool,
    mobile_menu_open: bool,
    header_visible: bool,
    last_scroll_y: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search_open: false,
            search_query: String::new(),
            contact_open: false,
            mobile_menu_open: false,
            header_visible: true,
            last_scroll_y: 0.0,
        }
    }
}

impl UiState {
    pub fn new() -> Self { Self::default() }

    pub fn is_search_open(&self) -> bool { self.search_open }
    pub fn search_query(&self) -> &str { &self.search_query }
    pub fn is_contact_open(&self) -> bool { self.contact_open }
    pub fn is_mobile_menu_open(&self) -> bool { self.mobile_menu_open }
    pub fn is_header_visible(&self) -> bool { self.header_visible }

    pub fn open_search(&mut self) { self.search_open = true; }

    /// Closing the overlay also clears the query.
    pub fn close_search(&mut self) {
        self.search_open = false;
        self.search_query.clear();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) { self.search_query = query.into(); }

    pub fn open_contact(&mut self) { self.contact_open = true; }
    pub fn close_contact(&mut self) { self.contact_open = false; }

    pub fn toggle_mobile_menu(&mut self) { self.mobile_menu_open = !self.mobile_menu_open; }
    pub fn close_mobile_menu(&mut self) { self.mobile_menu_open = false; }

    /// Feeds a new scroll offset. Small downward moves near the top and
    /// unchanged offsets leave the header as it is.
    pub fn update_scroll(&mut self, scroll_y: f64) {
        let last = self.last_scroll_y;
        if scroll_y < HEADER_PINNED_ZONE {
            self.header_visible = true;
            self.last_scroll_y = scroll_y;
        } else if scroll_y > last && scroll_y > HEADER_HIDE_AFTER {
            self.header_visible = false;
            self.last_scroll_y = scroll_y;
        } else if scroll_y < last {
            self.header_visible = true;
            self.last_scroll_y = scroll_y;
        }
    }
}
