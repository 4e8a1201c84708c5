/// Posts shown per page of the public list view.
pub const PAGE_SIZE: i64 = 15;

/// A computed page window over a sorted, counted result set.
///
/// `current_page` is 1-based; the sentinel value `-1` (with `offset = 0`)
/// means the collection is empty and the caller should render an empty-state
/// view instead of a page of zero items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub current_page: i64,
    pub page_count: i64,
    pub offset: i64,
    pub limit: i64,
    pub is_last_page: bool,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.current_page == -1
    }
}

/// Compute the page window for `requested_page` over `total` items.
///
/// Out-of-range pages clamp into `[1, page_count]` rather than erroring, so a
/// stale link to a page that no longer exists still renders the last page.
pub fn paginate(total: i64, requested_page: i64, page_size: i64) -> PageWindow {
    debug_assert!(page_size > 0);

    if total <= 0 {
        return PageWindow {
            current_page: -1,
            page_count: 1,
            offset: 0,
            limit: page_size,
            is_last_page: true,
        };
    }

    let page_count = (total + page_size - 1) / page_size;
    let current_page = requested_page.clamp(1, page_count);

    PageWindow {
        current_page,
        page_count,
        offset: (current_page - 1) * page_size,
        limit: page_size,
        is_last_page: current_page == page_count,
    }
}
