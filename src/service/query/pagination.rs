use crate::models::{PageInfo, PageSlot};

/// Pages shown on either side of the current one in the selector.
const PAGE_WINDOW: usize = 2;

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Pull a requested page back into `1..=total_pages` (1 when there are none).
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size).max(1))
}

pub fn page_info(page: usize, page_size: usize, total_items: usize) -> PageInfo {
    let page = page.max(1);
    let pages = total_pages(total_items, page_size);
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total_items);
    let (first_item, last_item) = if start < end { (start + 1, end) } else { (0, 0) };

    PageInfo {
        page,
        page_size,
        total_pages: pages,
        first_item,
        last_item,
        has_previous: page > 1,
        has_next: page < pages,
    }
}

/// Page selector entries: first and last page always, a window around the
/// current page, and gaps where pages are skipped. E.g. page 6 of 20 gives
/// `1 … 4 5 6 7 8 … 20`. A current page past the end reads as the last page.
pub fn visible_pages(current: usize, total_pages: usize) -> Vec<PageSlot> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let mut slots = vec![PageSlot::Page(1)];
    let low = current.saturating_sub(PAGE_WINDOW).max(2);
    let high = current.saturating_add(PAGE_WINDOW).min(total_pages.saturating_sub(1));

    if current.saturating_sub(PAGE_WINDOW) > 2 {
        slots.push(PageSlot::Gap);
    }
    slots.extend((low..=high).map(PageSlot::Page));
    if current.saturating_add(PAGE_WINDOW) < total_pages.saturating_sub(1) {
        slots.push(PageSlot::Gap);
    }
    if total_pages > 1 {
        slots.push(PageSlot::Page(total_pages));
    }
    slots
}
