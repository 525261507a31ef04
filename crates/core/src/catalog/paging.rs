//! Page slicing for admin tables and incremental reveal for storefront grids.

use serde::{Deserialize, Serialize};

/// Numbered pagination over an ordered sequence. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPager")]
pub struct Pager {
    page: usize,
    page_size: usize,
}

/// Wire form of [`Pager`]; zeros are lifted to 1 on the way in.
#[derive(Deserialize)]
struct RawPager {
    page: usize,
    page_size: usize,
}

impl From<RawPager> for Pager {
    fn from(raw: RawPager) -> Self {
        Self {
            page: raw.page.max(1),
            ..Self::new(raw.page_size)
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    /// A zero page size is treated as one.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages for `total` items; at least 1.
    #[must_use]
    pub const fn total_pages(&self, total: usize) -> usize {
        let pages = total.div_ceil(self.page_size);
        if pages == 0 { 1 } else { pages }
    }

    /// Items on the current page, with the page clamped to the last one.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let page = self.page.clamp(1, self.total_pages(items.len()));
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        items.get(start..end).unwrap_or_default()
    }

    /// Jump to `page`, clamped to `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.total_pages(total));
    }

    pub fn next(&mut self, total: usize) {
        self.go_to(self.page.saturating_add(1), total);
    }

    pub fn prev(&mut self, total: usize) {
        self.go_to(self.page.saturating_sub(1), total);
    }

    #[must_use]
    pub const fn has_next(&self, total: usize) -> bool {
        self.page < self.total_pages(total)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Change the page size; returns to page 1.
    pub const fn set_page_size(&mut self, page_size: usize) {
        *self = Self::new(page_size);
    }

    /// Back to page 1, for when the filtered sequence changes.
    pub const fn reset(&mut self) {
        self.page = 1;
    }
}

/// Convenience for one-off slicing: items on 1-indexed `page`.
#[must_use]
pub fn page<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let mut pager = Pager::new(page_size);
    pager.go_to(page, items.len());
    pager.slice(items)
}

/// Incremental "show more" reveal over a product grid.
///
/// Starts at [`Reveal::INITIAL`] items and grows by [`Reveal::STEP`] per
/// trigger. The visible slice never exceeds the sequence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    visible: usize,
}

impl Default for Reveal {
    fn default() -> Self {
        Self::new()
    }
}

impl Reveal {
    pub const INITIAL: usize = 8;
    pub const STEP: usize = 4;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            visible: Self::INITIAL,
        }
    }

    /// Current reveal count, which may exceed the sequence length.
    #[must_use]
    pub const fn visible_count(&self) -> usize {
        self.visible
    }

    /// Whether more items would appear after another trigger.
    #[must_use]
    pub const fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// Reveal the next batch. Does nothing once everything is shown.
    pub const fn reveal_more(&mut self, total: usize) {
        if self.has_more(total) {
            self.visible = self.visible.saturating_add(Self::STEP);
        }
    }

    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items
            .get(..self.visible.min(items.len()))
            .unwrap_or_default()
    }

    /// Back to the initial batch, for when filters or sort change.
    pub const fn reset(&mut self) {
        self.visible = Self::INITIAL;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_page_slices() {
        let items = numbers(25);
        assert_eq!(page(&items, 1, 10), &items[0..10]);
        assert_eq!(page(&items, 3, 10), &[21, 22, 23, 24, 25]);
        assert_eq!(Pager::new(10).total_pages(items.len()), 3);
    }

    #[test]
    fn test_pages_partition_the_sequence() {
        for total in [0, 1, 9, 10, 11, 25, 100] {
            let items = numbers(total);
            let mut pager = Pager::new(10);
            let mut seen = Vec::new();
            for p in 1..=pager.total_pages(total) {
                pager.go_to(p, total);
                let slice = pager.slice(&items);
                assert!(slice.len() <= 10);
                seen.extend_from_slice(slice);
            }
            assert_eq!(seen, items, "total = {total}");
        }
    }

    #[test]
    fn test_empty_sequence_has_one_page() {
        let pager = Pager::new(10);
        assert_eq!(pager.total_pages(0), 1);
        assert!(pager.slice::<u8>(&[]).is_empty());
        assert!(!pager.has_next(0));
    }

    #[test]
    fn test_go_to_clamps() {
        let mut pager = Pager::new(10);
        pager.go_to(99, 25);
        assert_eq!(pager.page(), 3);
        pager.go_to(0, 25);
        assert_eq!(pager.page(), 1);
        pager.prev(25);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_stale_page_is_clamped_when_sequence_shrinks() {
        let mut pager = Pager::new(10);
        pager.go_to(3, 25);
        let shrunk = numbers(4);
        assert_eq!(pager.slice(&shrunk), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_page_size_change_resets_to_first_page() {
        let mut pager = Pager::new(10);
        pager.go_to(2, 25);
        pager.set_page_size(5);
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.total_pages(25), 5);
        assert_eq!(Pager::new(0).page_size(), 1);
    }

    #[test]
    fn test_reveal_grows_by_step() {
        let items = numbers(30);
        let mut reveal = Reveal::new();
        assert_eq!(reveal.slice(&items).len(), 8);

        reveal.reveal_more(items.len());
        assert_eq!(reveal.slice(&items).len(), 12);

        reveal.reveal_more(items.len());
        reveal.reveal_more(items.len());
        assert_eq!(reveal.visible_count(), 20);
        assert_eq!(reveal.slice(&items), &items[..20]);

        for _ in 0..10 {
            reveal.reveal_more(items.len());
        }
        assert_eq!(reveal.slice(&items).len(), 30);
        assert!(!reveal.has_more(items.len()));
    }

    #[test]
    fn test_stored_pager_with_zeros_is_normalized() {
        let pager: Pager = serde_json::from_str(r#"{"page":0,"page_size":0}"#).unwrap();
        assert_eq!(pager, Pager::new(1));
        assert_eq!(pager.total_pages(3), 3);
        assert_eq!(pager.slice(&numbers(3)), &[1]);

        let mut saved = Pager::new(5);
        saved.go_to(3, 20);
        let json = serde_json::to_string(&saved).unwrap();
        let restored: Pager = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, saved);
        assert_eq!(restored.slice(&numbers(20)), &[11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_reveal_never_exceeds_total() {
        let items = numbers(5);
        let mut reveal = Reveal::new();
        assert_eq!(reveal.slice(&items), &items[..]);
        reveal.reveal_more(items.len());
        assert_eq!(reveal.visible_count(), Reveal::INITIAL);
    }

    #[test]
    fn test_reveal_reset() {
        let mut reveal = Reveal::new();
        reveal.reveal_more(30);
        reveal.reveal_more(30);
        reveal.reset();
        assert_eq!(reveal.visible_count(), 8);
    }
}
