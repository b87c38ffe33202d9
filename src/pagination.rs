//! Page-at-a-time reads over filtered and sorted collections.
//!
//! Repositories describe a collection with two closures: one counting every
//! row that matches the filters and one loading a window of the sorted rows.
//! [`paginate`] stitches them together into a [`Paginated`] page carrying the
//! totals and the navigation window rendered by templates.

use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 6;

/// Requested page of a collection. Both values are 1-based and never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    /// Builds a request, lifting zero page numbers and sizes to one.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of rows preceding the requested page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_ITEMS_PER_PAGE)
    }
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    // Pages past the end get the window of the last page.
    let current_page = current_page.min(last_page);
    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One page of items plus the totals of the collection it was cut from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Page number the items belong to (1-based).
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    /// Number of rows matching the filters, across all pages.
    pub total_count: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    /// Navigation window; `None` marks an elided range.
    pub pages: Vec<Option<usize>>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: usize) -> Self {
        let total_pages = total_count.div_ceil(request.per_page);
        let pages = get_pages(total_pages, request.page, 2, 2, 4, 2);

        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_pages,
            total_count,
            has_previous_page: request.page > 1,
            has_next_page: request.page < total_pages,
            pages,
        }
    }

    /// Converts the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            pages: self.pages,
        }
    }

    /// Fallible variant of [`Paginated::map`].
    pub fn try_map<U, E, F>(self, f: F) -> Result<Paginated<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(Paginated {
            items,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            pages: self.pages,
        })
    }
}

/// Counts the whole filtered collection, then loads the requested window.
///
/// Both steps run against the same `ctx` (usually a database connection);
/// `load` also receives `(offset, limit)`, where `offset + limit` never
/// exceeds the counted total. Pages past the end are not clamped: they come
/// back empty with the real totals and `load` is not called.
pub fn paginate<Ctx, T, E, C, L>(
    request: PageRequest,
    ctx: &mut Ctx,
    count: C,
    load: L,
) -> Result<Paginated<T>, E>
where
    Ctx: ?Sized,
    C: FnOnce(&mut Ctx) -> Result<usize, E>,
    L: FnOnce(&mut Ctx, usize, usize) -> Result<Vec<T>, E>,
{
    let total_count = count(ctx)?;
    let offset = request.offset();
    let items = if offset < total_count {
        load(ctx, offset, request.per_page.min(total_count - offset))?
    } else {
        Vec::new()
    };
    Ok(Paginated::new(items, request, total_count))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    fn paginate_vec(source: &[u32], page: usize, per_page: usize) -> Paginated<u32> {
        let request = PageRequest::new(page, per_page);
        let result: Result<_, Infallible> = paginate(
            request,
            &mut (),
            |_| Ok(source.len()),
            |_, offset, limit| Ok(source.iter().skip(offset).take(limit).copied().collect()),
        );
        match result {
            Ok(page) => page,
            Err(never) => match never {},
        }
    }

    #[test]
    fn page_length_matches_remaining_items() {
        let source: Vec<u32> = (1..=23).collect();
        for per_page in 1..=10 {
            for page in 1..=8 {
                let result = paginate_vec(&source, page, per_page);
                let remaining = source.len().saturating_sub((page - 1) * per_page);
                assert_eq!(result.items.len(), per_page.min(remaining));
                assert_eq!(result.total_pages, source.len().div_ceil(per_page));
                assert_eq!(result.total_count, source.len());
            }
        }
    }

    #[test]
    fn single_large_page_returns_everything_in_order() {
        let source: Vec<u32> = vec![5, 3, 9, 1];
        let result = paginate_vec(&source, 1, 10);
        assert_eq!(result.items, source);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_previous_page);
        assert!(!result.has_next_page);
    }

    #[test]
    fn page_beyond_end_is_empty_with_real_totals() {
        let source: Vec<u32> = (1..=7).collect();
        let result = paginate_vec(&source, 5, 3);
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_count, 7);
        assert!(result.has_previous_page);
        assert!(!result.has_next_page);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let source: Vec<u32> = (1..=20).collect();
        let result = paginate_vec(&source, 2, 6);
        assert_eq!(result.items, vec![7, 8, 9, 10, 11, 12]);
        assert!(result.has_previous_page);
        assert!(result.has_next_page);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let result = paginate_vec(&[], 1, 6);
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 0);
        assert!(result.pages.is_empty());
        assert!(!result.has_next_page);
    }

    #[test]
    fn zero_request_values_are_lifted() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request, PageRequest::new(1, 1));
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn count_errors_short_circuit_loading() {
        let result: Result<Paginated<u32>, &str> = paginate(
            PageRequest::default(),
            &mut (),
            |_| Err("count failed"),
            |_, _, _| panic!("load must not run"),
        );
        assert_eq!(result.unwrap_err(), "count failed");
    }

    #[test]
    fn navigation_window_elides_distant_pages() {
        assert_eq!(
            get_pages(20, 10, 2, 2, 4, 2),
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20)
            ]
        );
        assert_eq!(get_pages(3, 1, 2, 2, 4, 2), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let source: Vec<u32> = (1..=3).collect();
        for page in [usize::MAX, usize::MAX / 2, 1 << 61] {
            let result = paginate_vec(&source, page, 6);
            assert!(result.items.is_empty());
            assert_eq!(result.total_count, 3);
            assert_eq!(result.total_pages, 1);
            assert!(!result.has_next_page);
        }
        assert_eq!(get_pages(3, usize::MAX, 2, 2, 4, 2), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn load_is_skipped_past_the_end_and_limited_to_the_total() {
        let skipped: Result<Paginated<u32>, Infallible> = paginate(
            PageRequest::new(4, 5),
            &mut (),
            |_| Ok(15),
            |_, _, _| panic!("load must not run"),
        );
        assert!(skipped.is_ok_and(|page| page.items.is_empty()));

        let mut seen = None;
        let _: Result<Paginated<u32>, Infallible> = paginate(
            PageRequest::new(2, usize::MAX),
            &mut seen,
            |_| Ok(15),
            |seen, offset, limit| {
                *seen = Some((offset, limit));
                Ok(Vec::new())
            },
        );
        assert_eq!(seen, None);

        let _: Result<Paginated<u32>, Infallible> = paginate(
            PageRequest::new(1, usize::MAX),
            &mut seen,
            |_| Ok(15),
            |seen, offset, limit| {
                *seen = Some((offset, limit));
                Ok(Vec::new())
            },
        );
        assert_eq!(seen, Some((0, 15)));
    }

    #[test]
    fn map_keeps_metadata() {
        let source: Vec<u32> = (1..=10).collect();
        let page = paginate_vec(&source, 2, 4).map(|n| n * 10);
        assert_eq!(page.items, vec![50, 60, 70, 80]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
