//! Filter, sort and page in-memory lists
//!
//! List endpoints fetch a full collection and narrow it here with a chain
//! of [`ItemFilter`]s, a [`SortSpec`] and a fixed page size.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Page size of the service request list.
pub const REQUESTS_PAGE_SIZE: usize = 10;
/// Page size of the unit grid (three columns of three).
pub const UNITS_PAGE_SIZE: usize = 9;

/// Page number with its numbering base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIndex {
    /// First page is 1. `OneBased(0)` is read as the first page.
    OneBased(usize),
    /// First page is 0.
    ZeroBased(usize),
}

impl PageIndex {
    fn zero_based(self) -> usize {
        match self {
            Self::OneBased(n) => n.saturating_sub(1),
            Self::ZeroBased(n) => n,
        }
    }
}

/// A predicate in a filter chain.
pub trait ItemFilter<T> {
    fn matches(&self, item: &T) -> bool;
}

impl<T, F> ItemFilter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}

/// Keeps items whose status equals `wanted`, ignoring ASCII case.
/// No wanted status keeps everything.
pub struct StatusFilter<'a, T> {
    wanted: Option<&'a str>,
    status: fn(&T) -> &str,
}

impl<'a, T> StatusFilter<'a, T> {
    pub fn new(wanted: Option<&'a str>, status: fn(&T) -> &str) -> Self {
        Self { wanted, status }
    }
}

impl<T> ItemFilter<T> for StatusFilter<'_, T> {
    fn matches(&self, item: &T) -> bool {
        match self.wanted.map(str::trim).filter(|w| !w.is_empty()) {
            Some(wanted) => wanted.eq_ignore_ascii_case((self.status)(item)),
            None => true,
        }
    }
}

/// Keeps items whose date falls inside `[from, to]`. Either end may be open.
pub struct DateRangeFilter<T> {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    date: fn(&T) -> DateTime<Utc>,
}

impl<T> DateRangeFilter<T> {
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        date: fn(&T) -> DateTime<Utc>,
    ) -> Self {
        Self { from, to, date }
    }
}

impl<T> ItemFilter<T> for DateRangeFilter<T> {
    fn matches(&self, item: &T) -> bool {
        let date = (self.date)(item);
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Case-insensitive substring search over one or more text fields.
/// A blank query keeps everything.
pub struct TextFilter<T> {
    needle: Option<String>,
    fields: Vec<fn(&T) -> Option<&str>>,
}

impl<T> TextFilter<T> {
    pub fn new(query: Option<&str>, fields: Vec<fn(&T) -> Option<&str>>) -> Self {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        Self { needle, fields }
    }
}

impl<T> ItemFilter<T> for TextFilter<T> {
    fn matches(&self, item: &T) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        self.fields
            .iter()
            .filter_map(|field| field(item))
            .any(|value| value.to_lowercase().contains(needle.as_str()))
    }
}

/// Ordering applied after filtering. The sort is stable.
pub struct SortSpec<'a, T> {
    compare: Option<Box<dyn Fn(&T, &T) -> Ordering + 'a>>,
}

impl<'a, T> SortSpec<'a, T> {
    pub fn by(compare: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        Self {
            compare: Some(Box::new(compare)),
        }
    }

    /// Descending by a date field, the default for list screens.
    pub fn newest_first(date: fn(&T) -> DateTime<Utc>) -> Self
    where
        T: 'a,
    {
        Self::by(move |a, b| date(b).cmp(&date(a)))
    }

    /// Keep the input order.
    pub fn unsorted() -> Self {
        Self { compare: None }
    }
}

/// One page of a filtered, sorted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub page_items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Filter `items` through every predicate, sort them and cut out `page`.
///
/// A `page_size` of 0 is treated as 1. Pages past the end come back empty
/// with the real `total_pages`.
pub fn paginate_filter_sort<T>(
    items: impl IntoIterator<Item = T>,
    filters: &[&dyn ItemFilter<T>],
    sort: &SortSpec<'_, T>,
    page: PageIndex,
    page_size: usize,
) -> PageResult<T> {
    let page_size = page_size.max(1);

    let mut matching: Vec<T> = items
        .into_iter()
        .filter(|item| filters.iter().all(|f| f.matches(item)))
        .collect();

    if let Some(compare) = &sort.compare {
        matching.sort_by(|a, b| compare(a, b));
    }

    let total_items = matching.len();
    let total_pages = total_items.div_ceil(page_size);
    let start = page.zero_based().saturating_mul(page_size);

    let page_items = matching.into_iter().skip(start).take(page_size).collect();

    PageResult {
        page_items,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        status: &'static str,
        title: &'static str,
        note: Option<&'static str>,
        created_at: DateTime<Utc>,
    }

    fn row(id: u32, status: &'static str, title: &'static str, day: u32) -> Row {
        Row {
            id,
            status,
            title,
            note: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row(1, "PENDING", "Leaking pipe", 1),
            row(2, "DONE", "Broken lift", 2),
            row(3, "PENDING", "Noisy neighbour", 3),
            row(4, "IN_PROGRESS", "Pipe burst", 4),
            row(5, "PENDING", "Door lock", 5),
        ]
    }

    fn title_of(r: &Row) -> Option<&str> {
        Some(r.title)
    }

    fn note_of(r: &Row) -> Option<&str> {
        r.note
    }

    fn ids(result: &PageResult<Row>) -> Vec<u32> {
        result.page_items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn default_sort_is_newest_first() {
        let sort = SortSpec::newest_first(|r: &Row| r.created_at);
        let result = paginate_filter_sort(rows(), &[], &sort, PageIndex::OneBased(1), 10);
        assert_eq!(ids(&result), vec![5, 4, 3, 2, 1]);
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn one_and_zero_based_pages_agree() {
        let sort = SortSpec::unsorted();
        let one = paginate_filter_sort(rows(), &[], &sort, PageIndex::OneBased(2), 2);
        let zero = paginate_filter_sort(rows(), &[], &sort, PageIndex::ZeroBased(1), 2);
        assert_eq!(ids(&one), vec![3, 4]);
        assert_eq!(one, zero);
        assert_eq!(one.total_pages, 3);
        assert_eq!(one.total_items, 5);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let sort = SortSpec::unsorted();
        let result = paginate_filter_sort(rows(), &[], &sort, PageIndex::OneBased(9), 2);
        assert!(result.page_items.is_empty());
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let sort = SortSpec::unsorted();
        let result = paginate_filter_sort(rows(), &[], &sort, PageIndex::OneBased(1), 0);
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.total_pages, 5);
    }

    #[test]
    fn filters_are_chained() {
        let status = StatusFilter::new(Some("pending"), |r: &Row| r.status);
        let range = DateRangeFilter::new(
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
            None,
            |r: &Row| r.created_at,
        );
        let sort = SortSpec::newest_first(|r: &Row| r.created_at);
        let result = paginate_filter_sort(
            rows(),
            &[&status, &range],
            &sort,
            PageIndex::OneBased(1),
            REQUESTS_PAGE_SIZE,
        );
        assert_eq!(ids(&result), vec![5, 3]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let day3 = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();
        let range = DateRangeFilter::new(Some(day3), Some(day3), |r: &Row| r.created_at);
        let sort = SortSpec::unsorted();
        let result = paginate_filter_sort(rows(), &[&range], &sort, PageIndex::ZeroBased(0), 9);
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn text_search_is_case_insensitive_across_fields() {
        let mut data = rows();
        data[1].note = Some("tenant reports PIPE noise");
        let text = TextFilter::new(Some("  pipe "), vec![title_of, note_of]);
        let sort = SortSpec::unsorted();
        let result = paginate_filter_sort(data, &[&text], &sort, PageIndex::OneBased(1), 10);
        assert_eq!(ids(&result), vec![1, 2, 4]);
    }

    #[test]
    fn blank_filters_keep_everything() {
        let status = StatusFilter::new(Some(" "), |r: &Row| r.status);
        let text = TextFilter::new(Some(""), vec![title_of]);
        let sort = SortSpec::unsorted();
        let result = paginate_filter_sort(
            rows(),
            &[&status, &text],
            &sort,
            PageIndex::OneBased(1),
            UNITS_PAGE_SIZE,
        );
        assert_eq!(result.total_items, 5);
    }

    #[test]
    fn closures_work_as_filters() {
        let odd = |r: &Row| r.id % 2 == 1;
        let sort = SortSpec::by(|a: &Row, b: &Row| b.id.cmp(&a.id));
        let result = paginate_filter_sort(rows(), &[&odd], &sort, PageIndex::OneBased(1), 10);
        assert_eq!(ids(&result), vec![5, 3, 1]);
    }
}
