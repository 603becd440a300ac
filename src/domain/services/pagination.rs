use serde::Serialize;
use url::form_urlencoded;

/// Pages either side of the current one that get their own link.
const WINDOW: i64 = 2;
/// Anything above this is past the end of every listing anyway.
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Unparseable or non-positive page numbers fall back to page 1; huge ones are capped at `MAX_PAGE`.
    pub fn new(page: Option<&str>, per_page: i64) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .map_or(1, |p| p.min(MAX_PAGE));
        Self { page, per_page }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

pub fn total_pages(total_items: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    (total_items + per_page - 1) / per_page
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PageLink {
    pub number: i64,
    pub url: String,
    pub current: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct Pager {
    pub current: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub first_url: Option<String>,
    pub last_url: Option<String>,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
    pub pages: Vec<PageLink>,
}

impl Pager {
    /// `params` are the active filters; every generated link carries them plus `page`.
    pub fn build(request: &PageRequest, total_items: i64, base_path: &str, params: &[(&str, Option<String>)]) -> Self {
        let total = total_pages(total_items, request.per_page);
        let current = request.page;
        let link = |n: i64| page_url(base_path, params, n);

        let (start, end) = if total == 0 {
            (1, 0)
        } else {
            let center = current.min(total);
            ((center - WINDOW).max(1), (center + WINDOW).min(total))
        };

        let pages = (start..=end)
            .map(|n| PageLink { number: n, url: link(n), current: n == current })
            .collect();

        Self {
            current,
            total_pages: total,
            total_items,
            prev_url: (current > 1 && total > 0).then(|| link((current - 1).min(total))),
            next_url: (current < total).then(|| link(current + 1)),
            first_url: (start > 1).then(|| link(1)),
            last_url: (end < total && total > 0).then(|| link(total)),
            leading_ellipsis: start > 2,
            trailing_ellipsis: end < total - 1,
            pages,
        }
    }

    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

pub fn page_url(base_path: &str, params: &[(&str, Option<String>)], page: i64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }
    query.append_pair("page", &page.to_string());
    format!("{}?{}", base_path, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(pager: &Pager) -> Vec<i64> {
        pager.pages.iter().map(|p| p.number).collect()
    }

    #[test]
    fn last_page_is_ceiling_of_items_over_page_size() {
        assert_eq!(total_pages(0, 9), 0);
        assert_eq!(total_pages(9, 9), 1);
        assert_eq!(total_pages(10, 9), 2);
        assert_eq!(total_pages(27, 9), 3);
    }

    #[test]
    fn invalid_page_numbers_clamp_to_first_page() {
        assert_eq!(PageRequest::new(Some("0"), 9).page, 1);
        assert_eq!(PageRequest::new(Some("-4"), 9).page, 1);
        assert_eq!(PageRequest::new(Some("abc"), 9).page, 1);
        assert_eq!(PageRequest::new(None, 9).offset(), 0);
        assert_eq!(PageRequest::new(Some("3"), 9).offset(), 18);
    }

    #[test]
    fn huge_page_numbers_are_capped_without_overflow() {
        let request = PageRequest::new(Some("9223372036854775807"), 9);
        assert_eq!(request.page, MAX_PAGE);
        assert_eq!(request.offset(), (MAX_PAGE - 1) * 9);
        assert_eq!(PageRequest { page: i64::MAX, per_page: 20 }.offset(), i64::MAX);

        let pager = Pager::build(&request, 30, "/events", &[]);
        assert_eq!(pager.total_pages, 4);
        assert!(pager.next_url.is_none());
        assert_eq!(pager.prev_url.as_deref(), Some("/events?page=4"));
    }

    #[test]
    fn window_shows_two_pages_each_side_with_ellipses() {
        let pager = Pager::build(&PageRequest { page: 6, per_page: 10 }, 200, "/events", &[]);
        assert_eq!(numbers(&pager), vec![4, 5, 6, 7, 8]);
        assert!(pager.leading_ellipsis);
        assert!(pager.trailing_ellipsis);
        assert_eq!(pager.first_url.as_deref(), Some("/events?page=1"));
        assert_eq!(pager.last_url.as_deref(), Some("/events?page=20"));
        assert_eq!(pager.prev_url.as_deref(), Some("/events?page=5"));
        assert_eq!(pager.next_url.as_deref(), Some("/events?page=7"));
    }

    #[test]
    fn no_ellipsis_when_window_touches_the_edges() {
        let pager = Pager::build(&PageRequest { page: 3, per_page: 10 }, 50, "/events", &[]);
        assert_eq!(numbers(&pager), vec![1, 2, 3, 4, 5]);
        assert!(pager.first_url.is_none());
        assert!(pager.last_url.is_none());
        assert!(!pager.leading_ellipsis);
        assert!(!pager.trailing_ellipsis);

        let pager = Pager::build(&PageRequest { page: 4, per_page: 10 }, 60, "/events", &[]);
        assert_eq!(pager.first_url.as_deref(), Some("/events?page=1"));
        assert!(!pager.leading_ellipsis);
    }

    #[test]
    fn links_keep_active_filters() {
        let params = [("search", Some("rust lab".to_string())), ("category", None), ("timeframe", Some("past".to_string()))];
        let pager = Pager::build(&PageRequest { page: 1, per_page: 9 }, 30, "/events", &params);
        assert_eq!(pager.next_url.as_deref(), Some("/events?search=rust+lab&timeframe=past&page=2"));
        assert!(pager.prev_url.is_none());
    }

    #[test]
    fn page_past_the_end_still_builds() {
        let pager = Pager::build(&PageRequest { page: 9, per_page: 9 }, 10, "/events", &[]);
        assert_eq!(pager.total_pages, 2);
        assert!(pager.next_url.is_none());
        assert_eq!(pager.prev_url.as_deref(), Some("/events?page=2"));
        assert_eq!(numbers(&pager), vec![1, 2]);
        assert!(pager.pages.iter().all(|p| !p.current));
    }
}
