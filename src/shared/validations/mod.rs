/// Normalize list query parameters: the page is 1-based and at least 1,
/// the limit falls back to `default_limit` and is clamped to `1..=max_limit`.
pub fn validate_pagination(
    page: Option<usize>,
    limit: Option<usize>,
    default_limit: usize,
    max_limit: usize,
) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        assert_eq!(validate_pagination(None, None, 10, 100), (1, 10));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(validate_pagination(Some(0), Some(0), 10, 100), (1, 1));
        assert_eq!(validate_pagination(Some(3), Some(500), 10, 100), (3, 100));
    }
}
