pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Limit/offset pagination clamped to sane bounds; never rejects, only clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        Pagination { limit, offset }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let page = Pagination::new(None, None);
        assert_eq!(page.limit(), DEFAULT_LIMIT);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        assert_eq!(Pagination::new(Some(0), None).limit(), 1);
        assert_eq!(Pagination::new(Some(-5), None).limit(), 1);
        assert_eq!(Pagination::new(Some(10_000), None).limit(), MAX_LIMIT);
    }

    #[test]
    fn negative_offset_is_clamped() {
        assert_eq!(Pagination::new(None, Some(-1)).offset(), 0);
        assert_eq!(Pagination::new(None, Some(40)).offset(), 40);
    }
}
