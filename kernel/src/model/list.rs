pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

// ページネーションの範囲を指定するための設定値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: i64,
    pub offset: i64,
}

impl ListOptions {
    /// Builds the limit/offset pair for a 1-based page number.
    pub fn from_page(page: i64, limit: i64) -> Self {
        let limit = limit.clamp(1, MAX_LIMIT);
        let page = page.max(1);
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::from_page(1, DEFAULT_LIMIT)
    }
}

#[derive(Debug)]
pub struct PaginatedList<T> {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 10, 10, 0)]
    #[case(3, 20, 20, 40)]
    #[case(0, 10, 10, 0)]
    #[case(2, 0, 1, 1)]
    #[case(1, 500, MAX_LIMIT, 0)]
    fn page_to_offset(
        #[case] page: i64,
        #[case] limit: i64,
        #[case] expected_limit: i64,
        #[case] expected_offset: i64,
    ) {
        let opts = ListOptions::from_page(page, limit);
        assert_eq!(opts.limit, expected_limit);
        assert_eq!(opts.offset, expected_offset);
    }
}
