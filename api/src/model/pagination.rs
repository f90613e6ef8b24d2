use garde::Validate;
use kernel::model::list::{ListOptions, PaginatedList, DEFAULT_LIMIT, MAX_LIMIT};
use serde::{Deserialize, Serialize};

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaginationQuery {
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[garde(range(min = 1, max = MAX_LIMIT))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl From<PaginationQuery> for ListOptions {
    fn from(value: PaginationQuery) -> Self {
        ListOptions::from_page(value.page, value.limit)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub limit: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(total_count: i64, limit: i64, offset: i64) -> Self {
        let limit = limit.max(1);
        let current_page = offset / limit + 1;
        let total_pages = (total_count + limit - 1) / limit;
        Self {
            current_page,
            total_pages,
            total_count,
            limit,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn from_list<U>(list: PaginatedList<U>) -> Self
    where
        T: From<U>,
    {
        let PaginatedList {
            total,
            limit,
            offset,
            items,
        } = list;
        Self {
            items: items.into_iter().map(T::from).collect(),
            pagination: PaginationMeta::new(total, limit, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(25, 10, 0, 1, 3, true, false)]
    #[case(25, 10, 20, 3, 3, false, true)]
    #[case(30, 10, 10, 2, 3, true, true)]
    #[case(0, 10, 0, 1, 0, false, false)]
    fn pagination_flags(
        #[case] total: i64,
        #[case] limit: i64,
        #[case] offset: i64,
        #[case] current: i64,
        #[case] pages: i64,
        #[case] next: bool,
        #[case] prev: bool,
    ) {
        let meta = PaginationMeta::new(total, limit, offset);
        assert_eq!(meta.current_page, current);
        assert_eq!(meta.total_pages, pages);
        assert_eq!(meta.has_next_page, next);
        assert_eq!(meta.has_prev_page, prev);
    }

    #[rstest]
    #[case(0, 10, false)]
    #[case(1, 0, false)]
    #[case(1, 101, false)]
    #[case(2, 100, true)]
    fn query_bounds(#[case] page: i64, #[case] limit: i64, #[case] ok: bool) {
        assert_eq!(PaginationQuery { page, limit }.validate(&()).is_ok(), ok);
    }

    #[test]
    fn list_options_from_query() {
        let options: ListOptions = PaginationQuery { page: 3, limit: 20 }.into();
        assert_eq!(options.offset, 40);
        assert_eq!(options.limit, 20);
    }
}
