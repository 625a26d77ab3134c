use serde::Serialize;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        let total = total.max(0);
        let limit = i64::from(page.limit);
        let total_pages = u32::try_from((total + limit - 1) / limit).unwrap_or(u32::MAX);
        Self {
            data,
            total,
            page: page.page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        let page = Page::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(2, 10);
        assert_eq!(page.offset(), 10);
        let result = Paginated::new(vec![1, 2, 3], 21, page);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.page, 2);

        let empty: Paginated<u8> = Paginated::new(Vec::new(), 0, Page::first(10));
        assert_eq!(empty.total_pages, 0);
    }
}
