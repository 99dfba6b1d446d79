//! 分页查询与分页响应

use serde::{Deserialize, Serialize};

/// 分页查询参数（`?current=1&pageSize=10`）
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub current: Option<i64>,
    #[serde(rename = "pageSize", default)]
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// 归一化为 (current, limit, offset)
    pub fn normalize(&self) -> (i64, i64, i64) {
        let current = self.current.unwrap_or(1).max(1);
        let limit = self.page_size.unwrap_or(10).clamp(1, 100);
        let offset = (current - 1) * limit;
        (current, limit, offset)
    }
}

/// 分页元信息
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub current: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub pages: i64,
    pub total: i64,
}

/// 分页响应
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub result: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(current: i64, page_size: i64, total: i64, result: Vec<T>) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            meta: PageMeta {
                current,
                page_size,
                pages,
                total,
            },
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.normalize(), (1, 10, 0));
    }

    #[test]
    fn test_normalize_offset() {
        let q = PageQuery {
            current: Some(3),
            page_size: Some(20),
        };
        assert_eq!(q.normalize(), (3, 20, 40));
    }

    #[test]
    fn test_page_count_rounds_up() {
        let page = Paginated::<i32>::new(1, 10, 21, vec![]);
        assert_eq!(page.meta.pages, 3);
    }
}
