//! 通用工具函数

use serde::Serialize;

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 50;

/// 页码上限，保证偏移量不溢出
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// 分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// 从查询参数构造分页请求，无法解析的值回落到默认值
    pub fn from_params(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        let page = parse_int(page).unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = parse_int(limit)
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// 根据总条数生成分页信息
    pub fn paginate(&self, total_items: i64) -> Pagination {
        let total_pages = if total_items <= 0 {
            0
        } else {
            total_items.saturating_add(self.limit - 1) / self.limit
        };

        Pagination {
            current_page: self.page,
            page_size: self.limit,
            total_items,
            total_pages,
            has_next_page: self.page < total_pages,
            has_previous_page: self.page > 1,
        }
    }
}

/// 分页信息
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// 解析整数前缀，"12abc" 解析为 12
fn parse_int(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    let end = value
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// 去除空白后为空的字符串视为缺失
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
