use std::cmp::Ordering;

use super::Article;
use crate::error::{Error, Result};

/// 文章过滤条件，多个条件之间为 AND 关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    /// 标题包含给定子串（区分大小写）
    TitleContains(String),
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        match self {
            ArticleFilter::TitleContains(s) => article.title.contains(s.as_str()),
        }
    }
}

/// 排序方式，相同时间时按 id 倒序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSort {
    ModifyTimeDesc,
    /// 未发布的文章排在最后
    PublishTimeDesc,
}

impl ArticleSort {
    pub fn compare(&self, a: &Article, b: &Article) -> Ordering {
        let ord = match self {
            ArticleSort::ModifyTimeDesc => b.modify_time.cmp(&a.modify_time),
            ArticleSort::PublishTimeDesc => match (a.publish_time, b.publish_time) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        ord.then_with(|| b.id.cmp(&a.id))
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            ArticleSort::ModifyTimeDesc => " ORDER BY a.modify_time DESC, a.id DESC",
            ArticleSort::PublishTimeDesc => " ORDER BY a.publish_time DESC NULLS LAST, a.id DESC",
        }
    }
}

/// 分页列表查询条件
///
/// 页码从 0 开始，结果固定按修改时间倒序。
#[derive(Debug, Clone)]
pub struct ArticleCondition {
    filters: Vec<ArticleFilter>,
    page: u32,
    page_size: u32,
}

impl ArticleCondition {
    /// 标题为空或全是空白时不加过滤条件
    pub fn new(title: Option<&str>, page: u32, page_size: u32) -> Self {
        let filters = title
            .filter(|t| !t.trim().is_empty())
            .map(|t| ArticleFilter::TitleContains(t.to_string()))
            .into_iter()
            .collect();

        Self {
            filters,
            page,
            page_size,
        }
    }

    pub fn filters(&self) -> &[ArticleFilter] {
        &self.filters
    }

    pub fn sort(&self) -> ArticleSort {
        ArticleSort::ModifyTimeDesc
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidArgument(
                "page size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::content::ArticleStatus;

    fn titled(id: i64, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            body: String::new(),
            status: ArticleStatus::Draft,
            publish_time: None,
            modify_time: Local::now(),
            category_id: 1,
            category_name: "tech".to_string(),
            tag_ids: vec![],
        }
    }

    #[test]
    fn test_blank_title_adds_no_filter() {
        assert!(ArticleCondition::new(None, 0, 10).filters().is_empty());
        assert!(ArticleCondition::new(Some(""), 0, 10).filters().is_empty());
        assert!(ArticleCondition::new(Some("   "), 0, 10).filters().is_empty());
    }

    #[test]
    fn test_title_becomes_contains_filter() {
        let cond = ArticleCondition::new(Some("Rust"), 2, 10);
        assert_eq!(
            cond.filters(),
            &[ArticleFilter::TitleContains("Rust".to_string())]
        );
        assert_eq!(cond.offset(), 20);
        assert_eq!(cond.limit(), 10);
        assert_eq!(cond.sort(), ArticleSort::ModifyTimeDesc);
    }

    #[test]
    fn test_title_contains_is_case_sensitive() {
        let filter = ArticleFilter::TitleContains("Rust".to_string());
        assert!(filter.matches(&titled(1, "Learning Rust")));
        assert!(!filter.matches(&titled(2, "learning rust")));
        assert!(!filter.matches(&titled(3, "Go basics")));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = ArticleCondition::new(None, 0, 0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_publish_time_sort_puts_drafts_last() {
        let mut old = titled(1, "old");
        old.publish_time = Some(Local.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
        let mut new = titled(2, "new");
        new.publish_time = Some(Local.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let draft = titled(3, "draft");

        let mut articles = vec![draft, old, new];
        articles.sort_by(|a, b| ArticleSort::PublishTimeDesc.compare(a, b));
        let ids: Vec<_> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
