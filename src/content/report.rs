use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local};
use serde::Serialize;

use super::Article;

/// 按本地时区自然月聚合出的原始计数
#[derive(Debug, Clone)]
pub struct MonthCount {
    pub year: i32,
    /// 1–12
    pub month: i32,
    pub count: i64,
    /// 该月最晚的发布时间，用于排序
    pub latest: DateTime<Local>,
}

impl MonthCount {
    /// 按本地时区的年月统计发布时间，最近的月份在前
    ///
    /// 两种存储都走这里，保证与 [`Article::publish_year`] 使用同一个时区。
    pub fn tally(times: impl IntoIterator<Item = DateTime<Local>>) -> Vec<MonthCount> {
        let mut months: BTreeMap<(i32, u32), MonthCount> = BTreeMap::new();
        for t in times {
            months
                .entry((t.year(), t.month()))
                .and_modify(|m| {
                    m.count += 1;
                    m.latest = m.latest.max(t);
                })
                .or_insert_with(|| MonthCount {
                    year: t.year(),
                    month: t.month() as i32,
                    count: 1,
                    latest: t,
                });
        }

        let mut rows: Vec<MonthCount> = months.into_values().collect();
        rows.sort_by(|a, b| b.latest.cmp(&a.latest));
        rows
    }
}

/// 归档条目：`MM-YYYY` 格式的月份及该月文章数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveBucket {
    pub month: String,
    pub count: i64,
}

impl ArchiveBucket {
    pub fn new(month: impl Into<String>, count: i64) -> Self {
        Self {
            month: month.into(),
            count,
        }
    }
}

impl From<&MonthCount> for ArchiveBucket {
    fn from(row: &MonthCount) -> Self {
        Self::new(format!("{:02}-{:04}", row.month, row.year), row.count)
    }
}

/// 某一年发布的文章，按发布时间倒序
#[derive(Debug, Clone)]
pub struct YearGroup {
    pub year: i32,
    pub articles: Vec<Article>,
}

/// 分页结果，`page` 从 0 开始
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    /// 满足条件的总数
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_bucket_key_is_zero_padded() {
        let row = MonthCount {
            year: 2023,
            month: 1,
            count: 2,
            latest: Local.with_ymd_and_hms(2023, 1, 20, 0, 0, 0).unwrap(),
        };
        assert_eq!(ArchiveBucket::from(&row), ArchiveBucket::new("01-2023", 2));
    }

    #[test]
    fn test_tally_groups_by_local_month() {
        let times = [
            Local.with_ymd_and_hms(2022, 12, 31, 23, 30, 0).unwrap(),
            Local.with_ymd_and_hms(2023, 1, 1, 0, 30, 0).unwrap(),
            Local.with_ymd_and_hms(2023, 1, 20, 8, 0, 0).unwrap(),
            Local.with_ymd_and_hms(2022, 1, 2, 8, 0, 0).unwrap(),
        ];

        let rows = MonthCount::tally(times);
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (ArchiveBucket::from(r).month, r.count))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("01-2023".to_string(), 2),
                ("12-2022".to_string(), 1),
                ("01-2022".to_string(), 1),
            ]
        );
        assert_eq!(rows[0].latest, times[2]);
    }

    #[test]
    fn test_page_map_keeps_paging() {
        let page = Page {
            items: vec![1, 2, 3],
            page: 1,
            page_size: 3,
            total: 7,
        };
        let page = page.map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!((page.page, page.page_size, page.total), (1, 3, 7));
    }
}
