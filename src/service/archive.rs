use super::ArticleService;
use crate::{
    content::{ArchiveBucket, Article, MonthCount},
    error::{Error, Result},
    storage::Store,
};

impl<S: Store> ArticleService<S> {
    /// 按发布月份统计文章数，最近的月份在前
    ///
    /// 未发布的文章不参与统计。
    pub async fn archive(&self) -> Result<Vec<ArchiveBucket>> {
        let rows = self.store.month_counts().await?;
        Ok(into_buckets(rows))
    }

    /// 查询发布于指定年月的文章，`month` 必须在 1–12 之间
    pub async fn find_by_year_and_month(&self, year: i32, month: u32) -> Result<Vec<Article>> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        self.store.find_by_publish_month(year, month).await
    }
}

/// 以每组的原始时间排序，而不是解析格式化后的字符串
fn into_buckets(mut rows: Vec<MonthCount>) -> Vec<ArchiveBucket> {
    rows.sort_by(|a, b| b.latest.cmp(&a.latest));
    rows.iter().map(ArchiveBucket::from).collect()
}
