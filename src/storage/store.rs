use std::future::Future;

use crate::{
    content::{Article, ArticleFilter, ArticleRecord, ArticleSort, Category, MonthCount, Tag},
    error::Result,
};

/// 文章、分类和标签的持久化接口
///
/// 每次调用独立获取并释放连接（或锁），调用之间不保证快照一致性。
/// 所有查询都会把结果完整读入内存后返回。
///
/// 文章通过内连接带出分类名称，分类缺失的文章在读取时被忽略。
pub trait Store: Clone + Send + Sync + 'static {
    /// 按过滤条件分页查询文章，返回当前页和满足条件的总数
    fn find_page(
        &self,
        filters: &[ArticleFilter],
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = Result<(Vec<Article>, i64)>> + Send;

    /// 按指定排序查询全部文章
    fn find_all(&self, sort: ArticleSort) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 查询某分类下的文章，按发布时间倒序
    fn find_by_category_order_by_publish_time(
        &self,
        category_id: i64,
    ) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 查询发布于指定年月的文章，按发布时间倒序
    fn find_by_publish_month(
        &self,
        year: i32,
        month: u32,
    ) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 按发布时间的自然月分组计数，不含未发布文章
    fn month_counts(&self) -> impl Future<Output = Result<Vec<MonthCount>>> + Send;

    fn find_article_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 插入或更新文章，并用 `tag_ids` 覆盖该文章的标签关系
    ///
    /// 更新不存在的文章返回 [`Error::NotFound`](crate::error::Error::NotFound)。
    fn save_article(&self, record: ArticleRecord) -> impl Future<Output = Result<Article>> + Send;

    /// 删除文章，返回是否确实删除了记录
    fn delete_article(&self, id: i64) -> impl Future<Output = Result<bool>> + Send;

    fn find_category_by_id(&self, id: i64)
    -> impl Future<Output = Result<Option<Category>>> + Send;

    fn find_category_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Category>>> + Send;

    /// 新建分类，名称重复返回 [`Error::Conflict`](crate::error::Error::Conflict)
    fn save_category(&self, name: &str) -> impl Future<Output = Result<Category>> + Send;

    fn find_all_tags(&self) -> impl Future<Output = Result<Vec<Tag>>> + Send;

    fn find_tags_by_name(&self, name: &str) -> impl Future<Output = Result<Vec<Tag>>> + Send;

    /// 查询 id 在给定列表中的标签，不存在的 id 被忽略
    fn find_tags_by_ids(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<Tag>>> + Send;

    /// 标签到文章的派生关系，顺序不作保证
    fn find_articles_by_tag(&self, tag_id: i64)
    -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 新建标签，名称重复返回 [`Error::Conflict`](crate::error::Error::Conflict)
    fn save_tag(&self, name: &str) -> impl Future<Output = Result<Tag>> + Send;
}
