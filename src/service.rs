//! 文章服务
//!
//! [`ArticleService`] 只通过 [`Store`] 读写数据，对外提供分页列表、归档统计和各类分组视图，
//! 以及文章、分类、标签的保存入口。
//!
//! - 列表与写入：本模块
//! - 按月归档：[`archive`]
//! - 按年、分类、标签分组：[`group`]

mod archive;
mod group;

use chrono::Local;
use tracing::instrument;

use crate::{
    content::{
        Article, ArticleCondition, ArticleRecord, Category, NewArticle, Page, Tag,
        resolve_publish_time,
    },
    error::{Error, Result},
    storage::Store,
};

#[derive(Clone)]
pub struct ArticleService<S> {
    store: S,
}

impl<S: Store> ArticleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 按条件分页查询文章，结果按修改时间倒序
    ///
    /// 超出范围的页返回空列表。
    pub async fn list_by_condition(&self, condition: &ArticleCondition) -> Result<Page<Article>> {
        condition.validate()?;

        let (items, total) = self
            .store
            .find_page(
                condition.filters(),
                condition.sort(),
                condition.offset(),
                condition.limit(),
            )
            .await?;

        Ok(Page {
            items,
            page: condition.page(),
            page_size: condition.page_size(),
            total,
        })
    }

    /// 新建或更新文章
    ///
    /// 分类和标签必须都存在；已有的发布时间不会被覆盖。
    #[instrument(skip_all, fields(id = ?article.id))]
    pub async fn save(&self, article: NewArticle) -> Result<Article> {
        self.store
            .find_category_by_id(article.category_id)
            .await?
            .ok_or(Error::NotFound("category"))?;

        let mut tag_ids = article.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();
        let tags = self.store.find_tags_by_ids(&tag_ids).await?;
        if tags.len() != tag_ids.len() {
            return Err(Error::NotFound("tag"));
        }

        let existing = match article.id {
            Some(id) => Some(
                self.store
                    .find_article_by_id(id)
                    .await?
                    .ok_or(Error::NotFound("article"))?,
            ),
            None => None,
        };

        let now = Local::now();
        let record = ArticleRecord {
            id: article.id,
            title: article.title,
            body: article.body,
            status: article.status,
            publish_time: resolve_publish_time(existing.as_ref(), article.status, now),
            modify_time: now,
            category_id: article.category_id,
            tag_ids,
        };

        let saved = self.store.save_article(record).await?;
        tracing::info!(id = saved.id, status = ?saved.status, "article saved");
        Ok(saved)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Article> {
        self.store
            .find_article_by_id(id)
            .await?
            .ok_or(Error::NotFound("article"))
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<()> {
        if !self.store.delete_article(id).await? {
            return Err(Error::NotFound("article"));
        }
        tracing::info!(id, "article deleted");
        Ok(())
    }

    pub async fn save_category(&self, name: &str) -> Result<Category> {
        self.store.save_category(check_name(name)?).await
    }

    pub async fn save_tag(&self, name: &str) -> Result<Tag> {
        self.store.save_tag(check_name(name)?).await
    }
}

/// 分类名与标签名不能为空，长度不超过 30
fn check_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 30 {
        return Err(Error::InvalidArgument(format!("invalid name: {name:?}")));
    }
    Ok(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, TimeZone};

    use super::*;
    use crate::{
        content::ArticleStatus,
        storage::MemoryStore,
    };

    pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    /// 直接写入存储，绕过服务层的时间戳规则
    pub(crate) async fn insert(
        store: &MemoryStore,
        title: &str,
        publish_time: Option<DateTime<Local>>,
        category_id: i64,
        tag_ids: Vec<i64>,
    ) -> Article {
        store
            .save_article(ArticleRecord {
                id: None,
                title: title.to_string(),
                body: String::new(),
                status: if publish_time.is_some() {
                    ArticleStatus::Published
                } else {
                    ArticleStatus::Draft
                },
                publish_time,
                modify_time: publish_time.unwrap_or_else(Local::now),
                category_id,
                tag_ids,
            })
            .await
            .unwrap()
    }

    fn new_article(title: &str, status: ArticleStatus, category_id: i64) -> NewArticle {
        NewArticle {
            id: None,
            title: title.to_string(),
            body: "body".to_string(),
            status,
            category_id,
            tag_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_by_condition_filters_title() {
        let store = MemoryStore::new();
        let tech = store.save_category("tech").await.unwrap();
        insert(&store, "Learning Rust", Some(at(2023, 1, 5)), tech.id, vec![]).await;
        insert(&store, "Go basics", Some(at(2023, 1, 6)), tech.id, vec![]).await;
        let service = ArticleService::new(store);

        let page = service
            .list_by_condition(&ArticleCondition::new(Some("Rust"), 0, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Learning Rust");

        let all = service
            .list_by_condition(&ArticleCondition::new(None, 0, 10))
            .await
            .unwrap();
        let titles: Vec<_> = all.items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Go basics", "Learning Rust"]);
    }

    #[tokio::test]
    async fn test_list_by_condition_out_of_range_page_is_empty() {
        let store = MemoryStore::new();
        let tech = store.save_category("tech").await.unwrap();
        insert(&store, "only", None, tech.id, vec![]).await;
        let service = ArticleService::new(store);

        let page = service
            .list_by_condition(&ArticleCondition::new(None, 5, 10))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 5);

        assert!(matches!(
            service
                .list_by_condition(&ArticleCondition::new(None, 0, 0))
                .await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_save_assigns_publish_time_once() {
        let store = MemoryStore::new();
        let tech = store.save_category("tech").await.unwrap();
        let service = ArticleService::new(store);

        let draft = service
            .save(new_article("draft", ArticleStatus::Draft, tech.id))
            .await
            .unwrap();
        assert!(draft.publish_time.is_none());

        let mut publish = new_article("draft", ArticleStatus::Published, tech.id);
        publish.id = Some(draft.id);
        let published = service.save(publish.clone()).await.unwrap();
        let first = published.publish_time.expect("publish time assigned");

        let republished = service.save(publish).await.unwrap();
        assert_eq!(republished.publish_time, Some(first));
        assert!(republished.modify_time >= published.modify_time);
    }

    #[tokio::test]
    async fn test_save_rejects_unresolved_references() {
        let store = MemoryStore::new();
        let tech = store.save_category("tech").await.unwrap();
        let rust = store.save_tag("rust").await.unwrap();
        let service = ArticleService::new(store);

        let missing_category = new_article("a", ArticleStatus::Published, 999);
        assert!(matches!(
            service.save(missing_category).await,
            Err(Error::NotFound("category"))
        ));

        let mut missing_tag = new_article("a", ArticleStatus::Published, tech.id);
        missing_tag.tag_ids = vec![rust.id, 999];
        assert!(matches!(
            service.save(missing_tag).await,
            Err(Error::NotFound("tag"))
        ));

        let mut duplicated = new_article("a", ArticleStatus::Published, tech.id);
        duplicated.tag_ids = vec![rust.id, rust.id];
        let saved = service.save(duplicated).await.unwrap();
        assert_eq!(saved.tag_ids, vec![rust.id]);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = MemoryStore::new();
        let tech = store.save_category("tech").await.unwrap();
        let a = insert(&store, "a", None, tech.id, vec![]).await;
        let service = ArticleService::new(store);

        assert_eq!(service.get_by_id(a.id).await.unwrap().title, "a");
        service.delete_by_id(a.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(a.id).await,
            Err(Error::NotFound("article"))
        ));
        assert!(matches!(
            service.delete_by_id(a.id).await,
            Err(Error::NotFound("article"))
        ));
    }

    #[tokio::test]
    async fn test_names_are_checked() {
        let service = ArticleService::new(MemoryStore::new());

        assert_eq!(service.save_category(" tech ").await.unwrap().name, "tech");
        assert!(matches!(
            service.save_tag("   ").await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            service.save_tag(&"x".repeat(31)).await,
            Err(Error::InvalidArgument(_))
        ));
    }
}
