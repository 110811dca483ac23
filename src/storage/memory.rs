use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{DateTime, Local};

use super::Store;
use crate::{
    content::{
        Article, ArticleFilter, ArticleRecord, ArticleSort, ArticleStatus, Category, MonthCount,
        Tag,
    },
    error::{Error, Result},
};

/// 进程内的 [`Store`] 实现
///
/// 用于测试和无数据库时的本地运行，克隆后共享同一份数据。
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    articles: BTreeMap<i64, ArticleRow>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
}

struct ArticleRow {
    title: String,
    body: String,
    status: ArticleStatus,
    publish_time: Option<DateTime<Local>>,
    modify_time: DateTime<Local>,
    category_id: i64,
    tag_ids: Vec<i64>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// 联表读取，分类不存在的文章被忽略
    fn article(&self, id: i64, row: &ArticleRow) -> Option<Article> {
        let category = self.categories.get(&row.category_id)?;
        Some(Article {
            id,
            title: row.title.clone(),
            body: row.body.clone(),
            status: row.status,
            publish_time: row.publish_time,
            modify_time: row.modify_time,
            category_id: category.id,
            category_name: category.name.clone(),
            tag_ids: row
                .tag_ids
                .iter()
                .copied()
                .filter(|id| self.tags.contains_key(id))
                .collect(),
        })
    }

    fn articles_where(&self, pred: impl Fn(&ArticleRow) -> bool) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|(_, row)| pred(row))
            .filter_map(|(id, row)| self.article(*id, row))
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sorted(mut articles: Vec<Article>, sort: ArticleSort) -> Vec<Article> {
    articles.sort_by(|a, b| sort.compare(a, b));
    articles
}

impl Store for MemoryStore {
    async fn find_page(
        &self,
        filters: &[ArticleFilter],
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Article>, i64)> {
        let matched: Vec<Article> = self
            .read()
            .articles_where(|_| true)
            .into_iter()
            .filter(|a| filters.iter().all(|f| f.matches(a)))
            .collect();
        let total = matched.len() as i64;

        let items = sorted(matched, sort)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((items, total))
    }

    async fn find_all(&self, sort: ArticleSort) -> Result<Vec<Article>> {
        Ok(sorted(self.read().articles_where(|_| true), sort))
    }

    async fn find_by_category_order_by_publish_time(&self, category_id: i64) -> Result<Vec<Article>> {
        let articles = self
            .read()
            .articles_where(|row| row.category_id == category_id);
        Ok(sorted(articles, ArticleSort::PublishTimeDesc))
    }

    async fn find_by_publish_month(&self, year: i32, month: u32) -> Result<Vec<Article>> {
        let articles: Vec<Article> = self
            .read()
            .articles_where(|_| true)
            .into_iter()
            .filter(|a| a.published_in(year, month))
            .collect();
        Ok(sorted(articles, ArticleSort::PublishTimeDesc))
    }

    async fn month_counts(&self) -> Result<Vec<MonthCount>> {
        let times = self
            .read()
            .articles_where(|row| row.publish_time.is_some())
            .into_iter()
            .filter_map(|a| a.publish_time);
        Ok(MonthCount::tally(times))
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let tables = self.read();
        Ok(tables
            .articles
            .get(&id)
            .and_then(|row| tables.article(id, row)))
    }

    async fn save_article(&self, record: ArticleRecord) -> Result<Article> {
        let mut tables = self.write();

        let id = match record.id {
            Some(id) if tables.articles.contains_key(&id) => id,
            Some(_) => return Err(Error::NotFound("article")),
            None => tables.next_id(),
        };

        let mut tag_ids = record.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let row = ArticleRow {
            title: record.title,
            body: record.body,
            status: record.status,
            publish_time: record.publish_time,
            modify_time: record.modify_time,
            category_id: record.category_id,
            tag_ids,
        };
        let Some(article) = tables.article(id, &row) else {
            return Err(Error::NotFound("category"));
        };
        tables.articles.insert(id, row);
        Ok(article)
    }

    async fn delete_article(&self, id: i64) -> Result<bool> {
        Ok(self.write().articles.remove(&id).is_some())
    }

    async fn find_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.read().categories.get(&id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .read()
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn save_category(&self, name: &str) -> Result<Category> {
        let mut tables = self.write();
        if tables.categories.values().any(|c| c.name == name) {
            return Err(Error::Conflict(name.to_string()));
        }

        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.read().tags.values().cloned().collect())
    }

    async fn find_tags_by_name(&self, name: &str) -> Result<Vec<Tag>> {
        Ok(self
            .read()
            .tags
            .values()
            .filter(|t| t.name == name)
            .cloned()
            .collect())
    }

    async fn find_tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>> {
        let tables = self.read();
        Ok(tables
            .tags
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn find_articles_by_tag(&self, tag_id: i64) -> Result<Vec<Article>> {
        let tables = self.read();
        if !tables.tags.contains_key(&tag_id) {
            return Ok(vec![]);
        }
        Ok(tables.articles_where(|row| row.tag_ids.contains(&tag_id)))
    }

    async fn save_tag(&self, name: &str) -> Result<Tag> {
        let mut tables = self.write();
        if tables.tags.values().any(|t| t.name == name) {
            return Err(Error::Conflict(name.to_string()));
        }

        let now = Local::now();
        let tag = Tag {
            id: tables.next_id(),
            name: name.to_string(),
            create_time: now,
            modify_time: now,
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}
