use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use sqlx::{Postgres, QueryBuilder};

use super::{Db, Store};
use crate::{
    content::{Article, ArticleFilter, ArticleRecord, ArticleSort, Category, MonthCount, Tag},
    error::{Error, Result},
};

/// 文章查询的公共部分，分类联表平铺，标签 id 聚合为数组
const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.title, a.body, a.status, a.publish_time, a.modify_time,
           c.id AS category_id,
           c.name AS category_name,
           ARRAY(
               SELECT t.tag_id FROM article_tags t
               WHERE t.article_id = a.id
               ORDER BY t.tag_id
           ) AS tag_ids
    FROM articles a
    INNER JOIN categories c ON a.category_id = c.id
"#;

const TAG_COLUMNS: &str = "id, name, create_time, modify_time";

/// PostgreSQL 的 [`Store`] 实现
#[derive(Clone)]
pub struct PgStore {
    pool: Db,
}

impl PgStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Db {
        &self.pool
    }
}

fn select_articles() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(ARTICLE_SELECT)
}

/// 将过滤条件追加为 `WHERE ... AND ...`
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[ArticleFilter]) {
    if filters.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    let mut separated = builder.separated(" AND ");
    for filter in filters {
        match filter {
            // strpos 区分大小写，且不需要转义 LIKE 通配符
            ArticleFilter::TitleContains(s) => {
                separated
                    .push("strpos(a.title, ")
                    .push_bind_unseparated(s.clone())
                    .push_unseparated(") > 0");
            }
        }
    }
}

/// 覆盖本地时区某个自然月的 UTC 时间范围，两端各放宽一天以容纳任意时区偏移
fn month_window(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = match month {
        12 => NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?,
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
    };

    let from = first.checked_sub_days(Days::new(1))?.and_hms_opt(0, 0, 0)?;
    let to = next.checked_add_days(Days::new(1))?.and_hms_opt(0, 0, 0)?;
    Some((from.and_utc(), to.and_utc()))
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> Error {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(what.to_string()),
        e => e.into(),
    }
}

impl Store for PgStore {
    async fn find_page(
        &self,
        filters: &[ArticleFilter],
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Article>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM articles a INNER JOIN categories c ON a.category_id = c.id",
        );
        push_filters(&mut count, filters);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = select_articles();
        push_filters(&mut builder, filters);
        builder.push(sort.as_sql());
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let items = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;
        Ok((items, total))
    }

    async fn find_all(&self, sort: ArticleSort) -> Result<Vec<Article>> {
        let mut builder = select_articles();
        builder.push(sort.as_sql());
        Ok(builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_category_order_by_publish_time(&self, category_id: i64) -> Result<Vec<Article>> {
        let mut builder = select_articles();
        builder.push(" WHERE a.category_id = ").push_bind(category_id);
        builder.push(ArticleSort::PublishTimeDesc.as_sql());
        Ok(builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_publish_month(&self, year: i32, month: u32) -> Result<Vec<Article>> {
        let Some((from, to)) = month_window(year, month) else {
            return Ok(vec![]);
        };

        // 数据库只按时间范围粗筛，年月以本地时区为准
        let mut builder = select_articles();
        builder.push(" WHERE a.publish_time >= ").push_bind(from);
        builder.push(" AND a.publish_time < ").push_bind(to);
        builder.push(ArticleSort::PublishTimeDesc.as_sql());
        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;

        Ok(articles
            .into_iter()
            .filter(|a| a.published_in(year, month))
            .collect())
    }

    async fn month_counts(&self) -> Result<Vec<MonthCount>> {
        let times = sqlx::query_scalar::<_, DateTime<Local>>(
            "SELECT publish_time FROM articles WHERE publish_time IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(MonthCount::tally(times))
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let mut builder = select_articles();
        builder.push(" WHERE a.id = ").push_bind(id);
        Ok(builder
            .build_query_as::<Article>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn save_article(&self, record: ArticleRecord) -> Result<Article> {
        let mut tx = self.pool.begin().await?;

        let id = match record.id {
            Some(id) => sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE articles
                SET title = $2,
                    body = $3,
                    status = $4,
                    publish_time = $5,
                    modify_time = $6,
                    category_id = $7
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id)
            .bind(&record.title)
            .bind(&record.body)
            .bind(record.status)
            .bind(record.publish_time)
            .bind(record.modify_time)
            .bind(record.category_id)
            .fetch_optional(tx.as_mut())
            .await?
            .ok_or(Error::NotFound("article"))?,
            None => sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO articles
                    (title, body, status, publish_time, modify_time, category_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(&record.title)
            .bind(&record.body)
            .bind(record.status)
            .bind(record.publish_time)
            .bind(record.modify_time)
            .bind(record.category_id)
            .fetch_one(tx.as_mut())
            .await?,
        };

        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(id)
            .execute(tx.as_mut())
            .await?;

        if !record.tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                SELECT $1, UNNEST($2::int8[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(record.tag_ids.as_slice())
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;

        self.find_article_by_id(id)
            .await?
            .ok_or(Error::NotFound("article"))
    }

    async fn delete_article(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn save_category(&self, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, name))
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>> {
        Ok(
            sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY id"))
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_tags_by_name(&self, name: &str) -> Result<Vec<Tag>> {
        Ok(sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_articles_by_tag(&self, tag_id: i64) -> Result<Vec<Article>> {
        let mut builder = select_articles();
        builder
            .push(" WHERE a.id IN (SELECT article_id FROM article_tags WHERE tag_id = ")
            .push_bind(tag_id)
            .push(")");
        Ok(builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn save_tag(&self, name: &str) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (name) VALUES ($1) RETURNING {TAG_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, name))
    }
}
