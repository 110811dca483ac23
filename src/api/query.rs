use std::collections::{BTreeMap, HashMap};

use axum::Json;
use axum::extract::{Path, State};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::{ArticleService, Result, Store};
use crate::content::{ArchiveBucket, Article, ArticleCondition, ArticleStatus, Page};

/// 文章元信息，用于列表展示。
#[derive(Debug, Serialize)]
pub struct ArticleMeta {
    pub id: i64,
    pub title: String,
    pub status: ArticleStatus,
    pub category: CategoryMeta,
    pub tag_ids: Vec<i64>,
    /// 毫秒时间戳，未发布为 `null`
    pub publish_time: Option<i64>,
    pub modify_time: i64,
}

/// 完整文章，包括元信息和正文。
#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub meta: ArticleMeta,

    pub body: String,
}

/// 文章所属分类。
#[derive(Debug, Serialize)]
pub struct CategoryMeta {
    pub id: i64,
    pub name: String,
}

impl From<Article> for ArticleDetail {
    fn from(a: Article) -> Self {
        Self {
            meta: ArticleMeta {
                id: a.id,
                title: a.title,
                status: a.status,
                category: CategoryMeta {
                    id: a.category_id,
                    name: a.category_name,
                },
                tag_ids: a.tag_ids,
                publish_time: a.publish_time.map(|t| t.timestamp_millis()),
                modify_time: a.modify_time.timestamp_millis(),
            },
            body: a.body,
        }
    }
}

impl From<Article> for ArticleMeta {
    fn from(a: Article) -> Self {
        ArticleDetail::from(a).meta
    }
}

/// 按年分组的一组文章。
#[derive(Debug, Serialize)]
pub struct YearGroupMeta {
    pub year: i32,
    pub articles: Vec<ArticleMeta>,
}

/// 查询参数，用于文章列表分页和标题筛选。
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    title: Option<String>,
    page: u32,
    size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            title: None,
            page: 0,
            size: 10,
        }
    }
}

/// 分组查询参数，`name` 为空时返回全部分组。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameParams {
    name: Option<String>,
}

fn metas(articles: impl IntoIterator<Item = Article>) -> Vec<ArticleMeta> {
    articles.into_iter().map(ArticleMeta::from).collect()
}

/// 获取文章列表。
///
/// 按修改时间倒序分页，可按标题子串筛选。
pub(super) async fn articles_list<S: Store>(
    Query(params): Query<ListParams>,
    State(service): State<ArticleService<S>>,
) -> Result<Json<Page<ArticleMeta>>> {
    let condition = ArticleCondition::new(params.title.as_deref(), params.page, params.size);
    let page = service.list_by_condition(&condition).await?;
    Ok(Json(page.map(ArticleMeta::from)))
}

/// 根据 id 获取单篇文章。
pub(super) async fn article<S: Store>(
    Path(id): Path<i64>,
    State(service): State<ArticleService<S>>,
) -> Result<Json<ArticleDetail>> {
    let article = service.get_by_id(id).await?;
    Ok(Json(article.into()))
}

/// 按月归档统计。
pub(super) async fn archive<S: Store>(
    State(service): State<ArticleService<S>>,
) -> Result<Json<Vec<ArchiveBucket>>> {
    service.archive().await.map(Json)
}

/// 获取某年某月发布的文章。
pub(super) async fn archive_month<S: Store>(
    Path((year, month)): Path<(i32, u32)>,
    State(service): State<ArticleService<S>>,
) -> Result<Json<Vec<ArticleMeta>>> {
    let articles = service.find_by_year_and_month(year, month).await?;
    Ok(Json(metas(articles)))
}

/// 按年份分组，年份倒序。
pub(super) async fn group_by_year<S: Store>(
    State(service): State<ArticleService<S>>,
) -> Result<Json<Vec<YearGroupMeta>>> {
    let groups = service.find_all_group_by_year().await?;
    Ok(Json(
        groups
            .into_iter()
            .map(|g| YearGroupMeta {
                year: g.year,
                articles: metas(g.articles),
            })
            .collect(),
    ))
}

/// 按分类名称分组。
pub(super) async fn group_by_category<S: Store>(
    Query(params): Query<NameParams>,
    State(service): State<ArticleService<S>>,
) -> Result<Json<BTreeMap<String, Vec<ArticleMeta>>>> {
    let group = service
        .find_article_group_by_category(params.name.as_deref())
        .await?;
    Ok(Json(
        group
            .into_iter()
            .map(|(name, articles)| (name, metas(articles)))
            .collect(),
    ))
}

/// 按标签名称分组，每组内的文章没有顺序。
pub(super) async fn group_by_tag<S: Store>(
    Query(params): Query<NameParams>,
    State(service): State<ArticleService<S>>,
) -> Result<Json<HashMap<String, Vec<ArticleMeta>>>> {
    let group = service
        .find_article_group_by_tag(params.name.as_deref())
        .await?;
    Ok(Json(
        group
            .into_iter()
            .map(|(name, articles)| (name, metas(articles)))
            .collect(),
    ))
}
