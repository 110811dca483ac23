use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::query::ArticleDetail;
use super::{ArticleService, Result, Store};
use crate::content::{Category, NewArticle, Tag};

/// 新建分类或标签的请求体。
#[derive(Debug, Deserialize)]
pub struct NameBody {
    name: String,
}

/// 标签，时间为毫秒时间戳。
#[derive(Debug, Serialize)]
pub struct TagMeta {
    pub id: i64,
    pub name: String,
    pub create_time: i64,
    pub modify_time: i64,
}

impl From<Tag> for TagMeta {
    fn from(tag: Tag) -> Self {
        let millis = |t: DateTime<Local>| t.timestamp_millis();
        Self {
            id: tag.id,
            name: tag.name,
            create_time: millis(tag.create_time),
            modify_time: millis(tag.modify_time),
        }
    }
}

/// 新建或更新文章。
///
/// 分类或标签 id 不存在时返回 404。
pub(super) async fn article_save<S: Store>(
    State(service): State<ArticleService<S>>,
    Json(article): Json<NewArticle>,
) -> Result<Json<ArticleDetail>> {
    let saved = service.save(article).await?;
    Ok(Json(saved.into()))
}

/// 删除文章。
pub(super) async fn article_delete<S: Store>(
    Path(id): Path<i64>,
    State(service): State<ArticleService<S>>,
) -> Result<StatusCode> {
    service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 新建分类，名称重复返回 409。
pub(super) async fn category_save<S: Store>(
    State(service): State<ArticleService<S>>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = service.save_category(&body.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// 新建标签，名称重复返回 409。
pub(super) async fn tag_save<S: Store>(
    State(service): State<ArticleService<S>>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<TagMeta>)> {
    let tag = service.save_tag(&body.name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}
