mod query;
mod write;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    service::ArticleService,
    storage::Store,
};

/// 设置应用的路由。
///
/// 路由包括：
/// - `GET /api/articles`：分页文章列表，`POST` 保存文章
/// - `GET /api/articles/{id}`：单篇文章，`DELETE` 删除文章
/// - `GET /api/archive`：按月归档统计
/// - `GET /api/archive/{year}/{month}`：某月发布的文章
/// - `GET /api/groups/year`、`/groups/category`、`/groups/tag`：分组视图
/// - `POST /api/categories`、`POST /api/tags`：新建分类、标签
pub fn setup_route<S: Store>(service: ArticleService<S>) -> Router {
    let api = Router::new()
        .route(
            "/articles",
            get(query::articles_list::<S>).post(write::article_save::<S>),
        )
        .route(
            "/articles/{id}",
            get(query::article::<S>).delete(write::article_delete::<S>),
        )
        .route("/archive", get(query::archive::<S>))
        .route("/archive/{year}/{month}", get(query::archive_month::<S>))
        .route("/groups/year", get(query::group_by_year::<S>))
        .route("/groups/category", get(query::group_by_category::<S>))
        .route("/groups/tag", get(query::group_by_tag::<S>))
        .route("/categories", post(write::category_save::<S>))
        .route("/tags", post(write::tag_save::<S>));

    Router::new().nest("/api", api).with_state(service)
}

/// 在 `listen` 地址上提供博客 API，直到监听出错
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("listening on {listen}");

    axum::serve(listener, router).await.map_err(Error::Io)
}

/// 以给定的文章服务组装 `/api` 路由并挂上请求追踪后对外服务
pub async fn run_server<S: Store>(service: ArticleService<S>, listen: &str) -> Result<()> {
    let router = setup_route(service);
    let router = add_middlewares(router);
    run_server_with_router(router, listen).await
}

/// 只记录 5xx 响应，普通请求不打日志
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(()),
    )
}
