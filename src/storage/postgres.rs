use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// 文章库使用的 Postgres 连接池
pub type Db = sqlx::PgPool;

/// 建表语句
pub const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 连接 `conn_url` 指向的文章库
///
/// 常驻 2 个连接，上限 10 个；取连接最多等 2 秒，取前先校验连接可用。
/// 空闲超过一分钟或存活超过 25 分钟的连接会被回收。
pub async fn new_db_pool(conn_url: &str) -> Result<Db, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await
}

/// 执行建表脚本
///
/// 脚本包含 `DO` 块，不能按 `;` 拆分，整体作为一次简单查询执行
pub async fn migrate(db: &Db, sql: &str) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(sql).execute(db).await?;
    Ok(())
}
