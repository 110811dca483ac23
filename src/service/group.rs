use std::collections::{BTreeMap, HashMap, HashSet};

use super::ArticleService;
use crate::{
    content::{Article, ArticleSort, YearGroup},
    error::{Error, Result},
    storage::Store,
};

impl<S: Store> ArticleService<S> {
    /// 按发布年份分组，年份倒序，组内按发布时间倒序
    ///
    /// 未发布的文章归入 [`UNPUBLISHED_YEAR`](crate::content::UNPUBLISHED_YEAR)。
    pub async fn find_all_group_by_year(&self) -> Result<Vec<YearGroup>> {
        let articles = self.store.find_all(ArticleSort::PublishTimeDesc).await?;
        Ok(group_by_year(articles))
    }

    /// 按分类名称分组，组内按发布时间倒序
    ///
    /// 指定名称时先按名称查找分类，不存在返回 [`Error::NotFound`]，
    /// 然后只查询该分类下的文章。
    pub async fn find_article_group_by_category(
        &self,
        category_name: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<Article>>> {
        let articles = match category_name {
            Some(name) => {
                let category = self
                    .store
                    .find_category_by_name(name)
                    .await?
                    .ok_or(Error::NotFound("category"))?;
                self.store
                    .find_by_category_order_by_publish_time(category.id)
                    .await?
            }
            None => self.store.find_all(ArticleSort::PublishTimeDesc).await?,
        };
        Ok(group_by_category(articles))
    }

    /// 按标签名称分组，从标签一侧出发取其文章集合
    ///
    /// 集合内没有顺序。指定名称时只包含同名的标签，不存在时返回空表。
    pub async fn find_article_group_by_tag(
        &self,
        tag_name: Option<&str>,
    ) -> Result<HashMap<String, HashSet<Article>>> {
        let tags = match tag_name {
            Some(name) => self.store.find_tags_by_name(name).await?,
            None => self.store.find_all_tags().await?,
        };

        let mut group = HashMap::with_capacity(tags.len());
        for tag in tags {
            let articles = self.store.find_articles_by_tag(tag.id).await?;
            group.insert(tag.name, articles.into_iter().collect());
        }
        Ok(group)
    }
}

/// 输入需已按发布时间倒序，分组后保持组内顺序
fn group_by_year(articles: Vec<Article>) -> Vec<YearGroup> {
    let mut years: BTreeMap<i32, Vec<Article>> = BTreeMap::new();
    for article in articles {
        years.entry(article.publish_year()).or_default().push(article);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, articles)| YearGroup { year, articles })
        .collect()
}

fn group_by_category(articles: Vec<Article>) -> BTreeMap<String, Vec<Article>> {
    let mut group: BTreeMap<String, Vec<Article>> = BTreeMap::new();
    for article in articles {
        group
            .entry(article.category_name.clone())
            .or_default()
            .push(article);
    }
    group
}
