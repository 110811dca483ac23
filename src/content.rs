mod article;
mod filter;
mod report;
mod taxonomy;

pub use self::{
    article::{
        Article, ArticleRecord, ArticleStatus, NewArticle, UNPUBLISHED_YEAR, resolve_publish_time,
    },
    filter::{ArticleCondition, ArticleFilter, ArticleSort},
    report::{ArchiveBucket, MonthCount, Page, YearGroup},
    taxonomy::{Category, Tag},
};
