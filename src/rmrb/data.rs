use crate::{filter::MatchRecord, utils, CrawlerError, Storage, Table};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};

pub struct UrlTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for UrlTable {
    type Record<'a> = &'a str;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                "CREATE TABLE {} (
                    id TEXT PRIMARY KEY,
                    created_at DATETIME
                 )",
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT OR IGNORE INTO {} (id, created_at) VALUES (?, ?)",
            &self.name
        );
        sqlx::query(&query)
            .bind(record)
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(())
    }
}

/// Matched articles keyed by article url, with the page they were found on.
pub struct MatchTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for MatchTable {
    type Record<'a> = (&'a str, MatchRecord);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                r#"
                        CREATE TABLE {} (
                            id TEXT PRIMARY KEY,
                            created_at DATETIME,
                            title TEXT,
                            source TEXT,
                            page TEXT
                        )
                    "#,
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    async fn insert<'a>(&self, (page, record): Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT OR IGNORE INTO {} (
                id,
                title,
                source,
                page,
                created_at) VALUES (?, ?, ?, ?, ?)"#,
            self.name
        );
        sqlx::query(&query)
            .bind(record.url.trim())
            .bind(record.title)
            .bind(record.source)
            .bind(page)
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

pub struct RmrbData {
    pub queued: UrlTable,
    pub visited: UrlTable,
    pub warned: UrlTable,
    pub results: MatchTable,
    pool: SqlitePool,
}

impl RmrbData {
    pub async fn new(name: &str) -> Result<RmrbData, CrawlerError> {
        let opt = SqliteConnectOptions::new()
            .filename(format!("{}.db", name))
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let p = RmrbData {
            queued: UrlTable {
                name: format!("{}_queued", name),
                pool: pool.clone(),
            },
            visited: UrlTable {
                name: format!("{}_visited", name),
                pool: pool.clone(),
            },
            warned: UrlTable {
                name: format!("{}_warned", name),
                pool: pool.clone(),
            },
            results: MatchTable {
                name: format!("{}_results", name),
                pool: pool.clone(),
            },
            pool,
        };

        for table in &[&p.queued, &p.visited, &p.warned] {
            if !utils::is_table_exists(&p.pool, &table.name).await? {
                tracing::debug!("Create table {}", table.name);
                table.create().await?;
            } else {
                tracing::debug!("Use table {}", table.name);
            }
        }
        if !utils::is_table_exists(&p.pool, &p.results.name).await? {
            tracing::debug!("Create table {}", p.results.name);
            p.results.create().await?;
        } else {
            tracing::debug!("Use table {}", p.results.name);
        }

        Ok(p)
    }
}

#[async_trait::async_trait]
impl Storage for RmrbData {
    type Record = MatchRecord;

    async fn queued_get(&self) -> Result<Vec<String>, CrawlerError> {
        Ok(self.queued.ids().await?)
    }

    async fn queued_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError> {
        let item = item.as_ref();
        Ok(self.queued.insert(item).await?)
    }

    async fn queued_delete<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError> {
        let item = item.as_ref();
        Ok(self.queued.delete(item).await?)
    }

    async fn visited_is_exists<I: AsRef<str> + Send>(&self, item: I) -> Result<bool, CrawlerError> {
        let item = item.as_ref();
        Ok(self.visited.is_exist(item).await?)
    }

    async fn visited_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError> {
        let item = item.as_ref();
        Ok(self.visited.insert(item).await?)
    }

    async fn warned_insert<I: AsRef<str> + Send>(&self, item: I) -> Result<(), CrawlerError> {
        let item = item.as_ref();
        Ok(self.warned.insert(item).await?)
    }

    async fn results_count(&self) -> Result<u32, CrawlerError> {
        Ok(self.results.count().await?)
    }

    async fn results_insert<I: AsRef<str> + Send>(
        &self,
        (page, record): (I, Self::Record),
    ) -> Result<(), CrawlerError> {
        let page = page.as_ref();
        Ok(self.results.insert((page, record)).await?)
    }

    async fn results_get(&self) -> Result<Vec<Self::Record>, CrawlerError> {
        let mut records = vec![];
        let query = format!(
            "SELECT id, title, source FROM {} ORDER BY created_at, rowid",
            self.results.get_name()
        );
        let mut rows = sqlx::query(&query).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            records.push(MatchRecord {
                title: row.try_get("title")?,
                url: row.try_get("id")?,
                source: row.try_get("source")?,
            });
        }
        Ok(records)
    }
}
