use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{ClientSession, Collection, Database, bson::Document, error::Result};
use serde::{Serialize, de::DeserializeOwned};

/// 通用仓储接口
#[async_trait]
pub trait Repository<T> {
    async fn insert(&self, entity: &T) -> Result<()>;
    async fn insert_with_session(&self, entity: &T, session: &mut ClientSession) -> Result<()>;
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;
    async fn query(&self, filter: Document) -> Result<Vec<T>>;
    async fn update(&self, filter: Document, update: Document) -> Result<u64>;
    async fn update_with_session(&self, filter: Document, update: Document, session: &mut ClientSession) -> Result<u64>;
}

pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>,
    pub db: Database,
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(db: Database, collection: Collection<T>) -> Self {
        Self { collection, db }
    }
}

#[async_trait]
impl<T: Send + Sync> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn insert(&self, entity: &T) -> Result<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn insert_with_session(&self, entity: &T, session: &mut ClientSession) -> Result<()> {
        self.collection.insert_one(entity).session(session).await?;
        Ok(())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let result = self.collection.find_one(filter).await?;
        Ok(result)
    }

    async fn query(&self, filter: Document) -> Result<Vec<T>> {
        let mut cursor = self.collection.find(filter).await?;
        let mut result = vec![];
        while let Some(doc) = cursor.try_next().await? {
            result.push(doc);
        }
        Ok(result)
    }

    async fn update(&self, filter: Document, update: Document) -> Result<u64> {
        let result = self.collection.update_many(filter, update).await?;
        Ok(result.modified_count)
    }

    async fn update_with_session(&self, filter: Document, update: Document, session: &mut ClientSession) -> Result<u64> {
        let result = self.collection.update_many(filter, update).session(session).await?;
        Ok(result.modified_count)
    }
}

/// 开启一次事务会话；调用方负责在每条出口路径上提交或回滚
pub async fn begin_transaction(client: &mongodb::Client) -> Result<ClientSession> {
    let mut session = client.start_session().await?;
    session.start_transaction().await?;
    Ok(session)
}

/// 判断是否为唯一索引冲突（E11000）
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        ErrorKind::Command(cmd_err) => cmd_err.code == 11000,
        _ => false,
    }
}
