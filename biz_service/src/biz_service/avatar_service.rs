use crate::biz_service::file_service::FileService;
use crate::biz_service::user_service::UserService;
use common::config::AvatarConfig;
use common::errors::AppError;
use common::util::common_utils::hash_partition;
use once_cell::sync::OnceCell;
use std::io::Write;
use std::sync::Arc;

/// 头像入库：下载外链 -> 临时缓冲 -> 分区路径重传 -> 置上传标志
/// 任一步失败则整体失败
pub struct AvatarService {
    file_service: Arc<dyn FileService>,
    partition: u32,
}

impl AvatarService {
    pub fn new(file_service: Arc<dyn FileService>, cfg: &AvatarConfig) -> Self {
        Self { file_service, partition: cfg.partition }
    }

    /// 头像存储路径，按 uid 哈希落入固定分区
    pub fn avatar_path(&self, uid: &str) -> String {
        let bucket = hash_partition(uid, self.partition);
        format!("avatar/{}/{}.png", bucket, uid)
    }

    pub async fn ingest_avatar(&self, avatar_url: &str, uid: &str) -> anyhow::Result<()> {
        // 下载头像
        let bytes = self
            .file_service
            .download(avatar_url)
            .await
            .map_err(|e| AppError::Upstream(format!("下载头像失败: {}", e)))?;

        // 写入临时文件，离开作用域自动清理
        let mut tmp_file = tempfile::Builder::new().prefix("avatar-").suffix(".png").tempfile()?;
        tmp_file.write_all(&bytes)?;
        tmp_file.flush()?;

        // 从临时文件读回并重传
        let buffered = std::fs::read(tmp_file.path())?;
        self.file_service
            .upload(&self.avatar_path(uid), "image/png", buffered)
            .await
            .map_err(|e| AppError::Upstream(format!("上传用户头像失败: {}", e)))?;

        // 更新用户头像状态
        UserService::get().set_avatar_uploaded(uid).await?;
        Ok(())
    }

    pub fn init(file_service: Arc<dyn FileService>, cfg: &AvatarConfig) {
        let instance = Self::new(file_service, cfg);
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("AvatarService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("AvatarService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<AvatarService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoopFileService;

    #[async_trait]
    impl FileService for NoopFileService {
        async fn download(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
            Ok(vec![])
        }
        async fn upload(&self, _path: &str, _content_type: &str, _data: Vec<u8>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_avatar_path_partitioned() {
        let service = AvatarService::new(Arc::new(NoopFileService), &AvatarConfig { partition: 8 });
        let path = service.avatar_path("u_123");
        assert!(path.starts_with("avatar/"));
        assert!(path.ends_with("/u_123.png"));
        let bucket: u32 = path.split('/').nth(1).unwrap().parse().unwrap();
        assert!(bucket < 8);
        // 同一 uid 永远落同一分区
        assert_eq!(path, service.avatar_path("u_123"));
    }
}
