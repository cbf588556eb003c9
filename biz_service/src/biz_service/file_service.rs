use anyhow::anyhow;
use async_trait::async_trait;
use common::config::FileConfig;

/// 文件服务契约：本核心只通过下载/上传两个窄接口触达存储后端
#[async_trait]
pub trait FileService: Send + Sync {
    /// 下载外部资源，返回完整内容
    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>>;
    /// 上传内容到存储路径
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> anyhow::Result<()>;
}

/// HTTP 文件服务实现：外链直接 GET，上传 PUT 到文件服务器
pub struct HttpFileService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFileService {
    pub fn new(cfg: &FileConfig) -> Self {
        Self { client: reqwest::Client::new(), base_url: cfg.base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl FileService for HttpFileService {
    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self.client.get(url).send().await.map_err(|e| anyhow!("下载请求失败: {}", e))?;
        if !resp.status().is_success() {
            return Err(anyhow!("下载失败: HTTP {}", resp.status()));
        }
        let bytes = resp.bytes().await.map_err(|e| anyhow!("读取下载内容失败: {}", e))?;
        Ok(bytes.to_vec())
    }

    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> anyhow::Result<()> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let resp = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| anyhow!("上传请求失败: {}", e))?;
        if !resp.status().is_success() {
            return Err(anyhow!("上传失败: HTTP {}", resp.status()));
        }
        Ok(())
    }
}
