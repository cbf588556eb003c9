use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use mongodb::{Collection, IndexModel};
use std::collections::HashSet;

/// 创建缺失的索引，已存在的跳过
pub async fn index_create(coll: Collection<Document>, target_list: Vec<IndexModel>) {
    let mut existing: HashSet<String> = HashSet::new();
    match coll.list_indexes().await {
        Ok(mut cursor) => loop {
            match cursor.try_next().await {
                Ok(Some(index_info)) => {
                    if let Some(name) = index_info.options.and_then(|o| o.name) {
                        existing.insert(name);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("❌ 列出索引失败: {:?}", e);
                    break;
                }
            }
        },
        // 集合尚不存在时直接走创建
        Err(e) => log::warn!("列出索引失败: {:?}", e),
    }

    for target in target_list {
        let name = target.options.as_ref().and_then(|o| o.name.clone());
        if let Some(ref n) = name {
            if existing.contains(n) {
                continue;
            }
        }
        match coll.create_index(target.clone()).await {
            Ok(_) => log::info!("✅ 创建索引成功: {}", target.keys),
            Err(e) => log::error!("❌ 创建索引失败: {:?}", e),
        }
    }
}
