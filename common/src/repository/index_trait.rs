use mongodb::IndexModel;

/// 实体声明自身需要的 Mongo 索引（由派生宏生成）
pub trait MongoIndexModelProvider {
    fn index_models() -> Vec<IndexModel>;
}
