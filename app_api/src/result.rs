use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ApiResponse<T> {
    code: i32,
    message: String,
    data: Option<T>,
}

pub fn result() -> Value {
    serde_json::json!({"code":200})
}

/// 操作已提交但伴随非致命告警
pub fn result_warn_msg(msg: &str) -> Value {
    serde_json::json!({"code":200,"msg":msg})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_shapes() {
        assert_eq!(result(), serde_json::json!({"code":200}));
        assert_eq!(result_warn_msg("通知失败"), serde_json::json!({"code":200,"msg":"通知失败"}));
    }
}
