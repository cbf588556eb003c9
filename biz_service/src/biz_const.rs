use common::util::common_utils::build_uuid;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 国际号码前缀标记（以 00 开头的手机号视为国际号码，不补区号）
pub const INTERNATIONAL_PREFIX: &str = "00";

/// 登录令牌有效期（秒）
pub const LOGIN_TOKEN_TTL_SECS: u64 = 3600;

/// 旁路任务队列容量
pub const TASK_QUEUE_CAPACITY: usize = 256;
/// 旁路任务工作协程数
pub const TASK_WORKER_COUNT: usize = 4;

/// 验证码归属类型（vercode 的类型判别段）
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum VercodeType {
    Friend = 1,
    MailList = 2,
}

/// 生成验证码标识，格式 `{唯一ID}@{类型}`，入库后不再变更
pub fn build_vercode(vercode_type: VercodeType) -> String {
    format!("{}@{}", build_uuid(), u8::from(vercode_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vercode_format() {
        let vercode = build_vercode(VercodeType::MailList);
        let (id, kind) = vercode.split_once('@').unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(kind, "2");
    }

    #[test]
    fn test_vercode_never_repeats() {
        let a = build_vercode(VercodeType::MailList);
        let b = build_vercode(VercodeType::MailList);
        assert_ne!(a, b);
    }
}
