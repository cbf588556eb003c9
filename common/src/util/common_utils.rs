use hex::encode;
use md5::{Digest, Md5};
use uuid::Uuid;

pub fn build_uuid() -> String {
    let uuid = Uuid::new_v4().simple();
    format!("{}", uuid)
}

pub fn build_md5(content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(content);
    let result = hasher.finalize();
    let hex_string = encode(result);
    hex_string
}

/// 按 key 的 md5 前缀取模，映射到 [0, partition) 分区
pub fn hash_partition(key: &str, partition: u32) -> u32 {
    if partition == 0 {
        return 0;
    }
    let mut hasher = Md5::new();
    hasher.update(key);
    let digest = hasher.finalize();
    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    prefix % partition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uuid_unique_and_simple() {
        let a = build_uuid();
        let b = build_uuid();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
    }

    #[test]
    fn test_build_md5() {
        assert_eq!(build_md5("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_hash_partition_stable_and_in_range() {
        let p = 10u32;
        let first = hash_partition("u_123456", p);
        for _ in 0..3 {
            assert_eq!(hash_partition("u_123456", p), first);
        }
        assert!(first < p);
        // partition 为 0 时退化到 0，而不是除零
        assert_eq!(hash_partition("u_123456", 0), 0);
    }
}
