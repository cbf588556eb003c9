use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// ✅ 联系人/用户昵称校验：1-32 字节
pub fn validate_contact_name(name: &str) -> Result<(), ValidationError> {
    if name.len() < 1 {
        return Err(ValidationError::new("名称长度必须至少为1个字符"));
    }
    if name.len() > 32 {
        return Err(ValidationError::new("名称长度不能超过32个字符"));
    }

    Ok(())
}

/// ✅ 国际手机号校验（可接受 +86、0086 格式）
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,20}$").unwrap();
    }

    if PHONE_RE.is_match(phone) { Ok(()) } else { Err(ValidationError::new("国际手机号格式错误")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_name_bounds() {
        assert!(validate_contact_name("").is_err());
        assert!(validate_contact_name("A").is_ok());
        assert!(validate_contact_name(&"x".repeat(32)).is_ok());
        assert!(validate_contact_name(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_phone_shapes() {
        assert!(validate_phone("13800000000").is_ok());
        assert!(validate_phone("+8613800000000").is_ok());
        assert!(validate_phone("008613800000000").is_ok());
        assert!(validate_phone("12ab34").is_err());
        assert!(validate_phone("123").is_err());
    }

}
