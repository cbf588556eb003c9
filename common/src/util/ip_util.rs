use actix_web::HttpRequest;

/// 提取调用方公网 IP：优先 X-Forwarded-For 第一跳，其次 X-Real-IP，最后取对端地址
pub fn client_public_ip(req: &HttpRequest) -> String {
    if let Some(value) = req.headers().get("X-Forwarded-For") {
        if let Ok(raw) = value.to_str() {
            if let Some(first) = raw.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    if let Some(value) = req.headers().get("X-Real-IP") {
        if let Ok(raw) = value.to_str() {
            let raw = raw.trim();
            if !raw.is_empty() {
                return raw.to_string();
            }
        }
    }
    req.peer_addr().map(|addr| addr.ip().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_forwarded_first_hop_wins() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_public_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = TestRequest::default().insert_header(("X-Real-IP", "198.51.100.2")).to_http_request();
        assert_eq!(client_public_ip(&req), "198.51.100.2");
    }

    #[test]
    fn test_peer_addr_fallback() {
        let req = TestRequest::default().peer_addr("192.0.2.9:40000".parse().unwrap()).to_http_request();
        assert_eq!(client_public_ip(&req), "192.0.2.9");
    }
}
