use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

/// 生成随机口令（首次启动引导管理员账号用）
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_have_requested_length() {
        assert_eq!(generate_password(16).len(), 16);
        assert_eq!(generate_password(0).len(), 0);
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(generate_password(24), generate_password(24));
    }
}
