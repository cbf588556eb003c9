///
/// 当前 Unix 时间戳（秒）
pub fn now() -> u64 {
    let now = chrono::Local::now();
    now.timestamp() as u64
}
