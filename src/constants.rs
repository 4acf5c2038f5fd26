/// 粗粒度掌握等级的上限（0-4 级）
pub const MAX_MASTERY_LEVEL: u8 = 4;

/// 未达到掌握阈值时可报告的最高等级
pub const MAX_UNMASTERED_LEVEL: u8 = 3;

/// 每日轨道选择时日期种子的取模基数
pub const TRACK_SEED_MODULUS: u64 = 1000;

/// 日期键格式（UTC）
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// 尝试得分百分比上限
pub const MAX_ATTEMPT_PERCENT: f64 = 100.0;

/// 复习间隔上限（天）
pub const MAX_REVIEW_INTERVAL_DAYS: u32 = 3650;
