use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    /// Reference-data JSON (workers + sites); absent means empty directory.
    pub seed_file: Option<String>,

    /// Offset applied when a record's start time is folded to a shift date.
    pub org_offset: FixedOffset,
    pub stale_shift_hours: i64,
    /// Default scheduling policy when a transfer request does not say.
    pub multi_assignment: bool,

    // Rate limiting
    pub rate_attendance_per_min: u32,
    pub rate_schedule_per_min: u32,
    pub rate_report_per_min: u32,
    pub rate_protected_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let offset_minutes: i32 = env::var("ORG_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            seed_file: env::var("SEED_FILE").ok(),

            org_offset: FixedOffset::east_opt(offset_minutes * 60)
                .expect("ORG_UTC_OFFSET_MINUTES out of range"),
            stale_shift_hours: env::var("STALE_SHIFT_HOURS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),
            multi_assignment: env::var("MULTI_ASSIGNMENT")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap(),

            rate_attendance_per_min: env::var("RATE_ATTENDANCE_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_schedule_per_min: env::var("RATE_SCHEDULE_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_report_per_min: env::var("RATE_REPORT_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }
}
