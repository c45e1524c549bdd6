use crate::infrastructure::ServiceModule;
use crate::services::Service;
use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};

/// 东京相对 UTC 的偏移（秒）
const TOKYO_UTC_OFFSET: i32 = 9 * 3600;

/// 提供某时区当前时间的模块
pub fn clock_module() -> ServiceModule {
    ServiceModule::new()
        .factory("timezone", Service::value("Asia/Tokyo"))
        .factory("utc_offset", Service::value(TOKYO_UTC_OFFSET))
        .factory(
            "time",
            Service::factory(["timezone", "utc_offset"], |args| {
                let offset = *args.get::<i32>(1)?;
                let zone = FixedOffset::east_opt(offset)
                    .ok_or_else(|| anyhow::anyhow!("invalid UTC offset: {offset}s"))?;
                log::debug!("读取 {} 当前时间", args.value(0)?.render().unwrap_or_default());
                Ok(format_time(&Utc::now().with_timezone(&zone)))
            }),
        )
        .on_run(Vec::<String>::new(), |_| Ok(()))
}

/// 形如 `14:05:09 3rd March`
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = time.day();
    format!(
        "{} {}{} {}",
        time.format("%H:%M:%S"),
        day,
        ordinal_suffix(day),
        time.format("%B")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
