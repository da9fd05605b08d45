use time::format_description::FormatItem;
use time::macros::format_description;

use jma_ea::{WeaReader, WeatherDataSource};

/// 表示する日時の書式
const DATETIME_FMT: &[FormatItem<'_>] = format_description!("[month]/[day] [hour]時");

/// 東京（地点番号363）の年間の気温と相対湿度を表示する。
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let path = "resources/wea/METDS-1995.wea";
    let reader = WeaReader::new(path, 363)?;
    let temperature = reader.ambient_temperature()?;
    let humidity = reader.relative_humidity()?;

    println!("地点番号: {}", reader.station());
    println!(
        "気温: 最高 {:.1}℃, 平均 {:.1}℃, 最低 {:.1}℃",
        temperature.max().unwrap_or(f64::NAN),
        temperature.mean().unwrap_or(f64::NAN),
        temperature.min().unwrap_or(f64::NAN),
    );
    for hour in 0..24 {
        let Some(dt) = reader.date_time_at(hour) else {
            break;
        };
        println!(
            "{} {:>6.1}℃ {:>6.1}%",
            dt.format(DATETIME_FMT)?,
            temperature.values()[hour],
            humidity.values()[hour]
        );
    }

    Ok(())
}
