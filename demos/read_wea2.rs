use time::macros::date;

use jma_ea::{Wea2Reader, WeatherDataSource};

/// 地点情報を表示した後、暖房期間（11月から3月）の日平均気温を表示する。
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let path = "resources/wea2/METDS-2010.wea";
    let reader = Wea2Reader::new(path, 363)?;
    println!(
        "{} ({}) 緯度: {:.3} 経度: {:.3} 標高: {:.1}m",
        reader.station_name(),
        reader.station_roman_name(),
        reader.latitude(),
        reader.longitude(),
        reader.elevation()
    );

    let daily = reader
        .ambient_temperature()?
        .daily_statistics(date!(2001 - 01 - 01), 24);
    let heating = daily
        .iter()
        .filter(|d| !(4..=10).contains(&(d.date.month() as u8)));
    for day in heating {
        println!(
            "{} 最高 {:>5.1}℃ 平均 {:>5.1}℃ 最低 {:>5.1}℃",
            day.date, day.max, day.mean, day.min
        );
    }
    if let Some(mean) = reader.pressure()?.mean() {
        println!("年平均気圧: {mean:.1}hPa");
    }

    Ok(())
}
