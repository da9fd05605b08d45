use jma_ea::{EpwReader, WeatherDataSource};

/// EPWファイルの地点と、1月1日の風向と風速を表示する。
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let path = "resources/epw/JPN_TK_Tokyo.476620_TMYx.epw";
    let reader = EpwReader::new(path)?;
    let location = reader.location();
    println!(
        "{}, {} ({}) 緯度: {} 経度: {} 標高: {}m",
        location.city,
        location.country,
        location.wmo,
        location.latitude,
        location.longitude,
        location.elevation
    );

    let directions = reader.wind_direction()?;
    let speeds = reader.wind_velocity()?;
    for hour in 0..24.min(reader.hours()) {
        let Some(dt) = reader.date_time_at(hour) else {
            continue;
        };
        println!(
            "{dt} {:>8.1}° {:>5.1}m/s",
            directions.values()[hour],
            speeds.values()[hour]
        );
    }

    Ok(())
}
