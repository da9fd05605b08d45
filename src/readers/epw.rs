//! EnergyPlus Weather（EPW）ファイルの読み込み
//!
//! 先頭8行のヘッダーの後に、1時間1行で35列のデータが記録されている。

use std::fs::OpenOptions;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::{debug, info};

use crate::error::{WeatherDataError, WeatherDataResult};
use crate::psychrometrics::clamp_relative_humidity;
use crate::series::{Quantity, SeriesTable, VariableSeries, REFERENCE_YEAR};
use crate::source::{SourceFormat, WeatherDataSource};
use crate::wind::bucket_continuous_directions;

/// ヘッダーの行数
const HEADER_LINES: usize = 8;

/// データ行の列数
const COLUMNS: usize = 35;

const COLUMN_MONTH: usize = 1;
const COLUMN_DAY: usize = 2;
const COLUMN_HOUR: usize = 3; // 1-24
const COLUMN_DRY_BULB: usize = 6; // ℃
const COLUMN_RELATIVE_HUMIDITY: usize = 8; // %
const COLUMN_HORIZONTAL_INFRARED: usize = 12; // Wh/m2
const COLUMN_GLOBAL_HORIZONTAL: usize = 13; // Wh/m2
const COLUMN_WIND_DIRECTION: usize = 20; // deg
const COLUMN_WIND_SPEED: usize = 21; // m/s
const COLUMN_LIQUID_PRECIPITATION: usize = 33; // mm

/// 1年分のデータ行数
const LIKELY_HOURS: usize = 8760;

/// EPWのLOCATION行
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EpwLocation {
    /// 都市名
    pub city: String,
    /// 州・県名
    pub state: String,
    /// 国名
    pub country: String,
    /// データの出典
    pub source: String,
    /// WMO地点番号
    pub wmo: String,
    /// 緯度（度、北緯が正）
    pub latitude: f64,
    /// 経度（度、東経が正）
    pub longitude: f64,
    /// 標準時（UTCからの時差）
    pub time_zone: f64,
    /// 標高（m）
    pub elevation: f64,
}

/// データ行の月日時
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowTime {
    month: u8,
    day: u8,
    hour: u8,
}

/// EPWファイルの読み込み
///
/// 絶対湿度と日照時間は記録されていないため提供しない。
/// 相対湿度は0%から100%の範囲に収める（欠測値の999は100%になる）。
#[derive(Debug, Clone)]
pub struct EpwReader {
    /// パス
    path: PathBuf,
    /// LOCATION行
    location: EpwLocation,
    /// 各行の月日時
    row_times: Vec<RowTime>,
    /// 物理量ごとの時系列
    series: SeriesTable,
}

impl EpwReader {
    /// EPWファイルを開いて読み込む。
    ///
    /// # 引数
    ///
    /// * `path` - 開くEPWファイルのパス
    ///
    /// # 戻り値
    ///
    /// `EpwReader`
    pub fn new<P>(path: P) -> WeatherDataResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!("ファイルを開きます。`{}`", path.display());
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| WeatherDataError::Open {
                path: path.to_owned(),
                source: e,
            })?;

        Self::from_reader(BufReader::new(file), path)
    }

    /// 読み込み元からEPWを読み込む。
    ///
    /// # 引数
    ///
    /// * `reader` - 読み込み元
    /// * `path` - エラーの報告に使用するパス
    pub fn from_reader<R, P>(reader: R, path: P) -> WeatherDataResult<Self>
    where
        R: Read,
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_owned();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut location = None;
        let mut row_times = Vec::with_capacity(LIKELY_HOURS);
        let mut dry_bulbs: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut relative_humidities: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut infrared: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut global_horizontal: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut wind_directions: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut wind_speeds: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);
        let mut precipitations: Vec<f64> = Vec::with_capacity(LIKELY_HOURS);

        let mut record = StringRecord::new();
        let mut line = 0usize;
        while reader
            .read_record(&mut record)
            .map_err(|e| WeatherDataError::Csv {
                path: path.clone(),
                source: e,
            })?
        {
            line += 1;
            if line == 1 {
                location = Some(parse_location(&record, &path)?);
                continue;
            }
            if line <= HEADER_LINES {
                continue;
            }
            if record.len() < COLUMNS {
                return Err(malformed(
                    &path,
                    line,
                    format!("列数が{COLUMNS}未満です。実際には{}列でした。", record.len()),
                ));
            }

            row_times.push(RowTime {
                month: parse_field(&record, COLUMN_MONTH, &path, line)?,
                day: parse_field(&record, COLUMN_DAY, &path, line)?,
                hour: parse_field(&record, COLUMN_HOUR, &path, line)?,
            });
            dry_bulbs.push(parse_field(&record, COLUMN_DRY_BULB, &path, line)?);
            let relative_humidity: f64 =
                parse_field(&record, COLUMN_RELATIVE_HUMIDITY, &path, line)?;
            relative_humidities.push(clamp_relative_humidity(relative_humidity));
            infrared.push(parse_field(&record, COLUMN_HORIZONTAL_INFRARED, &path, line)?);
            global_horizontal.push(parse_field(&record, COLUMN_GLOBAL_HORIZONTAL, &path, line)?);
            wind_directions.push(parse_field(&record, COLUMN_WIND_DIRECTION, &path, line)?);
            wind_speeds.push(parse_field(&record, COLUMN_WIND_SPEED, &path, line)?);
            precipitations.push(parse_field(&record, COLUMN_LIQUID_PRECIPITATION, &path, line)?);
        }

        let location = location.ok_or_else(|| malformed(&path, 1, "LOCATION行がありません。"))?;
        if row_times.is_empty() {
            return Err(malformed(&path, line, "データ行がありません。"));
        }

        let directions = bucket_continuous_directions(&wind_directions, &wind_speeds);
        let mut series = SeriesTable::new();
        series.insert(VariableSeries::new(Quantity::AmbientTemperature, 1.0, dry_bulbs));
        series.insert(VariableSeries::new(
            Quantity::RelativeHumidity,
            1.0,
            relative_humidities,
        ));
        series.insert(VariableSeries::new(
            Quantity::HorizontalGlobalSolarIrradiation,
            1.0,
            global_horizontal,
        ));
        series.insert(VariableSeries::new(
            Quantity::DownwardLongwaveIrradiation,
            1.0,
            infrared,
        ));
        series.insert(VariableSeries::new(Quantity::WindDirection, 1.0, directions));
        series.insert(VariableSeries::new(Quantity::WindVelocity, 1.0, wind_speeds));
        series.insert(VariableSeries::new(
            Quantity::PrecipitationAmount,
            1.0,
            precipitations,
        ));
        info!(
            "EPWを{}時間分読み込みました。`{}`",
            row_times.len(),
            path.display()
        );

        Ok(Self {
            path,
            location,
            row_times,
            series,
        })
    }

    /// ファイルのパスを返す。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// LOCATION行を返す。
    pub fn location(&self) -> &EpwLocation {
        &self.location
    }
}

impl WeatherDataSource for EpwReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Epw
    }

    fn hours(&self) -> usize {
        self.row_times.len()
    }

    fn series(&self, quantity: Quantity) -> WeatherDataResult<&VariableSeries> {
        self.series.get(quantity, SourceFormat::Epw)
    }

    /// 行に記録されている月日時から、時間帯の開始日時を返す。
    ///
    /// 年は基準年とする。基準年に存在しない日付（2月29日）は`None`を返す。
    fn date_time_at(&self, hour: usize) -> Option<PrimitiveDateTime> {
        let t = self.row_times.get(hour)?;
        let month = Month::try_from(t.month).ok()?;
        let date = Date::from_calendar_date(REFERENCE_YEAR, month, t.day).ok()?;
        let time = Time::from_hms(t.hour.checked_sub(1)?, 0, 0).ok()?;

        Some(PrimitiveDateTime::new(date, time))
    }
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> WeatherDataError {
    WeatherDataError::MalformedRecord {
        path: path.to_owned(),
        location: format!("{line}行目"),
        reason: reason.into(),
    }
}

fn parse_field<T>(
    record: &StringRecord,
    index: usize,
    path: &Path,
    line: usize,
) -> WeatherDataResult<T>
where
    T: std::str::FromStr,
{
    let value = record
        .get(index)
        .ok_or_else(|| malformed(path, line, format!("{}列目がありません。", index + 1)))?
        .trim();

    value.parse().map_err(|_| {
        malformed(
            path,
            line,
            format!("{}列目の値を解釈できません。`{value}`", index + 1),
        )
    })
}

fn parse_location(record: &StringRecord, path: &Path) -> WeatherDataResult<EpwLocation> {
    if record.get(0).map(str::trim) != Some("LOCATION") || record.len() < 10 {
        return Err(malformed(path, 1, "LOCATION行の形式が不正です。"));
    }
    let text = |index: usize| record.get(index).unwrap_or_default().trim().to_string();

    Ok(EpwLocation {
        city: text(1),
        state: text(2),
        country: text(3),
        source: text(4),
        wmo: text(5),
        latitude: parse_field(record, 6, path, 1)?,
        longitude: parse_field(record, 7, path, 1)?,
        time_zone: parse_field(record, 8, path, 1)?,
        elevation: parse_field(record, 9, path, 1)?,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::wind::CALM;

    const PREAMBLE: &str = "\
LOCATION,Tokyo,TK,JPN,SRC-TMYx,476710,35.553,139.781,9.0,6.4
DESIGN CONDITIONS,0
TYPICAL/EXTREME PERIODS,0
GROUND TEMPERATURES,0
HOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0
COMMENTS 1,\"Custom/User Format\" -- WMO#476710
COMMENTS 2,synthetic
DATA PERIODS,1,1,Data,Sunday, 1/ 1,12/31
";

    fn row(hour: u8, dry_bulb: f64, wind_direction: f64, wind_speed: f64) -> String {
        format!(
            "2005,1,1,{hour},60,?9?9?9?9E0?9?9?9?9*9?9?9?9?9?9?9?9?9?9*_*9*9*9*9*9,\
{dry_bulb},-2.0,55,101300,0,0,250,120,0,120,9999,9999,9999,9999,\
{wind_direction},{wind_speed},0,0,20.0,77777,9,999999999,0,0.0610,0,88,0.160,1.5,1.0"
        )
    }

    fn epw(rows: &[String]) -> String {
        let mut text = PREAMBLE.to_string();
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        text
    }

    #[test]
    fn reads_rows_and_location() {
        let text = epw(&[row(1, 5.5, 95.0, 2.1), row(2, -1.0, 350.0, 0.0)]);
        let reader = EpwReader::from_reader(text.as_bytes(), "tokyo.epw").unwrap();

        assert_eq!(reader.hours(), 2);
        assert_eq!(reader.location().city, "Tokyo");
        assert_eq!(reader.location().wmo, "476710");
        assert!((reader.location().latitude - 35.553).abs() < 1e-9);
        assert!((reader.location().elevation - 6.4).abs() < 1e-9);

        assert_eq!(reader.ambient_temperature().unwrap().values(), &[5.5, -1.0]);
        assert_eq!(reader.relative_humidity().unwrap().values(), &[55.0, 55.0]);
        assert_eq!(
            reader.horizontal_global_solar_irradiation().unwrap().values(),
            &[120.0, 120.0]
        );
        assert_eq!(
            reader.downward_longwave_irradiation().unwrap().values(),
            &[250.0, 250.0]
        );
        assert_eq!(reader.wind_direction().unwrap().values(), &[90.0, CALM]);
        assert_eq!(reader.wind_velocity().unwrap().values(), &[2.1, 0.0]);
        assert_eq!(reader.precipitation_amount().unwrap().values(), &[1.5, 1.5]);
    }

    #[test]
    fn unsupported_quantities() {
        let text = epw(&[row(1, 5.5, 95.0, 2.1)]);
        let reader = EpwReader::from_reader(text.as_bytes(), "tokyo.epw").unwrap();
        for quantity in [Quantity::AbsoluteHumidity, Quantity::SunshineDuration] {
            assert!(!reader.supports(quantity));
            match reader.series(quantity) {
                Err(WeatherDataError::UnsupportedQuantity { format, .. }) => {
                    assert_eq!(format, SourceFormat::Epw)
                }
                other => panic!("expected UnsupportedQuantity, got {other:?}"),
            }
        }
        assert!(reader.absolute_humidity().is_err());
        assert!(reader.sunshine_duration().is_err());
    }

    #[test]
    fn relative_humidity_is_clamped() {
        let text = epw(&[
            row(1, 5.5, 95.0, 2.1).replace(",55,101300,", ",999,101300,"),
            row(2, 5.5, 95.0, 2.1).replace(",55,101300,", ",-3,101300,"),
            row(3, 5.5, 95.0, 2.1),
        ]);
        let reader = EpwReader::from_reader(text.as_bytes(), "tokyo.epw").unwrap();
        let rh = reader.relative_humidity().unwrap();
        assert_eq!(rh.values(), &[100.0, 0.0, 55.0]);
    }

    #[test]
    fn row_timestamps() {
        let text = epw(&[row(1, 5.5, 95.0, 2.1), row(24, 5.5, 95.0, 2.1)]);
        let reader = EpwReader::from_reader(text.as_bytes(), "tokyo.epw").unwrap();
        assert_eq!(reader.date_time_at(0), Some(datetime!(2001-01-01 00:00)));
        assert_eq!(reader.date_time_at(1), Some(datetime!(2001-01-01 23:00)));
        assert_eq!(reader.date_time_at(2), None);
    }

    #[test]
    fn short_rows_are_malformed() {
        let text = epw(&["2005,1,1,1,60,x,5.0".to_string()]);
        match EpwReader::from_reader(text.as_bytes(), "short.epw") {
            Err(WeatherDataError::MalformedRecord { location, .. }) => {
                assert_eq!(location, "9行目")
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_values_are_malformed() {
        let text = epw(&[row(1, 5.5, 95.0, 2.1).replace(",5.5,", ",abc,")]);
        let err = EpwReader::from_reader(text.as_bytes(), "bad.epw").unwrap_err();
        assert!(matches!(err, WeatherDataError::MalformedRecord { .. }));
    }

    #[test]
    fn missing_location_is_malformed() {
        let text = epw(&[row(1, 5.5, 95.0, 2.1)]).replacen("LOCATION", "PLACE", 1);
        let err = EpwReader::from_reader(text.as_bytes(), "bad.epw").unwrap_err();
        assert!(matches!(err, WeatherDataError::MalformedRecord { .. }));
    }

    #[test]
    fn empty_data_is_malformed() {
        let err = EpwReader::from_reader(PREAMBLE.as_bytes(), "empty.epw").unwrap_err();
        assert!(matches!(err, WeatherDataError::MalformedRecord { .. }));
    }
}
