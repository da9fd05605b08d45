//! 拡張アメダス標準年気象データの地点ブロックの復号
//!
//! 地点ブロックは、気象要素ごとのレコードで構成される。
//! 各レコードは、地点番号、種別、年を記録したヘッダーと、
//! 1月1日1時から順に記録された毎時の観測値で構成される。
//! 観測値の1の位はリマークで、観測値を10で割った商（負の無限大方向への切り捨て）が値になる。

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::binary::RecordCursor;
use crate::error::{WeatherDataError, WeatherDataResult};
use crate::layout::ArchiveLayout;
use crate::psychrometrics::{clamp_relative_humidity, relative_humidities};
use crate::series::{Quantity, SeriesTable, VariableSeries};
use crate::source::SourceFormat;
use crate::wind::resolve_bucket_directions;

/// 地点情報レコードに記録されている日数
const LOCATION_ROWS: usize = 366;

/// 地点情報レコードの1日分の項目数
const LOCATION_FIELDS: usize = 11;

/// 地点情報レコードの1日分の予備の項目数
const LOCATION_RESERVED_FIELDS: usize = 13;

/// 地点名などの文字列のバイト数
const NAME_LENGTH: usize = 30;

/// 地点情報レコードの種別
pub const METADATA_ENTITY: i16 = 0;

/// 観測値から10で割った商を取り出し、リマークを除去する。
///
/// 負の値は負の無限大方向に切り捨てる（`-7`は`-1`）。
pub fn remove_remark(raw: i16) -> i16 {
    raw.div_euclid(10)
}

/// 1時間あたりの積算値（MJ/m2h）を平均の放射照度（W/m2）に換算する。
pub fn mj_per_hour_to_watt(value: f64) -> f64 {
    value / 3.6 * 1000.0
}

/// レコードに記録されている気象要素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// 気温（0.1℃）
    Temperature,
    /// 絶対湿度（0.1g/kg(DA)）
    AbsoluteHumidity,
    /// 全天日射量（0.01MJ/m2h）
    SolarIrradiation,
    /// 大気放射量（0.01MJ/m2h）
    LongwaveIrradiation,
    /// 風向（16方位の方位番号、0は静穏）
    WindDirectionCode,
    /// 風速（0.1m/s）
    WindSpeed,
    /// 降水量
    Precipitation,
    /// 日照時間
    Sunshine,
    /// 気圧
    Pressure,
    /// 相対湿度（0.1%）
    RelativeHumidity,
}

/// 気象要素と、記録値から物理量への換算係数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableRecord {
    pub variable: Variable,
    /// レコードヘッダーに記録されている種別
    pub entity: i16,
    pub scale_factor: f64,
}

const fn variable(variable: Variable, entity: i16, scale_factor: f64) -> VariableRecord {
    VariableRecord {
        variable,
        entity,
        scale_factor,
    }
}

/// 気象要素8レコードの標準年データの記録順と換算係数
pub const STANDARD_VARIABLES: [VariableRecord; 8] = [
    variable(Variable::Temperature, 1, 0.1),
    variable(Variable::AbsoluteHumidity, 2, 0.1),
    variable(Variable::SolarIrradiation, 3, 0.01),
    variable(Variable::LongwaveIrradiation, 4, 0.01),
    variable(Variable::WindDirectionCode, 5, 1.0),
    variable(Variable::WindSpeed, 6, 0.1),
    variable(Variable::Precipitation, 7, 1.0),
    variable(Variable::Sunshine, 8, 0.1),
];

/// 地点情報レコード付きの標準年データの記録順と換算係数
///
/// 拡張アメダス気象データ（EA気象データ）基礎知識（2020年版）による。
pub const EXTENDED_VARIABLES: [VariableRecord; 10] = [
    variable(Variable::Temperature, 1, 0.1),
    variable(Variable::AbsoluteHumidity, 2, 0.1),
    variable(Variable::SolarIrradiation, 3, 0.01),
    variable(Variable::LongwaveIrradiation, 4, 0.01),
    variable(Variable::WindDirectionCode, 5, 1.0),
    variable(Variable::WindSpeed, 6, 0.1),
    variable(Variable::Precipitation, 7, 0.1),
    variable(Variable::Sunshine, 8, 0.01),
    variable(Variable::Pressure, 9, 1.0),
    variable(Variable::RelativeHumidity, 10, 0.1),
];

/// レコードヘッダー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// 拡張アメダス地点番号
    pub station_number: i16,
    /// 種別
    pub entity: i16,
    /// 年
    pub year: i16,
}

/// 地点情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationInfo {
    /// アメダス観測所番号（上2桁）
    pub station_number_upper2: i16,
    /// アメダス観測所番号（下3桁）
    pub station_number_lower3: i16,
    /// 国際地点番号（上2桁）
    pub international_number_upper2: i16,
    /// 国際地点番号（下3桁）
    pub international_number_lower3: i16,
    /// 緯度（整数部）
    pub latitude_int_part: i16,
    /// 緯度（小数部3桁）
    pub latitude_decimal_part: i16,
    /// 経度（整数部）
    pub longitude_int_part: i16,
    /// 経度（小数部3桁）
    pub longitude_decimal_part: i16,
    /// 標高（0.1m単位）
    pub elevation: i16,
    /// 風速観測高さ（0.1m単位）
    pub observed_wind_speed_height: i16,
    /// 風速補正高さ（0.1m単位）
    pub corrected_wind_speed_height: i16,
}

impl LocationInfo {
    fn from_fields(fields: &[i16]) -> Self {
        Self {
            station_number_upper2: fields[0],
            station_number_lower3: fields[1],
            international_number_upper2: fields[2],
            international_number_lower3: fields[3],
            latitude_int_part: fields[4],
            latitude_decimal_part: fields[5],
            longitude_int_part: fields[6],
            longitude_decimal_part: fields[7],
            elevation: fields[8],
            observed_wind_speed_height: fields[9],
            corrected_wind_speed_height: fields[10],
        }
    }

    /// アメダス観測所番号（5桁）
    pub fn amedas_station_number(&self) -> i32 {
        self.station_number_upper2 as i32 * 1000 + self.station_number_lower3 as i32
    }

    /// 国際地点番号（5桁）
    pub fn international_location_number(&self) -> i32 {
        self.international_number_upper2 as i32 * 1000 + self.international_number_lower3 as i32
    }

    /// 緯度（度）
    pub fn latitude(&self) -> f64 {
        self.latitude_int_part as f64 + self.latitude_decimal_part as f64 / 1000.0
    }

    /// 経度（度）
    pub fn longitude(&self) -> f64 {
        self.longitude_int_part as f64 + self.longitude_decimal_part as f64 / 1000.0
    }

    /// 標高（m）
    pub fn elevation(&self) -> f64 {
        self.elevation as f64 * 0.1
    }

    /// 風速観測高さ（m）
    pub fn observed_wind_speed_height(&self) -> f64 {
        self.observed_wind_speed_height as f64 * 0.1
    }

    /// 風速補正高さ（m）
    pub fn corrected_wind_speed_height(&self) -> f64 {
        self.corrected_wind_speed_height as f64 * 0.1
    }
}

/// 観測所名と都道府県名
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StationName {
    /// 観測所名（日本語）
    pub station: String,
    /// 観測所名（ローマ字）
    pub station_roman: String,
    /// 都道府県名（日本語）
    pub prefecture: String,
    /// 都道府県名（ローマ字）
    pub prefecture_roman: String,
}

/// 地点情報レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationMetadata {
    pub header: RecordHeader,
    /// 1月1日の地点情報
    pub location: LocationInfo,
    /// 1月1日の名称
    pub new_years_day: StationName,
    /// 12月31日の名称
    pub new_years_eve: StationName,
}

/// 復号した1地点分の気象データ
#[derive(Debug, Clone)]
pub struct StationRecord {
    station: u32,
    hours: usize,
    header: RecordHeader,
    metadata: Option<StationMetadata>,
    wind_direction_codes: VariableSeries,
    series: SeriesTable,
}

impl StationRecord {
    /// 地点番号
    pub fn station(&self) -> u32 {
        self.station
    }

    /// 1レコードあたりの時間数
    pub fn hours(&self) -> usize {
        self.hours
    }

    /// 最初の気象要素レコードのヘッダー
    pub fn header(&self) -> RecordHeader {
        self.header
    }

    /// 地点情報レコード
    pub fn metadata(&self) -> Option<&StationMetadata> {
        self.metadata.as_ref()
    }

    /// 記録されている風向の方位番号
    pub fn wind_direction_codes(&self) -> &VariableSeries {
        &self.wind_direction_codes
    }

    pub fn series(
        &self,
        quantity: Quantity,
        format: SourceFormat,
    ) -> WeatherDataResult<&VariableSeries> {
        self.series.get(quantity, format)
    }

    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.series.quantities()
    }
}

/// 地点ブロックの復号器
#[derive(Debug, Clone)]
pub struct StationArchiveDecoder {
    layout: ArchiveLayout,
    variables: &'static [VariableRecord],
    path: PathBuf,
}

impl StationArchiveDecoder {
    /// 復号器を構築する。
    ///
    /// # 引数
    ///
    /// * `layout` - ファイルの構成
    /// * `variables` - 地点情報レコードの後に記録されている気象要素の順序と換算係数
    /// * `path` - エラーの報告に使用するファイルのパス
    pub fn new<P>(layout: ArchiveLayout, variables: &'static [VariableRecord], path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            layout,
            variables,
            path: path.as_ref().to_owned(),
        }
    }

    /// 気象要素8レコードの標準年データの復号器を構築する。
    pub fn standard<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::new(ArchiveLayout::STANDARD, &STANDARD_VARIABLES, path)
    }

    /// 地点情報レコード付きの標準年データの復号器を構築する。
    pub fn extended<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::new(ArchiveLayout::EXTENDED, &EXTENDED_VARIABLES, path)
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// 地点番号が範囲内にあるか確認する。
    ///
    /// # 戻り値
    ///
    /// 範囲内の場合は地点番号、範囲外の場合は`WeatherDataError::InvalidStation`
    pub fn validate_station(&self, station: i64) -> WeatherDataResult<u32> {
        self.layout
            .checked_station(station)
            .ok_or_else(|| WeatherDataError::InvalidStation {
                path: self.path.clone(),
                station,
                max: self.layout.max_station,
            })
    }

    /// 指定された地点の気象データを復号する。
    ///
    /// 地点番号は読み込みを始める前に検証する。
    ///
    /// # 引数
    ///
    /// * `source` - 読み込み元
    /// * `station` - 地点番号（1始まり）
    ///
    /// # 戻り値
    ///
    /// `StationRecord`
    pub fn decode<R>(&self, source: R, station: i64) -> WeatherDataResult<StationRecord>
    where
        R: Read + Seek,
    {
        let station = self.validate_station(station)?;
        let mut cursor = RecordCursor::new(source);

        let metadata = if 0 < self.layout.metadata_records {
            Some(self.read_metadata(&mut cursor, station)?)
        } else {
            None
        };

        let mut first_header: Option<RecordHeader> = None;
        let mut decoded = Vec::with_capacity(self.variables.len());
        for (i, record) in self.variables.iter().enumerate() {
            let index = self.layout.metadata_records + i as u64;
            let offset = self.layout.record_offset(station, index);
            self.seek(&mut cursor, station, offset)?;
            let header = self.read_header(&mut cursor, station)?;
            debug!(
                "地点番号: {}, 種別: {}, 年: {}, 位置: {offset}",
                header.station_number, header.entity, header.year
            );
            let reference = *first_header.get_or_insert(header);
            let expected = RecordHeader {
                entity: record.entity,
                ..reference
            };
            self.validate_header(station, offset, &expected, &header)?;

            let raw = cursor
                .read_i16_run(self.layout.samples_per_record())
                .map_err(|e| self.io_error(station, cursor.position(), e))?;
            let values = raw
                .into_iter()
                .map(|v| remove_remark(v) as f64 * record.scale_factor)
                .collect::<Vec<_>>();
            decoded.push((*record, values));
        }

        let header = first_header.ok_or_else(|| WeatherDataError::MalformedRecord {
            path: self.path.clone(),
            location: format!("地点番号 {station}"),
            reason: "気象要素のレコードがありません。".to_string(),
        })?;
        if let Some(metadata) = &metadata {
            let expected = RecordHeader {
                entity: METADATA_ENTITY,
                ..header
            };
            let offset = self.layout.record_offset(station, 0);
            self.validate_header(station, offset, &expected, &metadata.header)?;
        }
        let (wind_direction_codes, series) = self.derive_series(station, decoded)?;
        info!(
            "地点番号{station}の気象データを復号しました。`{}`",
            self.path.display()
        );

        Ok(StationRecord {
            station,
            hours: self.layout.samples_per_record(),
            header,
            metadata,
            wind_direction_codes,
            series,
        })
    }

    /// 復号した気象要素から、物理量の時系列を構築する。
    fn derive_series(
        &self,
        station: u32,
        decoded: Vec<(VariableRecord, Vec<f64>)>,
    ) -> WeatherDataResult<(VariableSeries, SeriesTable)> {
        let mut table = SeriesTable::new();
        let mut codes = None;
        let mut stored_relative_humidity = None;
        for (record, values) in decoded {
            let scale_factor = record.scale_factor;
            let series = match record.variable {
                Variable::Temperature => {
                    VariableSeries::new(Quantity::AmbientTemperature, scale_factor, values)
                }
                Variable::AbsoluteHumidity => {
                    VariableSeries::new(Quantity::AbsoluteHumidity, scale_factor, values)
                }
                Variable::SolarIrradiation => VariableSeries::new(
                    Quantity::HorizontalGlobalSolarIrradiation,
                    scale_factor,
                    values.into_iter().map(mj_per_hour_to_watt).collect(),
                ),
                Variable::LongwaveIrradiation => VariableSeries::new(
                    Quantity::DownwardLongwaveIrradiation,
                    scale_factor,
                    values.into_iter().map(mj_per_hour_to_watt).collect(),
                ),
                Variable::WindDirectionCode => {
                    codes = Some(VariableSeries::new(
                        Quantity::WindDirection,
                        scale_factor,
                        values,
                    ));
                    continue;
                }
                Variable::WindSpeed => {
                    VariableSeries::new(Quantity::WindVelocity, scale_factor, values)
                }
                Variable::Precipitation => {
                    VariableSeries::new(Quantity::PrecipitationAmount, scale_factor, values)
                }
                Variable::Sunshine => {
                    VariableSeries::new(Quantity::SunshineDuration, scale_factor, values)
                }
                Variable::Pressure => {
                    VariableSeries::new(Quantity::AtmosphericPressure, scale_factor, values)
                }
                Variable::RelativeHumidity => {
                    stored_relative_humidity = Some(VariableSeries::new(
                        Quantity::RelativeHumidity,
                        scale_factor,
                        values,
                    ));
                    continue;
                }
            };
            table.insert(series);
        }

        let codes =
            codes.ok_or_else(|| self.missing_variable(station, Variable::WindDirectionCode))?;
        let speeds = table
            .get(Quantity::WindVelocity, SourceFormat::Wea)
            .map_err(|_| self.missing_variable(station, Variable::WindSpeed))?;
        let directions = VariableSeries::new(
            Quantity::WindDirection,
            codes.scale_factor(),
            resolve_bucket_directions(codes.values(), speeds.values()),
        );
        table.insert(directions);

        let relative_humidity = match stored_relative_humidity {
            Some(stored) => stored.map(Quantity::RelativeHumidity, clamp_relative_humidity),
            None => {
                let temperatures = table
                    .get(Quantity::AmbientTemperature, SourceFormat::Wea)
                    .map_err(|_| self.missing_variable(station, Variable::Temperature))?;
                let humidities = table
                    .get(Quantity::AbsoluteHumidity, SourceFormat::Wea)
                    .map_err(|_| self.missing_variable(station, Variable::AbsoluteHumidity))?;
                VariableSeries::new(
                    Quantity::RelativeHumidity,
                    1.0,
                    relative_humidities(humidities.values(), temperatures.values()),
                )
            }
        };
        table.insert(relative_humidity);

        Ok((codes, table))
    }

    /// 地点情報レコードを読み込む。
    fn read_metadata<R>(
        &self,
        cursor: &mut RecordCursor<R>,
        station: u32,
    ) -> WeatherDataResult<StationMetadata>
    where
        R: Read + Seek,
    {
        let offset = self.layout.record_offset(station, 0);
        self.seek(cursor, station, offset)?;
        let header = self.read_header(cursor, station)?;
        debug!(
            "地点情報レコード 地点番号: {}, 種別: {}, 年: {}",
            header.station_number, header.entity, header.year
        );

        // 1日目の地点情報だけを使用する
        let fields = cursor
            .read_i16_run(LOCATION_FIELDS)
            .map_err(|e| self.io_error(station, cursor.position(), e))?;
        let location = LocationInfo::from_fields(&fields);
        let rest = LOCATION_RESERVED_FIELDS * 2
            + (LOCATION_ROWS - 1) * (LOCATION_FIELDS + LOCATION_RESERVED_FIELDS) * 2;
        let position = cursor.position();
        cursor
            .skip(rest as u64)
            .map_err(|e| self.io_error(station, position, e))?;

        let new_years_day = self.read_station_name(cursor, station)?;
        let new_years_eve = self.read_station_name(cursor, station)?;

        Ok(StationMetadata {
            header,
            location,
            new_years_day,
            new_years_eve,
        })
    }

    fn read_station_name<R>(
        &self,
        cursor: &mut RecordCursor<R>,
        station: u32,
    ) -> WeatherDataResult<StationName>
    where
        R: Read + Seek,
    {
        let read = |cursor: &mut RecordCursor<R>| {
            cursor
                .read_sjis_str(NAME_LENGTH)
                .map_err(|e| self.io_error(station, cursor.position(), e))
        };

        Ok(StationName {
            station: read(cursor)?,
            station_roman: read(cursor)?,
            prefecture: read(cursor)?,
            prefecture_roman: read(cursor)?,
        })
    }

    fn read_header<R>(
        &self,
        cursor: &mut RecordCursor<R>,
        station: u32,
    ) -> WeatherDataResult<RecordHeader>
    where
        R: Read + Seek,
    {
        let fields = cursor
            .read_i16_run(3)
            .map_err(|e| self.io_error(station, cursor.position(), e))?;

        Ok(RecordHeader {
            station_number: fields[0],
            entity: fields[1],
            year: fields[2],
        })
    }

    /// レコードヘッダーの地点番号、種別、年が期待値と一致するか確認する。
    ///
    /// 地点番号と年の期待値は、ブロックの最初の気象要素のレコードである。
    fn validate_header(
        &self,
        station: u32,
        offset: u64,
        expected: &RecordHeader,
        actual: &RecordHeader,
    ) -> WeatherDataResult<()> {
        let reason = if actual.station_number != expected.station_number {
            format!(
                "レコードヘッダーの地点番号が一致しません。期待値: {}, 実際: {}",
                expected.station_number, actual.station_number
            )
        } else if actual.entity != expected.entity {
            format!(
                "レコードヘッダーの種別が一致しません。期待値: {}, 実際: {}",
                expected.entity, actual.entity
            )
        } else if actual.year != expected.year {
            format!(
                "レコードヘッダーの年が一致しません。期待値: {}, 実際: {}",
                expected.year, actual.year
            )
        } else {
            return Ok(());
        };

        Err(WeatherDataError::MalformedRecord {
            path: self.path.clone(),
            location: format!("地点番号 {station}, 位置 {offset}"),
            reason,
        })
    }

    fn seek<R>(
        &self,
        cursor: &mut RecordCursor<R>,
        station: u32,
        offset: u64,
    ) -> WeatherDataResult<()>
    where
        R: Read + Seek,
    {
        cursor
            .seek_to(offset)
            .map_err(|e| self.io_error(station, offset, e))
    }

    fn io_error(&self, station: u32, offset: u64, source: std::io::Error) -> WeatherDataError {
        WeatherDataError::Io {
            path: self.path.clone(),
            station,
            offset,
            source,
        }
    }

    fn missing_variable(&self, station: u32, variable: Variable) -> WeatherDataError {
        WeatherDataError::MalformedRecord {
            path: self.path.clone(),
            location: format!("地点番号 {station}"),
            reason: format!("{variable:?}のレコードが構成されていません。"),
        }
    }
}
