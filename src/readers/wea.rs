use std::path::{Path, PathBuf};

use crate::decoder::{
    StationArchiveDecoder, StationMetadata, StationRecord, EXTENDED_VARIABLES, STANDARD_VARIABLES,
};
use crate::error::{WeatherDataError, WeatherDataResult};
use crate::layout::ArchiveLayout;
use crate::series::{Quantity, VariableSeries};
use crate::source::{SourceFormat, WeatherDataSource};

use super::decode_station_file;

/// 拡張アメダス標準年気象データ（気象要素8レコード）の読み込み
///
/// 相対湿度は、絶対湿度と気温から計算する。
#[derive(Debug, Clone)]
pub struct WeaReader {
    /// パス
    path: PathBuf,
    /// 復号した気象データ
    record: StationRecord,
}

impl WeaReader {
    /// 拡張アメダス標準年気象データファイルを開き、指定された地点の気象データを読み込む。
    ///
    /// # 引数
    ///
    /// * `path` - 開くファイルのパス
    /// * `station` - 拡張アメダスの地点番号（1から842）
    ///
    /// # 戻り値
    ///
    /// `WeaReader`
    pub fn new<P>(path: P, station: i64) -> WeatherDataResult<Self>
    where
        P: AsRef<Path>,
    {
        Self::with_layout(path, station, ArchiveLayout::STANDARD)
    }

    /// ファイルの構成を指定して気象データを読み込む。
    pub fn with_layout<P>(path: P, station: i64, layout: ArchiveLayout) -> WeatherDataResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_owned();
        let decoder = StationArchiveDecoder::new(layout, &STANDARD_VARIABLES, &path);
        let record = decode_station_file(&path, station, &decoder)?;

        Ok(Self { path, record })
    }

    /// ファイルのパスを返す。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 地点番号を返す。
    pub fn station(&self) -> u32 {
        self.record.station()
    }

    /// 復号した気象データを返す。
    pub fn record(&self) -> &StationRecord {
        &self.record
    }
}

impl WeatherDataSource for WeaReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Wea
    }

    fn hours(&self) -> usize {
        self.record.hours()
    }

    fn series(&self, quantity: Quantity) -> WeatherDataResult<&VariableSeries> {
        self.record.series(quantity, SourceFormat::Wea)
    }
}

/// 地点情報レコード付きの拡張アメダス標準年気象データの読み込み
///
/// 気圧と相対湿度は、ファイルに記録されている値を使用する。
#[derive(Debug, Clone)]
pub struct Wea2Reader {
    /// パス
    path: PathBuf,
    /// 地点情報
    metadata: StationMetadata,
    /// 復号した気象データ
    record: StationRecord,
}

impl Wea2Reader {
    /// 拡張アメダス標準年気象データファイルを開き、指定された地点の気象データを読み込む。
    ///
    /// # 引数
    ///
    /// * `path` - 開くファイルのパス
    /// * `station` - 拡張アメダスの地点番号（1から842）
    ///
    /// # 戻り値
    ///
    /// `Wea2Reader`
    pub fn new<P>(path: P, station: i64) -> WeatherDataResult<Self>
    where
        P: AsRef<Path>,
    {
        Self::with_layout(path, station, ArchiveLayout::EXTENDED)
    }

    /// ファイルの構成を指定して気象データを読み込む。
    ///
    /// 構成は地点情報レコードを含んでいる必要がある。
    pub fn with_layout<P>(path: P, station: i64, layout: ArchiveLayout) -> WeatherDataResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_owned();
        let decoder = StationArchiveDecoder::new(layout, &EXTENDED_VARIABLES, &path);
        let record = decode_station_file(&path, station, &decoder)?;
        let metadata = record
            .metadata()
            .cloned()
            .ok_or_else(|| WeatherDataError::MalformedRecord {
                path: path.clone(),
                location: format!("地点番号 {station}"),
                reason: "地点情報レコードがありません。".to_string(),
            })?;

        Ok(Self {
            path,
            metadata,
            record,
        })
    }

    /// ファイルのパスを返す。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 地点番号を返す。
    pub fn station(&self) -> u32 {
        self.record.station()
    }

    /// 復号した気象データを返す。
    pub fn record(&self) -> &StationRecord {
        &self.record
    }

    /// 地点情報レコードを返す。
    pub fn metadata(&self) -> &StationMetadata {
        &self.metadata
    }

    /// 1月1日の観測所名（日本語）を返す。
    pub fn station_name(&self) -> &str {
        &self.metadata.new_years_day.station
    }

    /// 1月1日の観測所名（ローマ字）を返す。
    pub fn station_roman_name(&self) -> &str {
        &self.metadata.new_years_day.station_roman
    }

    /// 緯度（度）を返す。
    pub fn latitude(&self) -> f64 {
        self.metadata.location.latitude()
    }

    /// 経度（度）を返す。
    pub fn longitude(&self) -> f64 {
        self.metadata.location.longitude()
    }

    /// 標高（m）を返す。
    pub fn elevation(&self) -> f64 {
        self.metadata.location.elevation()
    }

    /// 気圧（hPa）
    pub fn pressure(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::AtmosphericPressure)
    }
}

impl WeatherDataSource for Wea2Reader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Wea2
    }

    fn hours(&self) -> usize {
        self.record.hours()
    }

    fn series(&self, quantity: Quantity) -> WeatherDataResult<&VariableSeries> {
        self.record.series(quantity, SourceFormat::Wea2)
    }
}
