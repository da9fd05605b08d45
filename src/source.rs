use std::fmt;

use time::PrimitiveDateTime;

use crate::error::WeatherDataResult;
use crate::series::{hour_to_date_time, Quantity, VariableSeries, REFERENCE_YEAR};

/// 気象データ形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// 拡張アメダス標準年気象データ（気象要素8レコード）
    Wea,
    /// 拡張アメダス標準年気象データ（地点情報レコード付き）
    Wea2,
    /// EnergyPlus Weather
    Epw,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wea => "拡張アメダス",
            Self::Wea2 => "拡張アメダス（2020年版）",
            Self::Epw => "EPW",
        };
        write!(f, "{name}")
    }
}

/// 年間の毎時気象データ
///
/// 各アクセサーは、気象データが記録している時間数と同じ長さの時系列を返す。
/// 気象データ形式が提供しない物理量は`WeatherDataError::UnsupportedQuantity`を返す。
pub trait WeatherDataSource {
    /// 気象データ形式を返す。
    fn format(&self) -> SourceFormat;

    /// 記録されている時間数を返す。
    fn hours(&self) -> usize;

    /// 物理量の時系列を返す。
    fn series(&self, quantity: Quantity) -> WeatherDataResult<&VariableSeries>;

    /// 物理量を提供できるか確認する。
    fn supports(&self, quantity: Quantity) -> bool {
        self.series(quantity).is_ok()
    }

    /// `hour`番目の時間帯の開始日時を返す。
    ///
    /// 標準年は特定の年を示さないため、日時は基準年（閏年でない年）で表現する。
    fn date_time_at(&self, hour: usize) -> Option<PrimitiveDateTime> {
        if self.hours() <= hour {
            return None;
        }

        hour_to_date_time(REFERENCE_YEAR, hour)
    }

    /// 気温（℃）
    fn ambient_temperature(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::AmbientTemperature)
    }

    /// 絶対湿度（g/kg(DA)）
    fn absolute_humidity(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::AbsoluteHumidity)
    }

    /// 相対湿度（%）
    fn relative_humidity(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::RelativeHumidity)
    }

    /// 水平面全天日射量（W/m2）
    fn horizontal_global_solar_irradiation(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::HorizontalGlobalSolarIrradiation)
    }

    /// 大気放射量（W/m2）
    fn downward_longwave_irradiation(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::DownwardLongwaveIrradiation)
    }

    /// 風向（度、静穏は`wind::CALM`）
    fn wind_direction(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::WindDirection)
    }

    /// 風速（m/s）
    fn wind_velocity(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::WindVelocity)
    }

    /// 降水量（mm）
    fn precipitation_amount(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::PrecipitationAmount)
    }

    /// 日照時間（h）
    fn sunshine_duration(&self) -> WeatherDataResult<&VariableSeries> {
        self.series(Quantity::SunshineDuration)
    }
}
