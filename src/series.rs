use std::collections::BTreeMap;
use std::fmt;

use time::{Date, Duration, PrimitiveDateTime};

use crate::error::{WeatherDataError, WeatherDataResult};
use crate::source::SourceFormat;
use crate::wind::CALM;

/// 時刻を割り当てるときに使用する基準年
///
/// 標準年は特定の年を示さないため、閏年でない年を基準にする。
pub const REFERENCE_YEAR: i32 = 2001;

/// 物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    /// 気温
    AmbientTemperature,
    /// 絶対湿度
    AbsoluteHumidity,
    /// 相対湿度
    RelativeHumidity,
    /// 水平面全天日射量
    HorizontalGlobalSolarIrradiation,
    /// 大気放射量
    DownwardLongwaveIrradiation,
    /// 風向
    WindDirection,
    /// 風速
    WindVelocity,
    /// 降水量
    PrecipitationAmount,
    /// 日照時間
    SunshineDuration,
    /// 気圧
    AtmosphericPressure,
}

impl Quantity {
    /// 物理量の単位を返す。
    pub fn unit(&self) -> Unit {
        match self {
            Self::AmbientTemperature => Unit::DegreeCelsius,
            Self::AbsoluteHumidity => Unit::GramPerKilogram,
            Self::RelativeHumidity => Unit::Percent,
            Self::HorizontalGlobalSolarIrradiation | Self::DownwardLongwaveIrradiation => {
                Unit::WattPerSquareMetre
            }
            Self::WindDirection => Unit::Degree,
            Self::WindVelocity => Unit::MetrePerSecond,
            Self::PrecipitationAmount => Unit::Millimetre,
            Self::SunshineDuration => Unit::Hour,
            Self::AtmosphericPressure => Unit::Hectopascal,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AmbientTemperature => "気温",
            Self::AbsoluteHumidity => "絶対湿度",
            Self::RelativeHumidity => "相対湿度",
            Self::HorizontalGlobalSolarIrradiation => "水平面全天日射量",
            Self::DownwardLongwaveIrradiation => "大気放射量",
            Self::WindDirection => "風向",
            Self::WindVelocity => "風速",
            Self::PrecipitationAmount => "降水量",
            Self::SunshineDuration => "日照時間",
            Self::AtmosphericPressure => "気圧",
        };
        write!(f, "{name}")
    }
}

/// 単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// ℃
    DegreeCelsius,
    /// g/kg(DA)
    GramPerKilogram,
    /// %
    Percent,
    /// W/m2
    WattPerSquareMetre,
    /// 度（北を360度とする時計回り）
    Degree,
    /// m/s
    MetrePerSecond,
    /// mm
    Millimetre,
    /// 時間
    Hour,
    /// hPa
    Hectopascal,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::DegreeCelsius => "℃",
            Self::GramPerKilogram => "g/kg",
            Self::Percent => "%",
            Self::WattPerSquareMetre => "W/m2",
            Self::Degree => "deg",
            Self::MetrePerSecond => "m/s",
            Self::Millimetre => "mm",
            Self::Hour => "h",
            Self::Hectopascal => "hPa",
        };
        write!(f, "{symbol}")
    }
}

/// 1つの物理量の時系列
///
/// 構築後は変更できない。
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSeries {
    quantity: Quantity,
    scale_factor: f64,
    values: Vec<f64>,
}

impl VariableSeries {
    /// 時系列を構築する。
    ///
    /// # 引数
    ///
    /// * `quantity` - 物理量
    /// * `scale_factor` - 記録値から物理量に換算したときの係数
    /// * `values` - 時刻順に並べた値
    pub fn new(quantity: Quantity, scale_factor: f64, values: Vec<f64>) -> Self {
        Self {
            quantity,
            scale_factor,
            values,
        }
    }

    /// 元の時系列の各値を変換した、新しい時系列を返す。
    pub fn map<F>(&self, quantity: Quantity, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            quantity,
            scale_factor: self.scale_factor,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit(&self) -> Unit {
        self.quantity.unit()
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, hour: usize) -> Option<f64> {
        self.values.get(hour).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// 統計に使用できる値を返す。
    ///
    /// 有限でない値と、風向の静穏を示す値は除外する。
    fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        let is_direction = self.quantity == Quantity::WindDirection;
        self.values
            .iter()
            .copied()
            .filter(move |v| v.is_finite() && !(is_direction && *v == CALM))
    }

    pub fn min(&self) -> Option<f64> {
        self.valid_values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.valid_values().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        mean(self.valid_values())
    }

    /// 日ごとの最大値、平均値、最小値を返す。
    ///
    /// # 引数
    ///
    /// * `start` - 時系列の最初の値の日付
    /// * `hours_per_day` - 1日の時間数
    ///
    /// # 戻り値
    ///
    /// 日ごとの統計値。統計に使用できる値が1つもない日は含まない。
    pub fn daily_statistics(&self, start: Date, hours_per_day: usize) -> Vec<DailyStatistics> {
        if hours_per_day == 0 {
            return Vec::new();
        }
        let is_direction = self.quantity == Quantity::WindDirection;
        let mut statistics = Vec::with_capacity(self.values.len() / hours_per_day);
        for (day, hours) in self.values.chunks(hours_per_day).enumerate() {
            let Some(date) = start.checked_add(Duration::days(day as i64)) else {
                break;
            };
            let valid: Vec<f64> = hours
                .iter()
                .copied()
                .filter(|v| v.is_finite() && !(is_direction && *v == CALM))
                .collect();
            let (Some(max), Some(min), Some(mean)) = (
                valid.iter().copied().reduce(f64::max),
                valid.iter().copied().reduce(f64::min),
                mean(valid.iter().copied()),
            ) else {
                continue;
            };
            statistics.push(DailyStatistics {
                date,
                max,
                mean,
                min,
            });
        }

        statistics
    }
}

fn mean<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// 日ごとの統計値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyStatistics {
    pub date: Date,
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

/// 基準年の1月1日0時からの経過時間を日時に変換する。
///
/// 日時は各時間帯の開始時刻を示す。
pub fn hour_to_date_time(year: i32, hour: usize) -> Option<PrimitiveDateTime> {
    let start = Date::from_ordinal_date(year, 1).ok()?.midnight();

    start.checked_add(Duration::hours(i64::try_from(hour).ok()?))
}

/// 物理量ごとの時系列の表
///
/// 気象データ形式が提供できる物理量だけを保持する。
#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    series: BTreeMap<Quantity, VariableSeries>,
}

impl SeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 時系列を登録する。
    ///
    /// 同じ物理量が登録済みの場合は置き換える。
    pub fn insert(&mut self, series: VariableSeries) {
        self.series.insert(series.quantity(), series);
    }

    pub fn contains(&self, quantity: Quantity) -> bool {
        self.series.contains_key(&quantity)
    }

    /// 物理量の時系列を返す。
    ///
    /// # 戻り値
    ///
    /// 登録されていない物理量の場合は`WeatherDataError::UnsupportedQuantity`
    pub fn get(
        &self,
        quantity: Quantity,
        format: SourceFormat,
    ) -> WeatherDataResult<&VariableSeries> {
        self.series
            .get(&quantity)
            .ok_or(WeatherDataError::UnsupportedQuantity { quantity, format })
    }

    /// 登録されている物理量を返す。
    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.series.keys().copied()
    }
}
