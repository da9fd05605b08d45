//! 拡張アメダス標準年気象データとEPWファイルの読み込み
//!
//! どの形式も`WeatherDataSource`を通じて、同じ単位の毎時時系列として読み込める。

pub mod binary;
pub mod decoder;
pub mod error;
pub mod layout;
pub mod psychrometrics;
pub mod readers;
pub mod series;
pub mod source;
pub mod wind;

pub use error::{WeatherDataError, WeatherDataResult};
pub use layout::ArchiveLayout;
pub use readers::{EpwLocation, EpwReader, Wea2Reader, WeaReader};
pub use series::{DailyStatistics, Quantity, Unit, VariableSeries};
pub use source::{SourceFormat, WeatherDataSource};
