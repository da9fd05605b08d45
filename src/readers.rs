use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::decoder::{StationArchiveDecoder, StationRecord};
use crate::error::{WeatherDataError, WeatherDataResult};

pub mod epw;
pub mod wea;

pub use epw::{EpwLocation, EpwReader};
pub use wea::{Wea2Reader, WeaReader};

/// 拡張アメダス標準年気象データファイルを開いて、指定された地点を復号する。
///
/// 地点番号はファイルを開く前に検証する。
/// ファイルは復号が終わった時点で閉じる。
fn decode_station_file(
    path: &Path,
    station: i64,
    decoder: &StationArchiveDecoder,
) -> WeatherDataResult<StationRecord> {
    decoder.validate_station(station)?;
    debug!("ファイルを開きます。`{}`", path.display());
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| WeatherDataError::Open {
            path: path.to_owned(),
            source: e,
        })?;

    decoder.decode(BufReader::new(file), station)
}
