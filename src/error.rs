use std::path::PathBuf;

use crate::series::Quantity;
use crate::source::SourceFormat;

/// 気象データ読み込みエラー型
#[derive(Debug, thiserror::Error)]
pub enum WeatherDataError {
    /// ファイル・オープン・エラー
    #[error("ファイルを開くときにエラーが発生しました。`{file}`", file = .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 読み込みエラー
    ///
    /// ファイルが途中で終わっている場合も、このエラーとなる。
    #[error(
        "ファイルの読み込みに失敗しました。`{file}` 地点番号: {station}, 位置: {offset}",
        file = .path.display()
    )]
    Io {
        path: PathBuf,
        station: u32,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// 範囲外の地点番号
    #[error(
        "地点番号は1から{max}の範囲で指定してください。`{file}` 地点番号: {station}",
        file = .path.display()
    )]
    InvalidStation {
        path: PathBuf,
        station: i64,
        max: u32,
    },

    /// 気象データ形式が提供しない物理量
    #[error("{format}形式は{quantity}を提供していません。")]
    UnsupportedQuantity {
        quantity: Quantity,
        format: SourceFormat,
    },

    /// 不正なレコード
    #[error(
        "不正なレコードです。`{file}` ({location}) {reason}",
        file = .path.display()
    )]
    MalformedRecord {
        path: PathBuf,
        location: String,
        reason: String,
    },

    /// CSVの字句解析エラー
    #[error("CSVの読み込みに失敗しました。`{file}`", file = .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 気象データ読み込み結果型
pub type WeatherDataResult<T> = Result<T, WeatherDataError>;
