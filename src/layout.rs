/// 拡張アメダス標準年気象データのレコード長（バイト）
pub const RECORD_LENGTH: u64 = 18306;

/// レコードヘッダーのバイト数
///
/// 地点番号、種別、年の3つの符号付き16ビット整数で構成される。
pub const RECORD_HEADER_LENGTH: u64 = 6;

/// 拡張アメダスの地点数
pub const MAX_STATION: u32 = 842;

/// 拡張アメダス気象データファイルの構成
///
/// ファイルは地点ごとのブロックが地点番号順に連続して記録されており、
/// 各ブロックは固定長のレコードで構成される。
/// この型はファイル上の位置を計算するだけで、ファイルの読み込みは行わない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// レコード長（バイト）
    pub record_length: u64,

    /// 1地点あたりのレコード数
    pub records_per_block: u64,

    /// ブロックの先頭にある地点情報レコードの数
    ///
    /// 気象要素のレコードは、地点情報レコードの後に続く。
    pub metadata_records: u64,

    /// 地点番号の最大値
    pub max_station: u32,

    /// 1年の日数
    pub days_per_year: usize,

    /// 1日の時間数
    pub hours_per_day: usize,
}

impl ArchiveLayout {
    /// 気象要素8レコードで構成される標準年データ
    pub const STANDARD: Self = Self {
        record_length: RECORD_LENGTH,
        records_per_block: 8,
        metadata_records: 0,
        max_station: MAX_STATION,
        days_per_year: 365,
        hours_per_day: 24,
    };

    /// 地点情報レコードと気象要素10レコードで構成される標準年データ（2020年版以降）
    pub const EXTENDED: Self = Self {
        record_length: RECORD_LENGTH,
        records_per_block: 11,
        metadata_records: 1,
        max_station: MAX_STATION,
        days_per_year: 365,
        hours_per_day: 24,
    };

    /// 1レコードに記録されている観測値の数を返す。
    pub fn samples_per_record(&self) -> usize {
        self.days_per_year * self.hours_per_day
    }

    /// 1地点のブロック長（バイト）を返す。
    pub fn block_length(&self) -> u64 {
        self.records_per_block * self.record_length
    }

    /// 1地点あたりの気象要素のレコード数を返す。
    pub fn variable_records(&self) -> u64 {
        self.records_per_block - self.metadata_records
    }

    /// 地点番号が範囲内にあるか確認する。
    ///
    /// # 戻り値
    ///
    /// 範囲内の場合は地点番号、範囲外の場合は`None`
    pub fn checked_station(&self, station: i64) -> Option<u32> {
        if station < 1 || station > self.max_station as i64 {
            return None;
        }

        u32::try_from(station).ok()
    }

    /// 地点のブロックの先頭位置を返す。
    ///
    /// 地点番号は`checked_station`で確認済みである必要がある。
    pub fn block_offset(&self, station: u32) -> u64 {
        (station as u64).saturating_sub(1) * self.block_length()
    }

    /// 地点のブロック内の`index`番目のレコードの先頭位置を返す。
    ///
    /// `index`はブロック内の0始まりの位置で、地点情報レコードを含む。
    pub fn record_offset(&self, station: u32, index: u64) -> u64 {
        self.block_offset(station) + index * self.record_length
    }

    /// 地点のブロック内の`index`番目の観測値が記録されている位置を返す。
    pub fn sample_offset(&self, station: u32, record: u64, index: usize) -> u64 {
        self.record_offset(station, record) + RECORD_HEADER_LENGTH + index as u64 * 2
    }
}
