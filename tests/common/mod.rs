//! 結合テストで使用する合成アーカイブの構築

#![allow(dead_code)]

use std::io::{Seek, SeekFrom, Write};

use encoding_rs::SHIFT_JIS;
use tempfile::NamedTempFile;

use jma_ea::layout::{ArchiveLayout, RECORD_LENGTH};

pub const HOURS: usize = 8760;

/// 合成データの年
pub const YEAR: i16 = 1995;

/// 東京の地点情報（1月1日）
pub const TOKYO_LOCATION: [i16; 11] = [44, 132, 47, 662, 35, 692, 139, 750, 252, 350, 100];

/// 1月1日と12月31日の観測所名と都道府県名
pub const TOKYO_NAMES: [&str; 8] = [
    "東京", "TOKYO", "東京都", "TOKYO", "東京", "TOKYO", "東京都", "TOKYO",
];

pub fn constant(raw: i16) -> Vec<i16> {
    vec![raw; HOURS]
}

/// 1レコード分のバイト列を構築する。
pub fn record(header: [i16; 3], samples: &[i16]) -> Vec<u8> {
    let mut bytes: Vec<u8> = header
        .iter()
        .chain(samples.iter())
        .flat_map(|v| v.to_le_bytes())
        .collect();
    bytes.resize(RECORD_LENGTH as usize, 0);
    bytes
}

/// 気象要素のレコードだけで構成された地点ブロックを構築する。
pub fn variable_records(station_number: i16, samples: &[Vec<i16>]) -> Vec<u8> {
    samples
        .iter()
        .enumerate()
        .flat_map(|(i, s)| record([station_number, i as i16 + 1, YEAR], s))
        .collect()
}

/// 地点情報レコードを構築する。
pub fn metadata_record(station_number: i16, location: [i16; 11], names: [&str; 8]) -> Vec<u8> {
    let mut bytes: Vec<u8> = [station_number, 0, YEAR]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    for day in 0..366 {
        let mut row = [0i16; 24];
        row[..11].copy_from_slice(&location);
        if 0 < day {
            row[0] = -1;
        }
        bytes.extend(row.iter().flat_map(|v| v.to_le_bytes()));
    }
    for name in names {
        let (encoded, _, had_errors) = SHIFT_JIS.encode(name);
        assert!(!had_errors);
        let mut field = encoded.into_owned();
        assert!(field.len() <= 30);
        field.resize(30, b' ');
        bytes.extend(field);
    }
    assert!(bytes.len() <= RECORD_LENGTH as usize);
    bytes.resize(RECORD_LENGTH as usize, 0);
    bytes
}

/// 気温が15.0℃と-5.0℃を交互に繰り返す、気象要素8レコードの地点ブロック
pub fn alternating_standard_block(station_number: i16) -> Vec<u8> {
    variable_records(
        station_number,
        &[
            (0..HOURS)
                .map(|h| if h % 2 == 0 { 1500 } else { -500 })
                .collect(),
            constant(73),
            constant(3600),
            constant(1200),
            constant(40),
            constant(25),
            constant(15),
            constant(5),
        ],
    )
}

/// 地点情報レコード付きの地点ブロック
pub fn extended_block(station_number: i16) -> Vec<u8> {
    let mut bytes = metadata_record(station_number, TOKYO_LOCATION, TOKYO_NAMES);
    bytes.extend(variable_records(
        station_number,
        &[
            constant(1500),
            constant(73),
            constant(3600),
            constant(1200),
            constant(160),
            constant(25),
            constant(125),
            constant(55),
            constant(10130),
            // 相対湿度は100%を超える値を含む
            (0..HOURS)
                .map(|h| if h % 2 == 0 { 6500 } else { 10200 })
                .collect(),
        ],
    ));
    bytes
}

/// 地点ブロックを地点番号に対応する位置に書き込んだ一時ファイルを作成する。
///
/// 書き込まなかった地点ブロックは0で埋まる。
pub fn write_archive(layout: ArchiveLayout, blocks: &[(u32, Vec<u8>)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for (station, block) in blocks {
        let offset = layout.block_offset(*station);
        file.seek(SeekFrom::Start(offset)).unwrap();
        file.write_all(block).unwrap();
    }
    file.flush().unwrap();
    file
}
