//! 風向の変換
//!
//! 風向は16方位で扱い、北北東を22.5度、北を360度とする。
//! 静穏（無風）の時間は風向を`CALM`とする。

use tracing::warn;

/// 静穏を示す風向
pub const CALM: f64 = -9999.0;

/// 16方位の1方位あたりの角度
pub const SECTOR_WIDTH: f64 = 360.0 / 16.0;

const HALF_SECTOR: f64 = SECTOR_WIDTH / 2.0;

/// 16方位の方位番号（1: 北北東 ～ 16: 北）を角度に変換する。
///
/// 方位番号0（静穏）と範囲外の値は`None`を返す。
pub fn bucket_to_degrees(code: f64) -> Option<f64> {
    if code.fract() != 0.0 || !(1.0..=16.0).contains(&code) {
        return None;
    }

    Some(code * SECTOR_WIDTH)
}

/// 角度を最も近い16方位の方位番号（1: 北北東 ～ 16: 北）に変換する。
///
/// 各方位は`(角度 - 11.25, 角度 + 11.25]`の範囲を受け持ち、北は0度と360度をまたぐ。
/// 0度から360度の範囲外の値は`None`を返す。
pub fn degrees_to_bucket(degrees: f64) -> Option<u8> {
    if !(0.0..=360.0).contains(&degrees) {
        return None;
    }
    let bucket = ((degrees - HALF_SECTOR) / SECTOR_WIDTH).ceil();
    if bucket <= 0.0 {
        return Some(16);
    }

    Some(bucket as u8)
}

/// 方位番号の時系列を角度の時系列に変換する。
///
/// 風速が0の時間と、方位番号が静穏または範囲外の時間は`CALM`とする。
///
/// # 引数
///
/// * `codes` - 方位番号
/// * `speeds` - 風速（m/s）
pub fn resolve_bucket_directions(codes: &[f64], speeds: &[f64]) -> Vec<f64> {
    let mut unknown = 0usize;
    let directions = codes
        .iter()
        .zip(speeds)
        .map(|(&code, &speed)| {
            if speed == 0.0 {
                return CALM;
            }
            bucket_to_degrees(code).unwrap_or_else(|| {
                if code != 0.0 {
                    unknown += 1;
                }
                CALM
            })
        })
        .collect();
    if 0 < unknown {
        warn!("範囲外の風向の方位番号が{unknown}件ありました。静穏として扱います。");
    }

    directions
}

/// 角度で記録された風向の時系列を、16方位に集約した角度の時系列に変換する。
///
/// 風速が0の時間と、角度が範囲外の時間は`CALM`とする。
///
/// # 引数
///
/// * `degrees` - 風向（度）
/// * `speeds` - 風速（m/s）
pub fn bucket_continuous_directions(degrees: &[f64], speeds: &[f64]) -> Vec<f64> {
    degrees
        .iter()
        .zip(speeds)
        .map(|(&d, &speed)| {
            if speed == 0.0 {
                return CALM;
            }
            degrees_to_bucket(d)
                .map(|bucket| bucket as f64 * SECTOR_WIDTH)
                .unwrap_or(CALM)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_to_degrees() {
        assert_eq!(bucket_to_degrees(1.0), Some(22.5));
        assert_eq!(bucket_to_degrees(4.0), Some(90.0));
        assert_eq!(bucket_to_degrees(16.0), Some(360.0));
        assert_eq!(bucket_to_degrees(0.0), None);
        assert_eq!(bucket_to_degrees(17.0), None);
        assert_eq!(bucket_to_degrees(-1.0), None);
        assert_eq!(bucket_to_degrees(2.5), None);
    }

    #[test]
    fn zero_speed_overrides_any_code() {
        let codes: Vec<f64> = (0..=16).map(f64::from).collect();
        let speeds = vec![0.0; codes.len()];
        assert!(resolve_bucket_directions(&codes, &speeds)
            .iter()
            .all(|&d| d == CALM));
    }

    #[test]
    fn calm_code_and_unknown_codes_are_calm() {
        let directions = resolve_bucket_directions(&[0.0, 8.0, 99.0], &[1.0, 1.0, 1.0]);
        assert_eq!(directions, vec![CALM, 180.0, CALM]);
    }

    #[test]
    fn degree_windows() {
        assert_eq!(degrees_to_bucket(0.0), Some(16));
        assert_eq!(degrees_to_bucket(11.25), Some(16));
        assert_eq!(degrees_to_bucket(11.26), Some(1));
        assert_eq!(degrees_to_bucket(33.75), Some(1));
        assert_eq!(degrees_to_bucket(33.76), Some(2));
        assert_eq!(degrees_to_bucket(348.75), Some(15));
        assert_eq!(degrees_to_bucket(348.76), Some(16));
        assert_eq!(degrees_to_bucket(360.0), Some(16));
        assert_eq!(degrees_to_bucket(999.0), None);
        assert_eq!(degrees_to_bucket(-1.0), None);
        assert_eq!(degrees_to_bucket(f64::NAN), None);
    }

    #[test]
    fn every_sector_centre_maps_to_itself() {
        for k in 1..=16u8 {
            let centre = k as f64 * SECTOR_WIDTH;
            assert_eq!(degrees_to_bucket(centre), Some(k));
        }
    }

    #[test]
    fn continuous_directions_share_the_bucket_convention() {
        let directions =
            bucket_continuous_directions(&[0.0, 95.0, 200.0, 350.0, 999.0, 90.0], &[
                2.0, 2.0, 2.0, 2.0, 2.0, 0.0,
            ]);
        assert_eq!(directions, vec![360.0, 90.0, 202.5, 360.0, CALM, CALM]);
    }
}
