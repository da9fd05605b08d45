//! 湿り空気の状態量の計算
//!
//! 飽和水蒸気圧はHyland-Wexlerの式で計算する。

/// 0℃の絶対温度（K）
pub const KELVIN: f64 = 273.15;

/// 標準大気圧（kPa）
pub const STANDARD_PRESSURE: f64 = 101.325;

/// 水蒸気と乾き空気の分子量の比
const MOLECULAR_WEIGHT_RATIO: f64 = 0.62198;

/// 摂氏（℃）を絶対温度（K）に換算する。
pub fn celsius_to_kelvin(t: f64) -> f64 {
    t + KELVIN
}

/// 飽和水蒸気圧（kPa）を計算する。
///
/// 0℃以上は水に対する式、0℃未満は氷に対する式を使用する。
///
/// # 引数
///
/// * `t` - 乾球温度（K）
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    let ln_p = if t >= KELVIN {
        1.3914993 - 5800.2206 / t - 0.048640239 * t + 0.4176768e-4 * t.powi(2)
            - 0.14452093e-7 * t.powi(3)
            + 6.5459673 * t.ln()
    } else {
        -5674.5359 / t + 6.3925247 - 0.9677843e-2 * t + 0.62215701e-6 * t.powi(2)
            + 0.20747825e-8 * t.powi(3)
            - 0.9484024e-12 * t.powi(4)
            + 4.1635019 * t.ln()
    };

    ln_p.exp() / 1000.0
}

/// 水蒸気分圧（kPa）を計算する。
///
/// # 引数
///
/// * `w` - 絶対湿度（kg/kg(DA)）
/// * `p` - 大気圧（kPa）
pub fn partial_vapor_pressure(w: f64, p: f64) -> f64 {
    w * p / (w + MOLECULAR_WEIGHT_RATIO)
}

/// 相対湿度（%）を計算する。
///
/// 標高による大気圧の変化は考慮せず、標準大気圧で計算する。
/// 計算結果は0%から100%の範囲に収める。
///
/// # 引数
///
/// * `w` - 絶対湿度（kg/kg(DA)）
/// * `t` - 気温（℃）
pub fn relative_humidity(w: f64, t: f64) -> f64 {
    let pw = partial_vapor_pressure(w, STANDARD_PRESSURE);
    let pws = saturation_vapor_pressure(celsius_to_kelvin(t));

    clamp_relative_humidity(100.0 * pw / pws)
}

/// 相対湿度を0%から100%の範囲に収める。
///
/// 計算できなかった値（NaN）は0%とする。
pub fn clamp_relative_humidity(rh: f64) -> f64 {
    if rh.is_nan() {
        return 0.0;
    }

    rh.clamp(0.0, 100.0)
}

/// 絶対湿度（g/kg(DA)）と気温（℃）の時系列から相対湿度（%）の時系列を計算する。
pub fn relative_humidities(absolute_humidities: &[f64], temperatures: &[f64]) -> Vec<f64> {
    absolute_humidities
        .iter()
        .zip(temperatures)
        .map(|(&x, &t)| relative_humidity(x / 1000.0, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn saturation_pressure_over_water() {
        // 20℃で約2.339kPa、100℃で約101.5kPa
        assert!(approx(saturation_vapor_pressure(293.15), 2.339, 0.002));
        assert!(approx(saturation_vapor_pressure(373.15), 101.46, 0.05));
    }

    #[test]
    fn saturation_pressure_over_ice() {
        // -10℃で約0.2600kPa、-40℃で約0.0129kPa
        assert!(approx(saturation_vapor_pressure(263.15), 0.2600, 0.001));
        assert!(approx(saturation_vapor_pressure(233.15), 0.01285, 0.0002));
    }

    #[test]
    fn branches_meet_near_freezing_point() {
        let water = saturation_vapor_pressure(KELVIN);
        let ice = saturation_vapor_pressure(KELVIN - 1e-9);
        assert!(approx(water, 0.6112, 0.001));
        assert!(approx(ice, 0.6112, 0.001));
    }

    #[test]
    fn partial_pressure() {
        assert_eq!(partial_vapor_pressure(0.0, STANDARD_PRESSURE), 0.0);
        let pw = partial_vapor_pressure(0.010, STANDARD_PRESSURE);
        assert!(approx(pw, 0.010 * 101.325 / 0.63198, 1e-12));
    }

    #[test]
    fn relative_humidity_is_always_within_range() {
        for t in [-40.0, -20.0, -0.1, 0.0, 10.0, 25.0, 40.0] {
            for w in [0.0, 0.0001, 0.001, 0.01, 0.03, 0.1, 1.0] {
                let rh = relative_humidity(w, t);
                assert!((0.0..=100.0).contains(&rh), "rh={rh} at w={w}, t={t}");
            }
        }
    }

    #[test]
    fn relative_humidity_at_saturation_is_capped() {
        // -40℃で飽和に相当する絶対湿度の2倍
        let t = -40.0;
        let pws = saturation_vapor_pressure(celsius_to_kelvin(t));
        let ws = MOLECULAR_WEIGHT_RATIO * pws / (STANDARD_PRESSURE - pws);
        assert!(approx(relative_humidity(ws, t), 100.0, 1e-6));
        assert_eq!(relative_humidity(2.0 * ws, t), 100.0);
    }

    #[test]
    fn negative_humidity_floors_at_zero() {
        assert_eq!(relative_humidity(-0.001, 20.0), 0.0);
        assert_eq!(clamp_relative_humidity(f64::NAN), 0.0);
    }

    #[test]
    fn series_uses_gram_per_kilogram() {
        let rh = relative_humidities(&[7.3, 0.0], &[20.0, 20.0]);
        // 20℃、7.3g/kgでおよそ50%
        assert!(approx(rh[0], 50.0, 1.0));
        assert_eq!(rh[1], 0.0);
    }
}
