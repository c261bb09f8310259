//! Number formatting and easing for the stats ticker

use serde::{Deserialize, Serialize};

/// How trading volume is labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    /// `1.50K BNB`
    #[default]
    Bnb,
    /// `$1.50K`
    Usd,
}

/// Group an integer with thousands separators: `1234567 -> "1,234,567"`
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Abbreviate a volume with K/M suffixes and two decimals. The suffix is
/// picked on the rounded magnitude, so `999.999` reads `1.00K`.
pub fn format_volume(volume: f64, unit: VolumeUnit) -> String {
    let volume = if volume.is_finite() { volume } else { 0.0 };
    let magnitude = volume.abs();

    let amount = if rounds_to_at_least(magnitude / 1_000.0, 1_000.0) {
        format!("{:.2}M", magnitude / 1_000_000.0)
    } else if rounds_to_at_least(magnitude, 1_000.0) {
        format!("{:.2}K", magnitude / 1_000.0)
    } else {
        format!("{:.2}", magnitude)
    };
    let sign = if volume < 0.0 && rounds_to_at_least(magnitude, 0.01) {
        "-"
    } else {
        ""
    };

    match unit {
        VolumeUnit::Bnb => format!("{}{} BNB", sign, amount),
        VolumeUnit::Usd => format!("{}${}", sign, amount),
    }
}

/// Compare at two-decimal precision, the precision shown on screen
fn rounds_to_at_least(value: f64, threshold: f64) -> bool {
    (value * 100.0).round() >= (threshold * 100.0).round()
}

/// Cubic ease-out, `t` clamped to [0, 1]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(12345), "12,345");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_volume_below_thousand() {
        assert_eq!(format_volume(999.0, VolumeUnit::Bnb), "999.00 BNB");
        assert_eq!(format_volume(999.0, VolumeUnit::Usd), "$999.00");
    }

    #[test]
    fn test_format_volume_thousands() {
        assert_eq!(format_volume(1500.0, VolumeUnit::Bnb), "1.50K BNB");
        assert_eq!(format_volume(1500.0, VolumeUnit::Usd), "$1.50K");
    }

    #[test]
    fn test_format_volume_millions() {
        assert_eq!(format_volume(2_500_000.0, VolumeUnit::Bnb), "2.50M BNB");
        assert_eq!(format_volume(2_500_000.0, VolumeUnit::Usd), "$2.50M");
    }

    #[test]
    fn test_format_volume_rounding_bumps_suffix() {
        assert_eq!(format_volume(999.994, VolumeUnit::Bnb), "999.99 BNB");
        assert_eq!(format_volume(999.999, VolumeUnit::Bnb), "1.00K BNB");
        assert_eq!(format_volume(999_994.0, VolumeUnit::Usd), "$999.99K");
        assert_eq!(format_volume(999_999.999, VolumeUnit::Usd), "$1.00M");
    }

    #[test]
    fn test_format_volume_negative_is_abbreviated() {
        assert_eq!(format_volume(-1500.0, VolumeUnit::Bnb), "-1.50K BNB");
        assert_eq!(format_volume(-2_500_000.0, VolumeUnit::Usd), "-$2.50M");
        assert_eq!(format_volume(-0.001, VolumeUnit::Bnb), "0.00 BNB");
    }

    #[test]
    fn test_format_volume_non_finite_is_zero() {
        assert_eq!(format_volume(f64::NAN, VolumeUnit::Usd), "$0.00");
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        // Ease-out front-loads progress
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_volume_unit_reads_lowercase() {
        let unit: VolumeUnit = serde_json::from_str("\"usd\"").unwrap();
        assert_eq!(unit, VolumeUnit::Usd);
    }
}
