use crate::model::to_finite_or_zero;

/// Formats `n` with thousands separators and at most `decimals` fraction
/// digits (trailing zeros dropped). Non-finite values render as "0".
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

pub fn format_hours(n: f64) -> String {
    format!("{} h", format_number(n.round(), 0))
}

pub fn format_dollars(n: f64) -> String {
    let rounded = to_finite_or_zero(n).round();
    if rounded < 0.0 {
        format!("-A${}", format_number(-rounded, 0))
    } else {
        format!("A${}", format_number(rounded, 0))
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{}%", format_number(fraction * 100.0, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(42_038_231.04, 2), "42,038,231.04");
        assert_eq!(format_number(819.92, 1), "819.9");
        assert_eq!(format_number(726.352, 0), "726");
        assert_eq!(format_number(-25263.36, 0), "-25,263");
        assert_eq!(format_number(12.50, 2), "12.5");
        assert_eq!(format_number(-0.0001, 2), "0");
    }

    #[test]
    fn test_non_finite_renders_zero() {
        assert_eq!(format_number(f64::NAN, 2), "0");
        assert_eq!(format_number(f64::INFINITY, 0), "0");
        assert_eq!(format_dollars(f64::NEG_INFINITY), "A$0");
    }

    #[test]
    fn test_units() {
        assert_eq!(format_hours(93.568), "94 h");
        assert_eq!(format_dollars(2994.176), "A$2,994");
        assert_eq!(format_dollars(-1500.4), "-A$1,500");
        assert_eq!(format_percent(0.68), "68%");
        assert_eq!(format_percent(0.125), "12.5%");
    }
}
