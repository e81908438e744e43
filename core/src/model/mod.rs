pub mod allocation;
pub mod category;
pub mod error;
pub mod forecast;
pub mod inputs;
pub mod issue;
pub mod options;
pub mod process;
pub mod state;

/// Maps NaN and infinities to 0 so they never reach a displayed total.
pub fn to_finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

pub fn non_negative(x: f64) -> f64 {
    to_finite_or_zero(x).max(0.0)
}

pub fn clamp_unit(x: f64) -> f64 {
    to_finite_or_zero(x).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert_eq!(to_finite_or_zero(f64::NAN), 0.0);
        assert_eq!(to_finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(to_finite_or_zero(-2.5), -2.5);
        assert_eq!(non_negative(-2.5), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(f64::INFINITY), 0.0);
    }
}
