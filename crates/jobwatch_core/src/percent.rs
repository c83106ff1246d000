use std::sync::LazyLock;

use regex::Regex;

/// CSI/escape sequences emitted by terminal progress hooks.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B[@-_][0-?]*[ -/]*[@-~]").expect("static ANSI pattern compiles")
});

/// Clamp into the displayable range. Also folds `-0.0` into `0.0`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0) + 0.0
}

/// Parse a human-formatted percentage such as `"42.5%"` or `" 50 % "`.
///
/// Escape sequences are removed first, then everything but digits and decimal
/// points. The longest leading number is used, so `"1.2.3"` reads as `1.2`.
/// A minus sign directly in front of the number is honoured so that negative
/// reports clamp to zero. Anything that does not leave a finite number yields
/// `0.0`. The result is always within `[0, 100]`.
pub fn parse_percent(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let visible = ANSI_ESCAPE.replace_all(raw, "");

    let mut number = String::with_capacity(visible.len());
    let mut negative = false;
    let mut prev = None;
    for ch in visible.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            if number.is_empty() && prev == Some('-') {
                negative = true;
            }
            number.push(ch);
        }
        prev = Some(ch);
    }

    let magnitude = leading_number(&number)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0);
    clamp_percent(if negative { -magnitude } else { magnitude })
}

/// Prefix of `digits` up to, not including, its second decimal point.
fn leading_number(digits: &str) -> &str {
    let end = digits
        .match_indices('.')
        .nth(1)
        .map_or(digits.len(), |(index, _)| index);
    &digits[..end]
}

/// Display text for a percentage: one decimal at most, `.0` dropped.
pub fn format_percent(value: f64) -> String {
    let rounded = (clamp_percent(value) * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}
