/// Fraction digits pt-BR `toLocaleString` shows by default
const MAX_FRACTION_DIGITS: i32 = 3;

/// Format a number the way pt-BR `toLocaleString` does: `.` groups thousands,
/// `,` separates decimals, at most three fraction digits, no trailing zeros.
pub fn format_br_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scale = 10f64.powi(MAX_FRACTION_DIGITS);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let formatted = format!("{:.*}", MAX_FRACTION_DIGITS as usize, rounded.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((&formatted, ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::new();
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{fraction}")
    }
}
