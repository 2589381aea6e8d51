/// Count normalization for search result fields
///
/// The search API reports play, review and favorite counts inconsistently:
/// sometimes as JSON numbers, sometimes as text such as `"1,234"`, `"1.2万"`
/// or `"3.4亿"`. Everything here degrades to `0` instead of failing.
use serde_json::Value;

/// Chinese unit marker for 100,000,000
const YI: char = '亿';
/// Chinese unit marker for 10,000
const WAN: char = '万';

const YI_MULTIPLIER: f64 = 100_000_000.0;
const WAN_MULTIPLIER: f64 = 10_000.0;

/// Normalize a loosely typed count value into a non-negative integer
pub fn normalize_count(value: Option<&Value>) -> u64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                v
            } else if let Some(v) = n.as_f64() {
                truncate(v)
            } else {
                0
            }
        }
        Some(Value::Bool(b)) => u64::from(*b),
        Some(Value::String(s)) => normalize_text(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => 0,
    }
}

/// Normalize a textual count, honoring `亿` / `万` unit suffixes and
/// thousands separators
pub fn normalize_text(text: &str) -> u64 {
    let text = text.trim();

    if text.contains(YI) {
        return scaled(&text.replace(YI, ""), YI_MULTIPLIER);
    }
    if text.contains(WAN) {
        return scaled(&text.replace(WAN, ""), WAN_MULTIPLIER);
    }

    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return 0;
    }

    digits.parse::<f64>().map(truncate).unwrap_or(0)
}

/// Pick the first value that carries information, mirroring a loose
/// "this field or else that field" lookup. Null, `0`, `""`, `false` and
/// empty containers are skipped.
pub fn first_truthy<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates.iter().flatten().copied().find(|v| is_truthy(v))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn scaled(number: &str, multiplier: f64) -> u64 {
    number
        .trim()
        .parse::<f64>()
        .map(|v| truncate(v * multiplier))
        .unwrap_or(0)
}

fn truncate(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}
