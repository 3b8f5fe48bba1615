//! `Date` statics and instance methods over UTC millisecond timestamps.

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc,
};

use crate::methods::arg;
use crate::value::Value;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
/// Largest representable distance from the epoch.
const MAX_TIME: f64 = 8.64e15;

/// Call a method on the `Date` constructor.
pub fn call_static(method: &str, args: &[Value]) -> Value {
    match method {
        "now" => Value::Number(Utc::now().timestamp_millis() as f64),
        "parse" => Value::Number(parse(&arg(args, 0).to_string()).unwrap_or(f64::NAN)),
        "UTC" => Value::Number(utc(args)),
        _ => Value::Undefined,
    }
}

/// Call a method on a `Date` instance.
pub fn call_instance(ms: f64, method: &str) -> Value {
    match method {
        "toISOString" => return to_iso_string(ms).map_or(Value::Undefined, Value::String),
        "getTime" | "valueOf" => return Value::Number(ms),
        _ => {}
    }

    let Some(dt) = to_datetime(ms) else {
        return match method {
            "getFullYear" | "getMonth" | "getDate" | "getDay" | "getHours" | "getMinutes"
            | "getSeconds" | "getMilliseconds" => Value::Number(f64::NAN),
            _ => Value::Undefined,
        };
    };
    let n = match method {
        "getFullYear" => dt.year(),
        "getMonth" => dt.month0() as i32,
        "getDate" => dt.day() as i32,
        "getDay" => dt.weekday().num_days_from_sunday() as i32,
        "getHours" => dt.hour() as i32,
        "getMinutes" => dt.minute() as i32,
        "getSeconds" => dt.second() as i32,
        "getMilliseconds" => dt.timestamp_subsec_millis() as i32,
        _ => return Value::Undefined,
    };
    Value::from(n)
}

/// `YYYY-MM-DDTHH:mm:ss.sssZ`, or `None` for an invalid time. Years outside
/// `0..=9999` use the six-digit signed form.
pub fn to_iso_string(ms: f64) -> Option<String> {
    let dt = to_datetime(ms)?;
    if (0..=9999).contains(&dt.year()) {
        Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    } else {
        Some(format!(
            "{:+07}-{}",
            dt.year(),
            dt.format("%m-%dT%H:%M:%S%.3fZ")
        ))
    }
}

/// Parse the ISO date-time format `Date.parse` accepts. Times without an
/// offset are read as UTC.
pub fn parse(input: &str) -> Option<f64> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return time_clip(dt.timestamp_millis() as f64);
    }

    let (date, time) = match input.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (input, None),
    };
    let date = parse_date(date)?;
    let Some(time) = time else {
        return time_clip(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64);
    };

    let (clock, offset_ms) = split_offset(time)?;
    let clock = ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())?;
    let local = NaiveDateTime::new(date, clock).and_utc().timestamp_millis();
    time_clip((local - offset_ms) as f64)
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, with the missing parts defaulting to 1.
fn parse_date(date: &str) -> Option<NaiveDate> {
    let digits = date.trim_start_matches(['+', '-']);
    let full = match digits.matches('-').count() {
        0 => format!("{date}-01-01"),
        1 => format!("{date}-01"),
        _ => date.to_string(),
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()
}

/// Strip a trailing `Z` or `+HH:MM`/`-HH:MM` offset, returning it in
/// milliseconds east of UTC.
fn split_offset(time: &str) -> Option<(&str, i64)> {
    if let Some(clock) = time.strip_suffix('Z') {
        return Some((clock, 0));
    }
    let Some(at) = time.rfind(['+', '-']) else {
        return Some((time, 0));
    };
    let (clock, offset) = time.split_at(at);
    let hm = NaiveTime::parse_from_str(&offset[1..], "%H:%M").ok()?;
    let ms = i64::from(hm.num_seconds_from_midnight()) * 1_000;
    Some((clock, if offset.starts_with('-') { -ms } else { ms }))
}

/// `Date.UTC(year, monthIndex, day?, hours?, minutes?, seconds?, ms?)`.
fn utc(args: &[Value]) -> f64 {
    let field = |i: usize, default: f64| match args.get(i) {
        None => default,
        Some(v) => v.to_number(),
    };
    let values = [
        field(0, f64::NAN),
        field(1, 0.0),
        field(2, 1.0),
        field(3, 0.0),
        field(4, 0.0),
        field(5, 0.0),
        field(6, 0.0),
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }
    let [year, month, day, hour, minute, second, millis] = values.map(f64::trunc);

    let year = if (0.0..=99.0).contains(&year) {
        1900.0 + year
    } else {
        year
    };
    let year = year + (month / 12.0).floor();
    // Anything past this cannot land inside the valid time range.
    if year.abs() > 400_000.0 {
        return f64::NAN;
    }
    let month = month.rem_euclid(12.0) as u32 + 1;
    let Some(first) = NaiveDate::from_ymd_opt(year as i32, month, 1) else {
        return f64::NAN;
    };

    let ms = first.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
        + (day - 1.0) * MS_PER_DAY
        + hour * MS_PER_HOUR
        + minute * MS_PER_MINUTE
        + second * MS_PER_SECOND
        + millis;
    time_clip(ms).unwrap_or(f64::NAN)
}

fn time_clip(ms: f64) -> Option<f64> {
    (ms.is_finite() && ms.abs() <= MAX_TIME).then_some(ms.trunc())
}

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(time_clip(ms)? as i64)
}
