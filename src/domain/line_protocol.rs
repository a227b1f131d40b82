//! InfluxDB line protocol encoding.
//!
//! `measurement[,tag=value...] field=value[,field=value...] [timestamp]`

use crate::domain::errors::EncodeError;
use crate::domain::point::{FieldValue, Point};
use std::fmt::Write;

/// Encode a single point as one line (no trailing newline).
pub fn encode_point(point: &Point) -> Result<String, EncodeError> {
    if point.measurement().is_empty() {
        return Err(EncodeError::EmptyMeasurement);
    }
    if point.fields().is_empty() {
        return Err(EncodeError::NoFields {
            measurement: point.measurement().to_string(),
        });
    }

    let mut line = String::with_capacity(128);
    escape_into(&mut line, point.measurement(), &[',', ' ']);

    for (key, value) in point.tags() {
        // Influx rejects empty tag values; drop them rather than fail the batch.
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    line.push(' ');
    for (i, (key, value)) in point.fields().iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        encode_field_value(&mut line, point.measurement(), key, value)?;
    }

    if let Some(ts) = point.timestamp_ns() {
        let _ = write!(line, " {}", ts);
    }

    Ok(line)
}

/// Encode a batch, one line per point, joined by `\n`.
pub fn encode_batch(points: &[Point]) -> Result<String, EncodeError> {
    let lines = points
        .iter()
        .map(encode_point)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn encode_field_value(
    out: &mut String,
    measurement: &str,
    key: &str,
    value: &FieldValue,
) -> Result<(), EncodeError> {
    match value {
        FieldValue::Float(v) => {
            if !v.is_finite() {
                return Err(EncodeError::NonFiniteFloat {
                    measurement: measurement.to_string(),
                    field: key.to_string(),
                });
            }
            let _ = write!(out, "{}", v);
        }
        FieldValue::Integer(v) => {
            let _ = write!(out, "{}i", v);
        }
        FieldValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        FieldValue::String(v) => {
            out.push('"');
            for c in v.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
    Ok(())
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
