//! Channel-major spectra stored as nested JSON arrays.
//!
//! A matrix file holds either a bare `[C][F][T]` array or an object mapping
//! variable names to such arrays, e.g. `{"mag": [...], "phs": [...]}`. Numbers
//! are read as `f32`; `null` entries load as NaN.

use ndarray::{Array3, ArrayBase, Axis, Data, Ix3};
use serde_json::{Map, Value};
use std::path::Path;

use crate::{Error, Result};

/// Load a (C, F, T) array from a JSON matrix file.
///
/// A bare array is used directly whatever `var` says. For an object, `var`
/// names the key to load; with `var` unset an object holding exactly one
/// array is unpacked.
///
/// # Example
/// ```ignore
/// let phase = read_matrix_json("spectra.json", Some("phs"))?;
/// let (channels, bins, frames) = phase.dim();
/// ```
pub fn read_matrix_json<P: AsRef<Path>>(path: P, var: Option<&str>) -> Result<Array3<f32>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&text)?;
    let array = select_variable(document, var)?;
    let matrix = parse_cube(&array)?;
    tracing::debug!(
        path = %path.display(),
        var = var.unwrap_or("<root>"),
        shape = ?matrix.dim(),
        "loaded matrix"
    );
    Ok(matrix)
}

/// Save a (C, F, T) array as nested JSON, optionally under a variable name.
///
/// Non-finite values are written as `null`.
pub fn write_matrix_json<P, S>(path: P, var: Option<&str>, matrix: &ArrayBase<S, Ix3>) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = f32>,
{
    let cube: Vec<Vec<Vec<f32>>> = matrix
        .axis_iter(Axis(0))
        .map(|channel| channel.outer_iter().map(|row| row.to_vec()).collect())
        .collect();
    let body = serde_json::to_value(cube)?;
    let document = match var {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_string(), body);
            Value::Object(map)
        }
        None => body,
    };
    std::fs::write(path, serde_json::to_string(&document)?)?;
    Ok(())
}

fn select_variable(document: Value, var: Option<&str>) -> Result<Value> {
    match (document, var) {
        (Value::Object(mut map), Some(name)) => map
            .remove(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string())),
        (Value::Object(map), None) => {
            let mut arrays = map.into_iter().filter(|(_, v)| v.is_array());
            match (arrays.next(), arrays.next()) {
                (Some((_, value)), None) => Ok(value),
                _ => Err(Error::Shape(
                    "object holds several arrays; name the variable to load".into(),
                )),
            }
        }
        (value @ Value::Array(_), _) => Ok(value),
        (_, _) => Err(Error::Shape("expected a JSON object or array".into())),
    }
}

fn as_list<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::Shape(format!("expected an array of {what}")))
}

fn parse_cube(value: &Value) -> Result<Array3<f32>> {
    let channels = as_list(value, "channels")?;
    let bins = channels.first().map(|c| as_list(c, "bins")).transpose()?.map_or(0, Vec::len);
    let frames = channels
        .first()
        .and_then(|c| c.as_array())
        .and_then(|rows| rows.first())
        .map(|r| as_list(r, "frames"))
        .transpose()?
        .map_or(0, Vec::len);

    let mut data = Vec::with_capacity(channels.len() * bins * frames);
    for (c, channel) in channels.iter().enumerate() {
        let rows = as_list(channel, "bins")?;
        if rows.len() != bins {
            return Err(Error::Shape(format!(
                "channel {c} has {} bins, expected {bins}",
                rows.len()
            )));
        }
        for (f, row) in rows.iter().enumerate() {
            let cells = as_list(row, "frames")?;
            if cells.len() != frames {
                return Err(Error::Shape(format!(
                    "channel {c} bin {f} has {} frames, expected {frames}",
                    cells.len()
                )));
            }
            for cell in cells {
                let v = match cell {
                    Value::Number(n) => n.as_f64().map_or(f32::NAN, |x| x as f32),
                    Value::Null => f32::NAN,
                    other => return Err(Error::Shape(format!("non-numeric entry {other}"))),
                };
                data.push(v);
            }
        }
    }

    Array3::from_shape_vec((channels.len(), bins, frames), data)
        .map_err(|e| Error::Shape(e.to_string()))
}
