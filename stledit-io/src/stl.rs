//! STL format support
//!
//! Reads both ASCII and binary STL into the flat triangle records consumed by
//! the mesh loader. No vertex sharing happens here: every facet keeps its own
//! three corners exactly as stored in the file.

use crate::TriangleReader;
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;
use stledit_core::{is_finite_point, Error, Point3f, Result, Triangle, Vector3f};
use tracing::debug;

/// Size of the free-form header at the start of a binary STL file
const BINARY_HEADER_LEN: usize = 80;
/// Header plus the little-endian triangle count
const BINARY_PREAMBLE_LEN: usize = BINARY_HEADER_LEN + 4;
/// Normal, three corners and the attribute byte count
const BINARY_RECORD_LEN: usize = 50;

/// STL encoding variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

/// Byte length a binary STL needs for the triangle count in its preamble
fn declared_binary_len(data: &[u8]) -> Option<usize> {
    if data.len() < BINARY_PREAMBLE_LEN {
        return None;
    }
    let count = LittleEndian::read_u32(&data[BINARY_HEADER_LEN..BINARY_PREAMBLE_LEN]) as usize;
    count
        .checked_mul(BINARY_RECORD_LEN)
        .and_then(|body| body.checked_add(BINARY_PREAMBLE_LEN))
}

/// Guess the encoding of an STL buffer.
///
/// Many binary exporters write `solid` into the 80-byte header, so a leading
/// `solid` only means ASCII when it is followed by `facet` or `endsolid`
/// text. Otherwise a buffer large enough for its declared triangle count is
/// binary, even with a few trailing pad bytes.
pub fn detect_format(data: &[u8]) -> StlFormat {
    let declared = declared_binary_len(data);
    if declared == Some(data.len()) {
        return StlFormat::Binary;
    }

    let head = &data[..data.len().min(512)];
    let text = String::from_utf8_lossy(head);
    if !text.trim_start().starts_with("solid") {
        return StlFormat::Binary;
    }
    if text.contains("facet") || text.contains("endsolid") {
        return StlFormat::Ascii;
    }
    match declared {
        Some(len) if len <= data.len() => StlFormat::Binary,
        _ => StlFormat::Ascii,
    }
}

/// Parse an STL buffer of either encoding
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>> {
    let format = detect_format(data);
    let triangles = match format {
        StlFormat::Ascii => parse_ascii(data)?,
        StlFormat::Binary => parse_binary(data)?,
    };
    debug!(?format, triangles = triangles.len(), "parsed STL");
    Ok(triangles)
}

/// Treat an all-zero stored normal as absent, as most exporters write zeros
/// when they leave normal computation to the reader.
fn stored_normal(n: Vector3f) -> Option<Vector3f> {
    if n == Vector3f::zeros() {
        None
    } else {
        Some(n)
    }
}

fn read_vec3(data: &[u8]) -> [f32; 3] {
    [
        LittleEndian::read_f32(&data[0..4]),
        LittleEndian::read_f32(&data[4..8]),
        LittleEndian::read_f32(&data[8..12]),
    ]
}

/// Parse a binary STL buffer
pub fn parse_binary(data: &[u8]) -> Result<Vec<Triangle>> {
    if data.len() < BINARY_PREAMBLE_LEN {
        return Err(Error::InvalidData(format!(
            "Binary STL too small for header and triangle count: {} bytes",
            data.len()
        )));
    }

    let count = LittleEndian::read_u32(&data[BINARY_HEADER_LEN..BINARY_PREAMBLE_LEN]) as usize;
    let body = &data[BINARY_PREAMBLE_LEN..];
    let expected = count.checked_mul(BINARY_RECORD_LEN).unwrap_or(usize::MAX);
    if body.len() < expected {
        return Err(Error::InvalidData(format!(
            "Binary STL truncated: header declares {} triangles ({} bytes), found {} bytes",
            count,
            expected,
            body.len()
        )));
    }

    body.chunks_exact(BINARY_RECORD_LEN)
        .take(count)
        .enumerate()
        .map(|(index, record)| {
            let [nx, ny, nz] = read_vec3(&record[0..12]);
            let corner = |offset: usize| {
                let [x, y, z] = read_vec3(&record[offset..offset + 12]);
                Point3f::new(x, y, z)
            };
            let vertices = [corner(12), corner(24), corner(36)];
            if !vertices.iter().all(is_finite_point) {
                return Err(Error::InvalidData(format!(
                    "Binary STL triangle {} has a non-finite corner",
                    index
                )));
            }
            Ok(Triangle {
                vertices,
                normal: stored_normal(Vector3f::new(nx, ny, nz)),
            })
        })
        .collect()
}

/// Facet under construction while walking ASCII tokens
struct FacetBuilder {
    start_line: usize,
    normal: Option<Vector3f>,
    corners: Vec<Point3f>,
    in_loop: bool,
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

fn parse_coords<'a, I>(tokens: I, line: usize, what: &str) -> Result<[f32; 3]>
where
    I: Iterator<Item = &'a str>,
{
    let values: Vec<&str> = tokens.collect();
    if values.len() != 3 {
        return Err(parse_error(
            line,
            format!("{} expects 3 coordinates, found {}", what, values.len()),
        ));
    }
    let mut out = [0.0f32; 3];
    for (slot, raw) in out.iter_mut().zip(&values) {
        *slot = raw
            .parse::<f32>()
            .map_err(|_| parse_error(line, format!("Invalid {} coordinate: {}", what, raw)))?;
    }
    Ok(out)
}

/// Parse an ASCII STL buffer
pub fn parse_ascii(data: &[u8]) -> Result<Vec<Triangle>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::InvalidData(format!("ASCII STL is not valid UTF-8: {}", e)))?;

    let mut triangles = Vec::new();
    let mut seen_solid = false;
    let mut facet: Option<FacetBuilder> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let mut tokens = raw_line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "solid" => {
                if seen_solid || facet.is_some() {
                    return Err(parse_error(line, "Unexpected 'solid'"));
                }
                seen_solid = true;
            }
            "facet" => {
                if !seen_solid {
                    return Err(parse_error(line, "'facet' before 'solid'"));
                }
                if facet.is_some() {
                    return Err(parse_error(line, "Nested 'facet'"));
                }
                let normal = match tokens.next() {
                    Some("normal") => {
                        let [x, y, z] = parse_coords(tokens, line, "normal")?;
                        stored_normal(Vector3f::new(x, y, z))
                    }
                    None => None,
                    Some(other) => {
                        return Err(parse_error(line, format!("Expected 'normal', found '{}'", other)))
                    }
                };
                facet = Some(FacetBuilder {
                    start_line: line,
                    normal,
                    corners: Vec::with_capacity(3),
                    in_loop: false,
                });
            }
            "outer" => {
                let current = facet
                    .as_mut()
                    .ok_or_else(|| parse_error(line, "'outer loop' outside a facet"))?;
                if tokens.next() != Some("loop") {
                    return Err(parse_error(line, "Expected 'outer loop'"));
                }
                current.in_loop = true;
            }
            "vertex" => {
                let current = facet
                    .as_mut()
                    .filter(|f| f.in_loop)
                    .ok_or_else(|| parse_error(line, "'vertex' outside an outer loop"))?;
                let [x, y, z] = parse_coords(tokens, line, "vertex")?;
                if ![x, y, z].iter().all(|c| c.is_finite()) {
                    return Err(parse_error(line, "Vertex coordinates must be finite"));
                }
                current.corners.push(Point3f::new(x, y, z));
            }
            "endloop" => {
                let current = facet
                    .as_mut()
                    .filter(|f| f.in_loop)
                    .ok_or_else(|| parse_error(line, "'endloop' without 'outer loop'"))?;
                current.in_loop = false;
            }
            "endfacet" => {
                let done = facet
                    .take()
                    .ok_or_else(|| parse_error(line, "'endfacet' without 'facet'"))?;
                if done.in_loop {
                    return Err(parse_error(line, "'endfacet' inside an open loop"));
                }
                let corners: [Point3f; 3] = done.corners.as_slice().try_into().map_err(|_| {
                    parse_error(
                        done.start_line,
                        format!("Facet has {} vertices, expected 3", done.corners.len()),
                    )
                })?;
                triangles.push(Triangle {
                    vertices: corners,
                    normal: done.normal,
                });
            }
            "endsolid" => {
                if facet.is_some() {
                    return Err(parse_error(line, "'endsolid' inside a facet"));
                }
                return Ok(triangles);
            }
            other => {
                return Err(parse_error(line, format!("Unknown keyword '{}'", other)));
            }
        }
    }

    if !seen_solid {
        return Err(Error::InvalidData("Missing 'solid' in ASCII STL".to_string()));
    }
    if let Some(open) = facet {
        return Err(parse_error(open.start_line, "Unterminated facet"));
    }
    // Tolerate a missing 'endsolid'; several exporters omit it.
    Ok(triangles)
}

/// Reader for `.stl` files
pub struct StlReader;

impl TriangleReader for StlReader {
    fn read_triangles<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>> {
        let data = std::fs::read(path)?;
        parse_stl(&data)
    }
}
