//! Reader and writer for `.rso` sprite geometry files.
//!
//! Line-oriented UTF-8 text:
//!
//! ```text
//! $rso$
//! <comment line, ignored>
//!
//! <triangle rows: "i j k", wider rows are fanned>
//!
//! <n-gon rows: "i0 i1 ... in">
//!
//! <vertex rows: "x y">
//! ```
//!
//! Every section is opened by a blank line. Sections are taken from a stack
//! of pending sections, so they must appear in exactly this order.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::primitive::{self, Mesh, MeshError};
use crate::core::math::Vector;

/// First line of every geometry file.
pub const MAGIC: &str = "$rso$";

/// File sections, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Triangles,
    Ngons,
    Vertices,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Triangles => "triangles",
            Section::Ngons => "n-gons",
            Section::Vertices => "vertices",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RsoError {
    #[error("missing `$rso$` header")]
    MissingHeader,
    #[error("bad header: expected `$rso$`, found `{found}`")]
    BadHeader { found: String },
    #[error("line {line}: invalid number `{token}` in {section}")]
    InvalidNumber { line: usize, section: Section, token: String },
    #[error("line {line}: {section} row has {found} values, expected {expected}")]
    WrongTokenCount { line: usize, section: Section, expected: &'static str, found: usize },
    #[error("line {line}: unexpected content outside a section")]
    UnexpectedContent { line: usize },
    #[error(transparent)]
    Invalid(#[from] MeshError),
}

/// Parsed contents of a geometry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f32; 2]>,
    pub ngons: Vec<Vec<usize>>,
    pub triangles: Vec<Vec<usize>>,
}

impl MeshData {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh.vertices().iter().map(|v| v.to_array()).collect(),
            ngons: mesh.ngons().to_vec(),
            triangles: mesh.triangles().to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        primitive::validate(self.vertices.len(), &self.ngons, &self.triangles)
    }

    pub fn to_mesh(&self) -> Result<Mesh, MeshError> {
        Mesh::new(
            self.vertices.iter().copied().map(Vector::from).collect(),
            self.ngons.clone(),
            self.triangles.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitHeader,
    Comment,
    /// Between the comment line and the first section.
    Preamble,
    Reading(Section),
    Done,
}

/// Parse and validate geometry text.
pub fn parse(text: &str) -> Result<MeshData, RsoError> {
    let mut data = MeshData::default();
    // Popped from the back: triangles first.
    let mut pending = vec![Section::Vertices, Section::Ngons, Section::Triangles];
    let mut state = State::AwaitHeader;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        state = match state {
            State::AwaitHeader if line.is_empty() => State::AwaitHeader,
            State::AwaitHeader if line == MAGIC => State::Comment,
            State::AwaitHeader => {
                return Err(RsoError::BadHeader { found: line.to_string() });
            }
            State::Comment => State::Preamble,
            State::Preamble | State::Reading(_) if line.is_empty() => match pending.pop() {
                Some(section) => State::Reading(section),
                None => State::Done,
            },
            State::Reading(section) => {
                read_row(&mut data, section, line, line_no)?;
                State::Reading(section)
            }
            State::Done if line.is_empty() => State::Done,
            State::Preamble | State::Done => {
                return Err(RsoError::UnexpectedContent { line: line_no });
            }
        };
    }

    if state == State::AwaitHeader {
        return Err(RsoError::MissingHeader);
    }
    data.validate()?;
    Ok(data)
}

fn read_row(data: &mut MeshData, section: Section, line: &str, line_no: usize) -> Result<(), RsoError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match section {
        Section::Vertices => {
            let [x, y] = tokens[..] else {
                return Err(RsoError::WrongTokenCount {
                    line: line_no,
                    section,
                    expected: "2",
                    found: tokens.len(),
                });
            };
            data.vertices.push([
                parse_number(x, section, line_no)?,
                parse_number(y, section, line_no)?,
            ]);
        }
        Section::Ngons | Section::Triangles => {
            if tokens.len() < 3 {
                return Err(RsoError::WrongTokenCount {
                    line: line_no,
                    section,
                    expected: "at least 3",
                    found: tokens.len(),
                });
            }
            let row = tokens
                .iter()
                .map(|t| parse_number(t, section, line_no))
                .collect::<Result<Vec<usize>, _>>()?;
            if section == Section::Ngons {
                data.ngons.push(row);
            } else {
                data.triangles.push(row);
            }
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(token: &str, section: Section, line: usize) -> Result<T, RsoError> {
    token.parse().map_err(|_| RsoError::InvalidNumber {
        line,
        section,
        token: token.to_string(),
    })
}

/// Serialize geometry in the `.rso` layout. `comment` fills the ignored
/// second line and must not contain a newline.
pub fn write(data: &MeshData, comment: &str) -> String {
    let mut out = String::new();
    out.push_str(MAGIC);
    out.push('\n');
    out.push_str(comment);
    out.push_str("\n\n");
    push_rows(&mut out, &data.triangles);
    out.push('\n');
    push_rows(&mut out, &data.ngons);
    out.push('\n');
    for [x, y] in &data.vertices {
        out.push_str(&format!("{x} {y}\n"));
    }
    out
}

fn push_rows(out: &mut String, rows: &[Vec<usize>]) {
    for row in rows {
        let row: Vec<String> = row.iter().map(|i| i.to_string()).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
}
