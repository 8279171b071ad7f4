#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering of trial snapshots for console diagnostics.

use anyhow::{Context, Result as AnyResult};
use maze_search_core::view::TrialSnapshot;
use std::{error::Error, fmt, io::Write};

/// Glyph for a closed cell.
pub const WALL: char = '#';
/// Glyph for an open cell without annotation.
pub const OPEN: char = '.';
/// Glyph marking the agent.
pub const AGENT: char = 'A';
/// Glyph marking the target.
pub const TARGET: char = 'T';

/// Largest number of decimals a belief dump may use.
pub const MAX_PRECISION: usize = 9;

/// Formats snapshots as fixed-width text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRenderer {
    precision: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { precision: 3 }
    }
}

impl TextRenderer {
    /// Creates a renderer printing belief values with `precision` decimals.
    ///
    /// # Errors
    ///
    /// Rejects a precision above [`MAX_PRECISION`].
    pub fn new(precision: usize) -> Result<Self, RenderingError> {
        if precision > MAX_PRECISION {
            return Err(RenderingError::InvalidPrecision { precision });
        }
        Ok(Self { precision })
    }

    /// One glyph per cell. Open cells show their annotation when present.
    #[must_use]
    pub fn grid(&self, snapshot: &TrialSnapshot<'_>) -> String {
        let side = snapshot.grid.side();
        let mut out = String::with_capacity(side * (side + 1));
        for row in 0..side {
            for column in 0..side {
                let cell = row * side + column;
                out.push(self.glyph(snapshot, cell));
            }
            out.push('\n');
        }
        out
    }

    /// Belief value of every open cell, walls and markers padded to the same width.
    ///
    /// Returns `None` when the snapshot carries no belief.
    #[must_use]
    pub fn belief(&self, snapshot: &TrialSnapshot<'_>) -> Option<String> {
        let belief = snapshot.belief?;
        let side = snapshot.grid.side();
        let width = self.precision + 2;
        let mut out = String::new();
        for row in 0..side {
            let line: Vec<String> = (0..side)
                .map(|column| {
                    let cell = row * side + column;
                    if Some(cell) == snapshot.agent {
                        format!("{AGENT:^width$}")
                    } else if !snapshot.grid.is_open(cell) {
                        format!("{WALL:^width$}")
                    } else {
                        format!(
                            "{:.precision$}",
                            belief.probability(cell),
                            precision = self.precision
                        )
                    }
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        Some(out)
    }

    fn glyph(&self, snapshot: &TrialSnapshot<'_>, cell: usize) -> char {
        if Some(cell) == snapshot.agent {
            return AGENT;
        }
        if Some(cell) == snapshot.target {
            return TARGET;
        }
        if !snapshot.grid.is_open(cell) {
            return WALL;
        }
        snapshot
            .annotations
            .and_then(|values| values.get(cell))
            .and_then(annotation_glyph)
            .unwrap_or(OPEN)
    }
}

fn annotation_glyph(value: u16) -> Option<char> {
    char::from_digit(u32::from(value), 36)
}

/// Destination for rendered snapshots.
pub trait SnapshotSink {
    /// Presents one snapshot under a heading.
    fn present(&mut self, heading: &str, snapshot: &TrialSnapshot<'_>) -> AnyResult<()>;
}

/// Writes rendered snapshots to any byte sink.
#[derive(Debug)]
pub struct TextSink<W> {
    renderer: TextRenderer,
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Wraps `writer` with the given renderer.
    pub fn new(renderer: TextRenderer, writer: W) -> Self {
        Self { renderer, writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SnapshotSink for TextSink<W> {
    fn present(&mut self, heading: &str, snapshot: &TrialSnapshot<'_>) -> AnyResult<()> {
        writeln!(self.writer, "== {heading} ==").context("failed to write snapshot heading")?;
        self.writer
            .write_all(self.renderer.grid(snapshot).as_bytes())
            .context("failed to write grid")?;
        if let Some(belief) = self.renderer.belief(snapshot) {
            writeln!(self.writer).context("failed to write separator")?;
            self.writer
                .write_all(belief.as_bytes())
                .context("failed to write belief map")?;
        }
        self.writer.flush().context("failed to flush snapshot")
    }
}

/// Errors that can occur when configuring a renderer.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// More decimals were requested than a belief dump supports.
    InvalidPrecision {
        /// Requested precision.
        precision: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrecision { precision } => {
                write!(
                    f,
                    "belief precision must be at most {MAX_PRECISION} (received {precision})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use maze_search_core::view::{BeliefView, CellValuesView, GridView};

    use super::*;

    // 4x4 grid with a 2x2 open interior.
    const LAYOUT: [bool; 16] = [
        false, false, false, false, //
        false, true, true, false, //
        false, true, true, false, //
        false, false, false, false,
    ];

    #[test]
    fn precision_above_limit_is_rejected() {
        let error = TextRenderer::new(12).expect_err("too many decimals");
        assert_eq!(error, RenderingError::InvalidPrecision { precision: 12 });
        assert!(TextRenderer::new(3).is_ok());
    }

    #[test]
    fn grid_marks_walls_agent_and_target() {
        let snapshot = TrialSnapshot {
            agent: Some(5),
            target: Some(10),
            ..TrialSnapshot::grid_only(GridView::new(&LAYOUT, 4))
        };
        let text = TextRenderer::default().grid(&snapshot);
        assert_eq!(text, "####\n#A.#\n#.T#\n####\n");
    }

    #[test]
    fn annotations_replace_open_glyphs() {
        let values = [0u16, 0, 0, 0, 0, 5, 6, 0, 0, 7, 11, 0, 0, 0, 0, 0];
        let snapshot = TrialSnapshot {
            annotations: Some(CellValuesView::new(&values)),
            ..TrialSnapshot::grid_only(GridView::new(&LAYOUT, 4))
        };
        let text = TextRenderer::default().grid(&snapshot);
        assert_eq!(text, "####\n#56#\n#7b#\n####\n");
    }

    #[test]
    fn belief_prints_three_decimals_by_default() {
        let probabilities = [
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.5, 0.0, //
            0.0, 0.25, 0.25, 0.0, //
            0.0, 0.0, 0.0, 0.0,
        ];
        let snapshot = TrialSnapshot {
            belief: Some(BeliefView::new(&probabilities)),
            agent: Some(5),
            ..TrialSnapshot::grid_only(GridView::new(&LAYOUT, 4))
        };
        let text = TextRenderer::default()
            .belief(&snapshot)
            .expect("belief present");
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[1], "  #     A   0.500   #  ");
        assert_eq!(rows[2], "  #   0.250 0.250   #  ");
    }

    #[test]
    fn sink_writes_heading_and_grid() {
        let snapshot = TrialSnapshot::grid_only(GridView::new(&LAYOUT, 4));
        let mut sink = TextSink::new(TextRenderer::default(), Vec::new());
        sink.present("layout", &snapshot).expect("in-memory write");
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        assert!(text.starts_with("== layout ==\n####\n#..#\n"));
    }
}
