//! In-memory line surface for replays and headless runs.

use std::collections::BTreeMap;

use crate::domain::error::AutolotError;
use crate::domain::line_plan::{LineKind, LineStyle, PriceLine};
use crate::ports::line_port::LinePort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnLine {
    pub line: PriceLine,
    pub style: LineStyle,
}

#[derive(Debug, Default)]
pub struct MemoryLineSurface {
    lines: BTreeMap<LineKind, DrawnLine>,
    writes: usize,
}

impl MemoryLineSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: LineKind) -> Option<&DrawnLine> {
        self.lines.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of upserts and removals received.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LinePort for MemoryLineSurface {
    fn upsert(
        &mut self,
        kind: LineKind,
        line: PriceLine,
        style: LineStyle,
    ) -> Result<(), AutolotError> {
        tracing::trace!(line = %kind, price = line.price, interactive = line.interactive, "draw");
        self.lines.insert(kind, DrawnLine { line, style });
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, kind: LineKind) -> Result<(), AutolotError> {
        tracing::trace!(line = %kind, "erase");
        self.lines.remove(&kind);
        self.writes += 1;
        Ok(())
    }
}
