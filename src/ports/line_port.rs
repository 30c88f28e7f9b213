//! Chart line surface port trait.

use crate::domain::error::AutolotError;
use crate::domain::line_plan::{LineKind, LineStyle, PriceLine};

/// Draws named horizontal levels. Move notifications come back through the
/// event source as `LinesMoved`.
pub trait LinePort {
    /// Create the level, or update it in place if it already exists.
    fn upsert(&mut self, kind: LineKind, line: PriceLine, style: LineStyle)
        -> Result<(), AutolotError>;

    fn remove(&mut self, kind: LineKind) -> Result<(), AutolotError>;
}
