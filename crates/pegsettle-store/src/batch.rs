//! Batched message execution.

use pegsettle_types::{BatchMode, Result};

use crate::Context;

/// Apply `entries` in order, stopping at the first failure.
///
/// Each entry is atomic on its own. Under [`BatchMode::AllOrNothing`] a
/// failure also discards the entries applied before it; under
/// [`BatchMode::BestEffort`] those stay applied.
pub fn run_batch<E>(
    ctx: &mut Context<'_>,
    mode: BatchMode,
    entries: &[E],
    mut apply: impl FnMut(&mut Context<'_>, &E) -> Result<()>,
) -> Result<()> {
    match mode {
        BatchMode::AllOrNothing => ctx.atomic(|batch| {
            for (index, entry) in entries.iter().enumerate() {
                apply(batch, entry).inspect_err(|err| {
                    tracing::warn!(index, total = entries.len(), error = %err, "Batch entry rejected, rolling back message");
                })?;
            }
            Ok(())
        }),
        BatchMode::BestEffort => {
            for (index, entry) in entries.iter().enumerate() {
                ctx.atomic(|c| apply(c, entry)).inspect_err(|err| {
                    tracing::warn!(index, applied = index, error = %err, "Batch entry rejected, keeping earlier entries");
                })?;
            }
            Ok(())
        }
    }
}
