//! Paths command handler.

use crate::bootstrap::CliContext;

/// Print every resolved path in `key = value` form.
pub fn execute(ctx: &CliContext) {
    print!("{}", ctx.paths);
}
