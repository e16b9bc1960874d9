//! `cardvault mask` — show how a value would be displayed.

use crate::errors::Result;
use crate::masking::mask;

/// Execute the `mask` command.
pub fn execute(value: &str) -> Result<()> {
    println!("{}", mask(value));
    Ok(())
}
