/*!
 * Process Dump
 * Console listing of live slots (procdump) and its structured counterpart
 */

use super::table::ProcessTable;
use super::types::ProcessInfo;
use std::fmt::Write;

/// One line per non-`Unused` slot: `<pid> <state label> <name>`
///
/// Takes no locks of its own so it stays usable from a wedged machine.
pub fn procdump(table: &ProcessTable) -> String {
    let mut out = String::new();
    for (_, p) in table.iter().filter(|(_, p)| !p.is_unused()) {
        let _ = writeln!(out, "{} {} {}", p.pid(), p.state().label(), p.name());
    }
    out
}

/// Structured view of every non-`Unused` slot
pub fn snapshot(table: &ProcessTable) -> Vec<ProcessInfo> {
    table
        .iter()
        .filter(|(_, p)| !p.is_unused())
        .map(|(slot, p)| p.info(slot))
        .collect()
}
