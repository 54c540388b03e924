use comfy_table::{Cell, Color, Table};
use serde::Serialize;

use crate::rule::Key;

#[derive(Clone, Debug, Serialize)]
pub struct Lookup {
    pub key: Key,
    pub action: String,
}

pub fn lookup_table(lookups: &[Lookup]) -> Table {
    let mut table = Table::new();
    let _ = table.set_header(vec![
        Cell::new("KEY").fg(Color::Blue),
        Cell::new("ACTION").fg(Color::Blue),
    ]);
    for lookup in lookups {
        let _ = table.add_row(vec![lookup.key.to_string(), lookup.action.clone()]);
    }
    table
}

/// A key checked against both operands of a merge.
#[derive(Clone, Debug, Serialize)]
pub struct Probe {
    pub key: Key,
    pub left: String,
    pub right: String,
    pub expected: String,
    pub merged: String,
}

impl Probe {
    pub fn holds(&self) -> bool {
        self.expected == self.merged
    }
}

pub fn probe_table(probes: &[Probe]) -> Table {
    let mut table = Table::new();
    let _ = table.set_header(vec![
        Cell::new("KEY").fg(Color::Blue),
        Cell::new("LEFT").fg(Color::Blue),
        Cell::new("RIGHT").fg(Color::Blue),
        Cell::new("MERGED").fg(Color::Blue),
        Cell::new("CHECK").fg(Color::Blue),
    ]);
    for probe in probes {
        let check = if probe.holds() {
            Cell::new("ok").fg(Color::Green)
        } else {
            Cell::new(format!("expected {}", probe.expected)).fg(Color::Red)
        };
        let _ = table.add_row(vec![
            Cell::new(probe.key),
            Cell::new(&probe.left),
            Cell::new(&probe.right),
            Cell::new(&probe.merged),
            check,
        ]);
    }
    table
}
