use std::collections::BTreeMap;

use comfy_table::{Cell, Color, Table};
use piecewise::{NodeStats, RangeOperator, Visitor};
use serde::Serialize;

use super::Report;
use crate::rule::{Key, Rules};

/// One line of a pre-order walk. Punctual splits contribute one row per entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "node")]
pub enum NodeRow {
    Range { operator: String, separator: Key },
    Punctual { key: Key, action: String },
    Action { action: String },
}

#[derive(Debug, Default)]
struct RowCollector {
    rows: Vec<NodeRow>,
}

impl Visitor<Key, String> for RowCollector {
    fn visit_range(&mut self, op: RangeOperator, separator: &Key) {
        self.rows.push(NodeRow::Range {
            operator: op.to_string(),
            separator: *separator,
        });
    }

    fn visit_punctual(&mut self, _op: RangeOperator, entries: &BTreeMap<Key, String>) {
        self.rows
            .extend(entries.iter().map(|(key, action)| NodeRow::Punctual {
                key: *key,
                action: action.clone(),
            }));
    }

    fn visit_action(&mut self, action: &String) {
        self.rows.push(NodeRow::Action {
            action: action.clone(),
        });
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TreeReport {
    pub default: String,
    pub stats: NodeStats,
    pub nodes: Vec<NodeRow>,
}

impl TreeReport {
    pub fn new(range: &Rules) -> Self {
        let mut collector = RowCollector::default();
        range.traverse(&mut collector);
        Self {
            default: range.default_action().clone(),
            stats: range.stats(),
            nodes: collector.rows,
        }
    }
}

impl Report for TreeReport {
    fn report(&self) {
        let mut table = Table::new();
        let _ = table.set_header(vec![
            Cell::new("NODE").fg(Color::Blue),
            Cell::new("OPERATOR").fg(Color::Blue),
            Cell::new("KEY").fg(Color::Blue),
            Cell::new("ACTION").fg(Color::Blue),
        ]);

        for row in &self.nodes {
            let cells = match row {
                NodeRow::Range {
                    operator,
                    separator,
                } => vec![
                    "range".to_owned(),
                    operator.clone(),
                    separator.to_string(),
                    String::new(),
                ],
                NodeRow::Punctual { key, action } => vec![
                    "punctual".to_owned(),
                    RangeOperator::Equal.to_string(),
                    key.to_string(),
                    action.clone(),
                ],
                NodeRow::Action { action } => {
                    vec!["action".to_owned(), String::new(), String::new(), action.clone()]
                }
            };
            let _ = table.add_row(cells);
        }

        println!("{table}");
        println!(
            "default: {}, range splits: {}, punctual splits: {}, entries: {}, leaves: {}, depth: {}",
            self.default,
            self.stats.range_splits,
            self.stats.punctual_splits,
            self.stats.punctual_entries,
            self.stats.action_leaves,
            self.stats.depth,
        );
    }
}
