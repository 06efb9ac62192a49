//! Table rendering for command output
//!
//! Builders return a `prettytable::Table` so callers (and tests) can print
//! or inspect it.

use crate::core::styles::StyleRole;
use crate::plugin::api::{Configuration, DeactivationReport, PluginClass, RegionStatus, TypeState};
use crate::point::api::PointValue;
use prettytable::{format, Cell, Row, Table};
use serde_json::Value;

fn cell(text: impl AsRef<str>, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text.as_ref());
    match role.cell_spec(use_color) {
        Some(spec) => cell.style_spec(spec),
        None => cell,
    }
}

fn table_with_titles(titles: &[&str], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        titles
            .iter()
            .map(|title| cell(title, StyleRole::Header, use_color))
            .collect(),
    ));
    table
}

/// One node of a resolved pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRow {
    pub name: String,
    pub prefix: String,
    pub port: String,
    /// Type validation state; `None` for the camera
    pub type_state: Option<TypeState>,
}

fn type_state_role(state: &TypeState) -> StyleRole {
    match state {
        TypeState::ConfirmedOk { .. } => StyleRole::Valid,
        TypeState::ConfirmedBad { .. } => StyleRole::Invalid,
        TypeState::Unknown | TypeState::NoExpectation => StyleRole::Dim,
    }
}

pub fn chain_table(rows: &[ChainRow], use_color: bool) -> Table {
    let mut table = table_with_titles(&["#", "Node", "Prefix", "Port", "Type"], use_color);
    for (position, row) in rows.iter().enumerate() {
        let state = match &row.type_state {
            Some(state) => cell(state.to_string(), type_state_role(state), use_color),
            None => cell("root", StyleRole::Dim, use_color),
        };
        table.add_row(Row::new(vec![
            Cell::new(&position.to_string()),
            cell(&row.name, StyleRole::Key, use_color),
            Cell::new(&row.prefix),
            Cell::new(&row.port),
            state,
        ]));
    }
    table
}

fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_json).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Field/value rows; in describe mode the source, dtype and shape columns
pub fn configuration_table(config: &Configuration, describe: bool, use_color: bool) -> Table {
    let mut table = if describe {
        table_with_titles(&["Field", "Source", "Type", "Shape"], use_color)
    } else {
        table_with_titles(&["Field", "Value"], use_color)
    };
    for (field, entry) in config {
        let mut cells = vec![cell(field, StyleRole::Key, use_color)];
        if describe {
            for key in ["source", "dtype", "shape"] {
                cells.push(Cell::new(&render_json(&entry[key])));
            }
        } else {
            cells.push(Cell::new(&render_json(&entry["value"])));
        }
        table.add_row(Row::new(cells));
    }
    table
}

pub fn class_table(classes: &[&'static PluginClass], use_color: bool) -> Table {
    let mut table = table_with_titles(&["Class", "Plugin type", "Pattern", "Family"], use_color);
    for class in classes {
        table.add_row(Row::new(vec![
            cell(class.name, StyleRole::Key, use_color),
            Cell::new(class.plugin_type.unwrap_or("-")),
            Cell::new(class.suffix_pattern.unwrap_or("-")),
            Cell::new(&class.family.to_string()),
        ]));
    }
    table
}

/// Directive writes applied by a staging run
pub fn directive_table(directives: &[(String, PointValue)], use_color: bool) -> Table {
    let mut table = table_with_titles(&["Order", "Point", "Staged value"], use_color);
    for (order, (point, value)) in directives.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&(order + 1).to_string()),
            cell(point, StyleRole::Key, use_color),
            Cell::new(&value.to_string()),
        ]));
    }
    table
}

pub fn restore_table(report: &DeactivationReport, use_color: bool) -> Table {
    let mut table = table_with_titles(&["Point", "Restored"], use_color);
    for point in &report.restored {
        table.add_row(Row::new(vec![
            Cell::new(point),
            cell("yes", StyleRole::Valid, use_color),
        ]));
    }
    for (point, error) in &report.failures {
        table.add_row(Row::new(vec![
            Cell::new(point),
            cell(error.to_string(), StyleRole::Invalid, use_color),
        ]));
    }
    table
}

pub fn region_table(status: &RegionStatus, use_color: bool) -> Table {
    let mut table = table_with_titles(&["Point", "Value", "Result"], use_color);
    for write in &status.writes {
        let result = match &write.result {
            Ok(()) => cell("ok", StyleRole::Valid, use_color),
            Err(e) => cell(e.to_string(), StyleRole::Invalid, use_color),
        };
        table.add_row(Row::new(vec![
            Cell::new(&write.point),
            Cell::new(&write.value.to_string()),
            result,
        ]));
    }
    table
}
