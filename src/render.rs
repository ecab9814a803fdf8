//! Output of a finished [`TableModel`]

use crate::error::Result;
use crate::table::{TableModel, Value};
use serde_json::{Map, json};
use std::io::Write;

/// Column separator for text output
const COLUMN_GAP: &str = "  ";

/// Writes a complete table somewhere
pub trait Renderer {
    /// Render `table`; called once per run, after the table is complete
    fn render_table(&mut self, table: &TableModel) -> Result<()>;
}

/// Aligned plain-text columns
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    /// Render to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render_table(&mut self, table: &TableModel) -> Result<()> {
        let header: Vec<String> = table.headers().iter().map(|h| h.title.to_string()).collect();
        let rows: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for line in std::iter::once(&header).chain(rows.iter()) {
            let mut text = String::new();
            for (i, (cell, width)) in line.iter().zip(&widths).enumerate() {
                if i > 0 {
                    text.push_str(COLUMN_GAP);
                }
                text.push_str(cell);
                let pad = width - cell.chars().count();
                text.extend(std::iter::repeat_n(' ', pad));
            }
            writeln!(self.out, "{}", text.trim_end())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Structured output: `{"tables":[{"header":{..},"rows":[..]}]}`
///
/// Header maps column keys to titles; each row maps the same keys to the
/// cell text.
#[derive(Debug)]
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Render to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render_table(&mut self, table: &TableModel) -> Result<()> {
        let header: Map<String, serde_json::Value> = table
            .headers()
            .iter()
            .map(|h| (h.key.to_string(), json!(h.title)))
            .collect();
        let rows: Vec<Map<String, serde_json::Value>> = table
            .rows()
            .iter()
            .map(|row| {
                table
                    .headers()
                    .iter()
                    .zip(row)
                    .map(|(h, cell)| (h.key.to_string(), json!(cell.to_string())))
                    .collect()
            })
            .collect();

        let document = json!({ "tables": [{ "header": header, "rows": rows }] });
        serde_json::to_writer_pretty(&mut self.out, &document).map_err(std::io::Error::from)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
