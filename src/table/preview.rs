// ABOUTME: Renders a Table as the plain-text preview the read tools return.
// ABOUTME: Column list first, then the head rows aligned under their headers.

use super::Table;

/// Number of rows the read tools show.
pub const PREVIEW_ROWS: usize = 5;

impl Table {
    /// Render the column list and the first `limit` rows.
    pub fn preview(&self, limit: usize) -> String {
        format!(
            "Columns: {}\n\nPreview:\n{}",
            self.columns().join(", "),
            self.render_head(limit)
        )
    }

    /// Render the first `limit` rows with a row-index column.
    pub fn render_head(&self, limit: usize) -> String {
        let rows = &self.rows()[..self.row_count().min(limit)];
        if rows.is_empty() {
            return "(no rows)".to_string();
        }

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();

        let index_width = (rows.len() - 1).to_string().len();
        let widths: Vec<usize> = self
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 1);

        let mut header = " ".repeat(index_width);
        for (name, width) in self.columns().iter().zip(&widths) {
            header.push_str(&format!("  {:>width$}", name, width = *width));
        }
        lines.push(header);

        for (index, row) in cells.iter().enumerate() {
            let mut line = format!("{:<width$}", index, width = index_width);
            for (cell, width) in row.iter().zip(&widths) {
                line.push_str(&format!("  {:>width$}", cell, width = *width));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
