//! Table grids assembled from classified table cells.

use super::{ClassifiedBlock, Role, TableShape};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One cell of a table grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell text
    pub content: String,
    /// Link target of the cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl GridCell {
    /// Check if the cell has no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A table's cells arranged in rows (top to bottom) and columns (left to
/// right). Every row has the header row's column count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Table index within the page
    pub table: usize,
    /// Rows of cells; row 0 is the header row
    pub rows: Vec<Vec<GridCell>>,
}

impl TableGrid {
    /// Build a grid from the cells of one table.
    ///
    /// Fails when a cell belongs to another table, lies outside `shape`, or
    /// occupies a position already taken. Missing cells are left empty.
    pub fn from_cells(
        page: u32,
        table: usize,
        shape: TableShape,
        cells: &[(usize, &ClassifiedBlock)],
    ) -> Result<Self> {
        if shape.columns == 0 || shape.rows == 0 {
            return Err(Error::emission(
                page,
                cells.first().map(|(i, _)| *i).unwrap_or(0),
                format!("table {} has no columns", table),
            ));
        }

        let mut rows = vec![vec![GridCell::default(); shape.columns]; shape.rows];
        let mut filled = vec![vec![false; shape.columns]; shape.rows];

        for &(position, block) in cells {
            let (cell_table, row, column) = match block.role {
                Role::TableCell { table, row, column } => (table, row, column),
                other => {
                    return Err(Error::emission(
                        page,
                        position,
                        format!("{} block inside table {}", other.name(), table),
                    ))
                }
            };
            if cell_table != table {
                return Err(Error::emission(
                    page,
                    position,
                    format!("cell of table {} interleaved with table {}", cell_table, table),
                ));
            }
            if row >= shape.rows || column >= shape.columns {
                return Err(Error::emission(
                    page,
                    position,
                    format!(
                        "cell at row {}, column {} is outside the {}x{} grid",
                        row, column, shape.rows, shape.columns
                    ),
                ));
            }
            if filled[row][column] {
                return Err(Error::emission(
                    page,
                    position,
                    format!("duplicate cell at row {}, column {}", row, column),
                ));
            }
            filled[row][column] = true;
            rows[row][column] = GridCell {
                content: block.content.clone(),
                link: block.link().map(str::to_string),
            };
        }

        Ok(Self { table, rows })
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The header row.
    pub fn header(&self) -> &[GridCell] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<GridCell>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }
}
