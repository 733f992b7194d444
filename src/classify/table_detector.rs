//! Table detection from text alignment.
//!
//! Tables are found without ruling lines: consecutive line bands holding two
//! or more eligible blocks whose left edges line up with the columns set by
//! the region's first row.

use super::markers::{is_bullet_marker, is_number_marker};
use crate::model::{BoundingBox, PositionedBlock};

/// Table detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Slack in points before a column's left edge
    pub column_tolerance: f32,
    /// Maximum vertical gap between rows (x font size)
    pub max_row_gap_ratio: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 12,
            column_tolerance: 10.0,
            max_row_gap_ratio: 2.5,
        }
    }
}

/// A detected table: block indices per row, with each block's column.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// Left edges of the columns
    pub columns: Vec<f32>,
    /// Rows top to bottom; each entry is `(block index, column)`
    pub rows: Vec<Vec<(usize, usize)>>,
}

impl DetectedTable {
    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A line band of the page.
#[derive(Debug, Clone)]
struct Band {
    members: Vec<usize>,
    bbox: BoundingBox,
    size: f32,
    eligible: bool,
}

/// A table region being grown row by row.
#[derive(Debug, Clone)]
struct Region {
    columns: Vec<(f32, f32)>,
    rows: Vec<Vec<(usize, usize)>>,
    last: BoundingBox,
}

/// Detects tables among positioned blocks.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables.
    ///
    /// `eligible[i]` says whether block `i` may become a table cell; a band
    /// holding any ineligible block ends the current region.
    pub fn detect(&self, blocks: &[PositionedBlock], eligible: &[bool]) -> Vec<DetectedTable> {
        let bands = self.group_into_bands(blocks, eligible);
        log::debug!(
            "TableDetector: {} bands, {} with 2+ eligible blocks",
            bands.len(),
            bands.iter().filter(|b| b.eligible).count()
        );

        let mut tables = Vec::new();
        let mut region: Option<Region> = None;

        for band in &bands {
            if !band.eligible {
                self.close(region.take(), blocks, &mut tables);
                continue;
            }

            if let Some(current) = region.as_mut() {
                let gap = current.last.vgap(&band.bbox);
                if gap <= self.config.max_row_gap_ratio * band.size {
                    if let Some(row) = assign_columns(&current.columns, band, blocks) {
                        current.rows.push(row);
                        current.last = band.bbox;
                        continue;
                    }
                }
                log::debug!("TableDetector: row at y={:.1} breaks the region", band.bbox.y);
                self.close(region.take(), blocks, &mut tables);
            }

            region = Some(self.open(band, blocks));
        }
        self.close(region, blocks, &mut tables);

        log::debug!("TableDetector: found {} tables", tables.len());
        tables
    }

    /// Group consecutive blocks sharing a line band.
    fn group_into_bands(&self, blocks: &[PositionedBlock], eligible: &[bool]) -> Vec<Band> {
        let mut bands: Vec<Band> = Vec::new();

        for (i, block) in blocks.iter().enumerate() {
            let ok = eligible.get(i).copied().unwrap_or(false) && block.text().is_some();
            match bands.last_mut() {
                Some(band) if blocks[band.members[0]].line == block.line => {
                    band.members.push(i);
                    band.bbox = band.bbox.union(&block.bbox);
                    band.size = band.size.max(block.font_size());
                    band.eligible &= ok;
                }
                _ => bands.push(Band {
                    members: vec![i],
                    bbox: block.bbox,
                    size: block.font_size(),
                    eligible: ok,
                }),
            }
        }

        for band in &mut bands {
            let count = band.members.len();
            band.eligible &= count >= self.config.min_columns && count <= self.config.max_columns;
        }
        bands
    }

    /// Start a region with `band` as its first row.
    fn open(&self, band: &Band, blocks: &[PositionedBlock]) -> Region {
        let mut columns = Vec::with_capacity(band.members.len());
        for (pos, &i) in band.members.iter().enumerate() {
            let left = blocks[i].bbox.x;
            let slack = if pos == 0 {
                self.config.column_tolerance
            } else {
                let prev_right = blocks[band.members[pos - 1]].bbox.right();
                ((left - prev_right) / 2.0).clamp(0.0, self.config.column_tolerance)
            };
            columns.push((left, left - slack));
        }

        Region {
            columns,
            rows: vec![band.members.iter().enumerate().map(|(c, &i)| (i, c)).collect()],
            last: band.bbox,
        }
    }

    /// Finish a region, keeping it if it has enough rows and is not a list.
    fn close(
        &self,
        region: Option<Region>,
        blocks: &[PositionedBlock],
        tables: &mut Vec<DetectedTable>,
    ) {
        let Some(region) = region else {
            return;
        };
        if region.rows.len() < self.config.min_rows {
            return;
        }
        if is_list_pattern(&region.rows, region.columns.len(), blocks) {
            log::debug!("TableDetector: skipping region, detected as list pattern");
            return;
        }
        tables.push(DetectedTable {
            columns: region.columns.iter().map(|(left, _)| *left).collect(),
            rows: region.rows,
        });
    }
}

/// Map every block of `band` to exactly one distinct column, or `None`.
///
/// Column `i` spans from its start to the start of column `i + 1`; the last
/// column is open to the right.
fn assign_columns(
    columns: &[(f32, f32)],
    band: &Band,
    blocks: &[PositionedBlock],
) -> Option<Vec<(usize, usize)>> {
    let mut used = vec![false; columns.len()];
    let mut row = Vec::with_capacity(band.members.len());

    for &i in &band.members {
        let bbox = &blocks[i].bbox;
        let mut hit = None;
        for (c, &(_, start)) in columns.iter().enumerate() {
            let end = columns.get(c + 1).map(|(_, s)| *s).unwrap_or(f32::INFINITY);
            if bbox.x < end && bbox.right() >= start {
                if hit.is_some() {
                    return None;
                }
                hit = Some(c);
            }
        }
        let column = hit?;
        if used[column] {
            return None;
        }
        used[column] = true;
        row.push((i, column));
    }

    Some(row)
}

/// Check if table rows actually represent a numbered or bulleted list whose
/// markers were set apart from the item text.
fn is_list_pattern(
    rows: &[Vec<(usize, usize)>],
    columns: usize,
    blocks: &[PositionedBlock],
) -> bool {
    // A list opens with its first marker; a header row above marker-like
    // placeholder cells makes the region a table.
    let opens_with_marker = rows
        .first()
        .and_then(|row| row.first())
        .and_then(|&(i, _)| blocks[i].text())
        .is_some_and(|text| is_bullet_marker(text) || is_number_marker(text));
    if !opens_with_marker {
        return false;
    }

    let mut bullet_count = 0;
    let mut number_count = 0;
    for row in rows {
        let Some(text) = row.first().and_then(|&(i, _)| blocks[i].text()) else {
            continue;
        };
        if is_bullet_marker(text) {
            bullet_count += 1;
        } else if is_number_marker(text) {
            number_count += 1;
        }
    }

    let bullet_ratio = bullet_count as f32 / rows.len() as f32;
    let total_ratio = (bullet_count + number_count) as f32 / rows.len() as f32;
    log::debug!(
        "TableDetector: list markers: bullets={}, numbers={}, rows={}",
        bullet_count,
        number_count,
        rows.len()
    );

    // Bullet markers are almost never real table data
    if bullet_ratio >= 0.5 {
        return true;
    }

    // Only reject 2-column regions for numbers; real tables often number rows
    columns == 2 && total_ratio >= 0.5
}
