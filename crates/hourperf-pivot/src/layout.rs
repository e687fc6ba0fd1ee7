//! Grid layout
//!
//! Every category owns a fixed block of seven columns, with one blank
//! separator column between neighbouring blocks:
//!
//! ```text
//! | Receive_full_name .. Receive_performance_with_rotation | | Locate_full_name .. | | ...
//! ```
//!
//! The body is as tall as the largest category; shorter blocks are padded
//! with blank cells at the bottom.

use hourperf_core::{grid_width, Cell, ReportGrid, TaskCategory, BLOCK_WIDTH, METRIC_SUFFIXES};

use crate::group::Partitions;

/// Header labels for the given block order
pub fn header_row(categories: &[TaskCategory]) -> Vec<String> {
    let mut header = Vec::with_capacity(grid_width(categories.len()));
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            header.push(String::new());
        }
        header.extend(
            METRIC_SUFFIXES
                .iter()
                .map(|suffix| format!("{}_{}", category.label(), suffix)),
        );
    }
    header
}

/// Lay the partitions out side by side in `order`
pub fn build_grid(partitions: &Partitions, order: &[TaskCategory]) -> ReportGrid {
    let height = order
        .iter()
        .map(|c| partitions.get(*c).len())
        .max()
        .unwrap_or(0);
    let width = grid_width(order.len());

    let rows = (0..height)
        .map(|i| {
            let mut row = Vec::with_capacity(width);
            for (j, category) in order.iter().enumerate() {
                if j > 0 {
                    row.push(Cell::Blank);
                }
                match partitions.get(*category).get(i) {
                    Some(metric) => row.extend(metric.cells()),
                    None => row.extend(std::iter::repeat(Cell::Blank).take(BLOCK_WIDTH)),
                }
            }
            row
        })
        .collect();

    ReportGrid {
        categories: order.to_vec(),
        header: header_row(order),
        rows,
    }
}
