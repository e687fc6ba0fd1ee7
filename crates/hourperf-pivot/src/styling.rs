//! Styling batch for a rendered report
//!
//! Formatting is expressed as a list of [`FormatRequest`]s so the store can
//! apply them in one go after the values are written.

use hourperf_core::{block, CellRange, FormatRequest, NumberPattern, ReportGrid, SheetLayout};

/// Header fill (`#FFE699`)
pub const HEADER_BACKGROUND: u32 = 0xFF_E6_99;

/// Separator column fill, light gray (`#F0F0F0`)
pub const SEPARATOR_BACKGROUND: u32 = 0xF0_F0_F0;

/// Shift dropdown options
pub const SHIFT_OPTIONS: [&str; 4] = ["Shift1", "Shift2", "Flex", "Other"];

/// Hour dropdown options, `"0"` to `"23"`
pub fn hour_options() -> Vec<String> {
    (0..24).map(|h| h.to_string()).collect()
}

/// Labels and dropdowns of the control row
pub fn control_formats() -> Vec<FormatRequest> {
    vec![
        FormatRequest::Label {
            cell: SheetLayout::HOUR_LABEL,
            text: "Hour".to_string(),
        },
        FormatRequest::Label {
            cell: SheetLayout::SHIFT_LABEL,
            text: "Shift".to_string(),
        },
        FormatRequest::ListValidation {
            range: CellRange::cell(SheetLayout::HOUR_CONTROL),
            values: hour_options(),
            strict: false,
        },
        FormatRequest::ListValidation {
            range: CellRange::cell(SheetLayout::SHIFT_CONTROL),
            values: SHIFT_OPTIONS.iter().map(|s| s.to_string()).collect(),
            strict: false,
        },
    ]
}

/// Full formatting batch for `grid` written at the standard layout
pub fn report_formats(grid: &ReportGrid) -> Vec<FormatRequest> {
    let mut requests = control_formats();
    let width = grid.width();
    if width == 0 {
        return requests;
    }
    let last_col = column(width - 1);

    requests.push(FormatRequest::HeaderStyle {
        range: CellRange::new(SheetLayout::HEADER_ROW, 0, SheetLayout::HEADER_ROW, last_col),
        background: HEADER_BACKGROUND,
    });

    let rows = u32::try_from(grid.row_count()).unwrap_or(u32::MAX);
    let last_row = SheetLayout::FIRST_DATA_ROW + rows.saturating_sub(1);

    if rows > 0 {
        for index in 0..grid.categories.len() {
            let start = ReportGrid::block_start(index);
            let patterns = [
                (block::NEGATIVE_MINUTES, NumberPattern::Integer),
                (block::PERFORMANCE_WITHOUT_ROTATION, NumberPattern::Percent),
                (block::PERFORMANCE_WITH_ROTATION, NumberPattern::Percent),
            ];
            for (offset, pattern) in patterns {
                let col = column(start + offset);
                requests.push(FormatRequest::NumberFormat {
                    range: CellRange::new(SheetLayout::FIRST_DATA_ROW, col, last_row, col),
                    pattern,
                });
            }
        }
    }

    let separator_last_row = if rows > 0 { last_row } else { SheetLayout::HEADER_ROW };
    for col in grid.separator_columns() {
        let col = column(col);
        requests.push(FormatRequest::Background {
            range: CellRange::new(SheetLayout::HEADER_ROW, col, separator_last_row, col),
            color: SEPARATOR_BACKGROUND,
        });
    }

    requests
}

fn column(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}
