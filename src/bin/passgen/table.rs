use std::fmt::{self, Display};
use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

/// Write `rows` as a table with aligned columns, a header row and a divider under it.
pub(crate) fn display_table<Row: TableDisplay>(
    rows: &[Row],
    mut output: impl Write,
) -> io::Result<()> {
    let mut column_widths = Row::COLUMNS
        .iter()
        .map(|name| name.width())
        .collect::<Vec<_>>();
    for row in rows {
        for (column_index, width) in column_widths.iter_mut().enumerate() {
            *width = std::cmp::max(row.cell(column_index).width(), *width);
        }
    }

    output_row(&mut output, &column_widths, |column_index| {
        Padded(Row::COLUMNS[column_index], column_widths[column_index])
    })?;
    output_row(&mut output, &column_widths, |column_index| {
        Divider(column_widths[column_index])
    })?;
    for row in rows {
        output_row(&mut output, &column_widths, |column_index| {
            Padded(row.cell(column_index), column_widths[column_index])
        })?;
    }

    Ok(())
}

pub(crate) trait TableDisplay {
    const COLUMNS: &'static [&'static str];

    fn cell(&self, column_index: usize) -> &str;
}

fn output_row<F, D>(mut output: impl Write, column_widths: &[usize], get_cell: F) -> io::Result<()>
where
    D: Display,
    F: Fn(usize) -> D,
{
    let last = column_widths.len().saturating_sub(1);
    for column_index in 0..column_widths.len() {
        if column_index > 0 {
            write!(&mut output, "  ")?;
        }
        let cell = get_cell(column_index).to_string();
        // No trailing padding on the last column.
        if column_index == last {
            write!(&mut output, "{}", cell.trim_end())?;
        } else {
            write!(&mut output, "{}", cell)?;
        }
    }
    writeln!(&mut output)?;
    Ok(())
}

struct Divider(usize);

impl Display for Divider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            write!(f, "─")?;
        }
        Ok(())
    }
}

struct Padded<'a>(&'a str, usize);

impl Display for Padded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding = self.1.saturating_sub(self.0.width());
        write!(f, "{}", self.0)?;
        for _ in 0..padding {
            write!(f, " ")?;
        }
        Ok(())
    }
}
