use astrace_model::HopRecord;
use std::io::{self, Write};

const NUMBER_WIDTH: usize = 3;
const IP_WIDTH: usize = 15;
const AS_WIDTH: usize = 6;
const PROVIDER_WIDTH: usize = 25;
const GUTTER: usize = 3;

pub const HEADER: &str = "№  IP                AS       Provider                    Country/City";

pub struct TableRenderer<W> {
    out: W,
    next_row: u32,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, next_row: 1 }
    }

    // Row numbers come from the counter; callers pass records in discovery order.
    pub fn print(&mut self, record: &HopRecord) -> io::Result<()> {
        if self.next_row == 1 {
            writeln!(self.out, "{HEADER}")?;
        }
        writeln!(self.out, "{}", format_row(self.next_row, record))?;
        self.out.flush()?;

        self.next_row += 1;
        Ok(())
    }

    pub fn rows_printed(&self) -> u32 {
        self.next_row - 1
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn format_row(number: u32, record: &HopRecord) -> String {
    let mut line = String::new();
    push_padded(&mut line, &number.to_string(), NUMBER_WIDTH);
    push_cell(&mut line, &record.address, IP_WIDTH);
    push_cell(&mut line, &record.autonomous_system, AS_WIDTH);
    push_cell(&mut line, &record.provider, PROVIDER_WIDTH);
    line.push_str(&record.country);
    line.push('/');
    line.push_str(&record.city);
    line
}

// Widths count characters, not bytes: city and provider names are often non-ASCII.
fn push_padded(line: &mut String, value: &str, width: usize) {
    line.push_str(value);
    let pad = width.saturating_sub(value.chars().count());
    line.extend(std::iter::repeat(' ').take(pad));
}

fn push_cell(line: &mut String, value: &str, width: usize) {
    push_padded(line, value, width);
    line.extend(std::iter::repeat(' ').take(GUTTER));
}
