use astrace_model::HopRecord;
use astrace_render::{format_row, TableRenderer, HEADER};

fn record(sequence: u32, address: &str, asn: &str, provider: &str, country: &str, city: &str) -> HopRecord {
    HopRecord {
        sequence,
        address: address.to_string(),
        autonomous_system: asn.to_string(),
        provider: provider.to_string(),
        country: country.to_string(),
        city: city.to_string(),
    }
}

#[test]
fn header_matches_fixed_layout() {
    assert_eq!(
        HEADER,
        "№  IP                AS       Provider                    Country/City"
    );
}

#[test]
fn row_columns_line_up_with_header() {
    let row = format_row(
        1,
        &record(1, "8.8.8.8", "AS15169", "Google LLC", "US", "Mountain View"),
    );
    assert_eq!(
        row,
        "1  8.8.8.8           AS15169   Google LLC                  US/Mountain View"
    );

    let ip_col = HEADER.chars().position(|c| c == 'I').unwrap();
    assert_eq!(row.chars().position(|c| c == '8').unwrap(), ip_col);
}

#[test]
fn header_labels_start_where_cells_start() {
    let row = format_row(1, &record(1, "10.0.0.1", "AS1234", "Example Net", "RU", "Moscow"));
    let column = |line: &str, needle: &str| {
        let byte = line.find(needle).unwrap();
        line[..byte].chars().count()
    };

    assert_eq!(column(HEADER, "IP"), column(&row, "10.0.0.1"));
    assert_eq!(column(HEADER, "AS"), column(&row, "AS1234"));
    assert_eq!(column(HEADER, "Provider"), column(&row, "Example Net"));
    assert_eq!(column(HEADER, "Country/City"), column(&row, "RU/Moscow"));
}

#[test]
fn long_values_push_columns_right() {
    let provider = "A Very Long Provider Name That Overflows";
    let row = format_row(
        12,
        &record(12, "203.0.113.254", "AS64500", provider, "--", "--"),
    );

    let expected = format!("12 203.0.113.254     AS64500   {provider}   --/--");
    assert_eq!(row, expected);
}

#[test]
fn placeholders_render_in_every_column() {
    let row = format_row(3, &HopRecord::degraded(3, "10.0.0.1"));
    assert_eq!(
        row,
        "3  10.0.0.1          --       --                          --/--"
    );
}

#[test]
fn widths_count_characters() {
    let row = format_row(
        2,
        &record(2, "95.167.1.1", "AS8997", "Ростелеком", "RU", "Москва"),
    );
    let provider_end = row.find("RU").unwrap();
    let prefix: String = row[..provider_end].to_string();
    assert_eq!(prefix.chars().count(), 3 + 18 + 9 + 28);
}

#[test]
fn renderer_numbers_rows_and_prints_header_once() {
    let mut renderer = TableRenderer::new(Vec::new());
    renderer
        .print(&record(1, "192.168.1.1", "--", "--", "--", "--"))
        .unwrap();
    renderer
        .print(&record(2, "8.8.8.8", "AS15169", "Google LLC", "US", "Mountain View"))
        .unwrap();
    assert_eq!(renderer.rows_printed(), 2);

    let text = String::from_utf8(renderer.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("№  IP"));
    assert!(lines[1].starts_with("1  192.168.1.1"));
    assert!(lines[2].starts_with("2  8.8.8.8"));
}

#[test]
fn nothing_printed_without_rows() {
    let renderer = TableRenderer::new(Vec::new());
    assert_eq!(renderer.rows_printed(), 0);
    assert!(renderer.into_inner().is_empty());
}
