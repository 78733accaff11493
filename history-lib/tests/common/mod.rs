use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// Re-export shared test utilities from src/test_utils.rs
// These are the core functions used by most tests
#[allow(unused_imports)]
pub use history_lib::test_utils::{create_sample_dataset, csv_upload, exam_row, lab_result, ymd};

/// Header row every valid upload carries
#[allow(dead_code)]
pub const REQUIRED_HEADERS: [&str; 4] = ["Data", "Tipo de exame", "Exame", "Valor"];

/// A cell to place in a generated worksheet
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// Written as a real Excel date (serial number with a date format)
    Date(u16, u8, u8),
    Blank,
}

/// Build an .xlsx workbook in memory: `headers` on row 1, then `rows`.
/// Extra sheets are appended after the first one, filled with `extra_sheet_text`.
#[allow(dead_code)]
pub fn build_xlsx_with_sheets(
    headers: &[&str],
    rows: &[Vec<Cell>],
    extra_sheets: &[&str],
) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let worksheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, *text).unwrap();
                }
                Cell::Number(number) => {
                    worksheet.write_number(row_num, col, *number).unwrap();
                }
                Cell::Date(year, month, day) => {
                    let date = ExcelDateTime::from_ymd(*year, *month, *day).unwrap();
                    worksheet
                        .write_datetime_with_format(row_num, col, &date, &date_format)
                        .unwrap();
                }
                Cell::Blank => {}
            }
        }
    }

    for text in extra_sheets {
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, *text).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

#[allow(dead_code)]
pub fn build_xlsx(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    build_xlsx_with_sheets(headers, rows, &[])
}

/// The two-row Hemoglobina upload used across scenario tests
#[allow(dead_code)]
pub fn hemoglobin_workbook() -> Vec<u8> {
    build_xlsx(
        &REQUIRED_HEADERS,
        &[
            vec![
                Cell::Date(2024, 1, 10),
                Cell::Text("Hematologia"),
                Cell::Text("Hemoglobina"),
                Cell::Text("13,5"),
            ],
            vec![
                Cell::Date(2024, 2, 10),
                Cell::Text("Hematologia"),
                Cell::Text("Hemoglobina"),
                Cell::Number(14.0),
            ],
        ],
    )
}

/// Rewrite a generated workbook so it declares the 1904 date system.
/// Stored serial numbers are left untouched.
#[allow(dead_code)]
pub fn with_1904_epoch(xlsx: &[u8]) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let name = entry.name().to_string();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();

        if name == "xl/workbook.xml" {
            let xml = String::from_utf8(contents).unwrap();
            assert!(xml.contains("<workbookPr "));
            contents = xml
                .replacen("<workbookPr ", "<workbookPr date1904=\"1\" ", 1)
                .into_bytes();
        }

        writer.start_file(name, options).unwrap();
        writer.write_all(&contents).unwrap();
    }

    writer.finish().unwrap().into_inner()
}
