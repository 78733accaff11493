use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, warn};
use std::collections::HashSet;
use std::io::Cursor;
use thiserror::Error;

use crate::model::{RawCell, RawRow};
use crate::utils::parse_date_string;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Erro ao processar o arquivo. Verifique o formato: {0}")]
    Unreadable(String),

    #[error("O arquivo não contém nenhuma planilha")]
    NoSheets,

    #[error("Erro ao ler a planilha '{sheet}': {message}")]
    Sheet { sheet: String, message: String },

    #[error("A primeira planilha não possui linha de cabeçalho")]
    MissingHeader,
}

/// Container formats the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Anything calamine can open: xlsx, xlsm, xlsb, xls, ods
    Workbook,
    /// Comma or semicolon separated text export of a sheet
    Csv,
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Self {
        let is_csv = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            SourceFormat::Csv
        } else {
            SourceFormat::Workbook
        }
    }
}

/// Turns uploaded bytes into header-keyed rows of the first sheet.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetDecoder {
    format: SourceFormat,
}

impl Default for SpreadsheetDecoder {
    fn default() -> Self {
        SpreadsheetDecoder {
            format: SourceFormat::Workbook,
        }
    }
}

impl SpreadsheetDecoder {
    pub fn new(format: SourceFormat) -> Self {
        SpreadsheetDecoder { format }
    }

    /// Pick the format from the uploaded file's extension
    pub fn for_file_name(file_name: &str) -> Self {
        Self::new(SourceFormat::from_file_name(file_name))
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
        let rows = match self.format {
            SourceFormat::Workbook => Self::decode_workbook(bytes)?,
            SourceFormat::Csv => Self::decode_csv(bytes)?,
        };
        debug!("decoded {} data rows ({:?})", rows.len(), self.format);
        Ok(rows)
    }

    /// Decode an upload, choosing the CSV or workbook path from its file name
    pub fn decode_with_hint(bytes: &[u8], file_name: &str) -> Result<Vec<RawRow>, DecodeError> {
        Self::for_file_name(file_name).decode(bytes)
    }

    //////////////////////////////////////////////////////////////
    ///  Private methods
    //////////////////////////////////////////////////////////////
    fn decode_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| DecodeError::Unreadable(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(DecodeError::NoSheets)?;

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(DecodeError::Sheet {
                    sheet: sheet_name,
                    message: e.to_string(),
                });
            }
            None => return Err(DecodeError::NoSheets),
        };

        let first_row_number = range.start().map(|(row, _)| row as usize).unwrap_or(0) + 1;
        let mut rows = range.rows();

        let header_row = rows.next().ok_or(DecodeError::MissingHeader)?;
        let headers = Self::collect_headers(header_row.iter().map(|cell| cell.to_string()));

        let mut parsed_rows = Vec::new();
        for (offset, row) in rows.enumerate() {
            let cells: Vec<RawCell> = row.iter().map(Self::convert_cell).collect();
            if cells.iter().all(RawCell::is_blank) {
                continue;
            }

            parsed_rows.push(Self::keyed_row(
                first_row_number + offset + 1,
                &headers,
                cells,
            ));
        }

        Ok(parsed_rows)
    }

    fn decode_csv(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(Self::sniff_delimiter(bytes))
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.byte_records();
        let header_record = match records.next() {
            Some(record) => record.map_err(|e| DecodeError::Unreadable(e.to_string()))?,
            None => return Err(DecodeError::MissingHeader),
        };
        let headers = Self::collect_headers(header_record.iter().map(|field| {
            String::from_utf8_lossy(field)
                .trim_start_matches('\u{feff}')
                .to_string()
        }));

        let mut parsed_rows = Vec::new();
        for (offset, record) in records.enumerate() {
            let record = record.map_err(|e| DecodeError::Unreadable(e.to_string()))?;
            let cells: Vec<RawCell> = record
                .iter()
                .map(|field| RawCell::Text(String::from_utf8_lossy(field).to_string()))
                .map(|cell| if cell.is_blank() { RawCell::Empty } else { cell })
                .collect();
            if cells.iter().all(RawCell::is_blank) {
                continue;
            }

            // The header is line 1, so the first data record is line 2
            parsed_rows.push(Self::keyed_row(offset + 2, &headers, cells));
        }

        Ok(parsed_rows)
    }

    /// Header cells are matched exactly as written. Blank headers and
    /// repeated headers yield `None`, so their columns are ignored and the
    /// first occurrence of a header wins.
    fn collect_headers(cells: impl Iterator<Item = String>) -> Vec<Option<String>> {
        let mut seen = HashSet::new();
        cells
            .enumerate()
            .map(|(index, header)| {
                if header.is_empty() {
                    return None;
                }
                if !seen.insert(header.clone()) {
                    warn!(
                        "header '{}' repeated in column {}; keeping the first occurrence",
                        header,
                        index + 1
                    );
                    return None;
                }
                Some(header)
            })
            .collect()
    }

    /// Brazilian exports separate fields with ';' because ',' is the decimal separator
    fn sniff_delimiter(bytes: &[u8]) -> u8 {
        let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
        let semicolons = first_line.iter().filter(|b| **b == b';').count();
        let commas = first_line.iter().filter(|b| **b == b',').count();
        if semicolons > commas { b';' } else { b',' }
    }

    /// Key `cells` by their column header, dropping unnamed columns
    fn keyed_row(row_number: usize, headers: &[Option<String>], cells: Vec<RawCell>) -> RawRow {
        let mut raw_row = RawRow::new(row_number);
        for (header, cell) in headers.iter().zip(cells) {
            if let Some(header) = header {
                raw_row.insert(header.clone(), cell);
            }
        }
        raw_row
    }

    fn convert_cell(cell: &Data) -> RawCell {
        match cell {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            // as_datetime applies the workbook's 1900 or 1904 epoch
            Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
                Some(datetime) => RawCell::Date(datetime.date()),
                None => RawCell::Empty,
            },
            Data::DateTime(_) => RawCell::Empty,
            Data::DateTimeIso(s) => match parse_date_string(s) {
                Some(date) => RawCell::Date(date),
                None => RawCell::Text(s.clone()),
            },
            Data::DurationIso(s) => RawCell::Text(s.clone()),
        }
    }
}
