// 📂 Tabular Loader - CSV / TSV / spreadsheet → RawTable
// First row is the header row; everything below is data.

use crate::error::{ReviewError, ReviewResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One cell as typed by the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Infer a cell type from raw text
    pub fn infer(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Cell::Empty;
        }
        match parse_number(raw) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(raw.to_string()),
        }
    }

    /// Numeric value, coercing numeric-looking text
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => parse_number(s),
            Cell::Empty => None,
        }
    }

    /// Text rendering used for name/classification fields
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Empty => String::new(),
        }
    }
}

/// Parse text as a finite number. `"nan"` and `"inf"` are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parsed table before column roles are known
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build from a header row and data rows. Rows are padded/truncated to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        RawTable { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Input format of an uploaded byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Delimited text, delimiter sniffed
    Delimited,
    Tsv,
    Spreadsheet,
}

impl SourceFormat {
    /// Map a file extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> ReviewResult<Self> {
        match ext.to_lowercase().as_str() {
            "csv" | "txt" => Ok(SourceFormat::Delimited),
            "tsv" => Ok(SourceFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            other => Err(ReviewError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> ReviewResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ReviewError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Load a file, choosing the parser from its extension
pub fn load_path(path: &Path) -> ReviewResult<RawTable> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, format)
}

/// Parse an in-memory byte stream
pub fn load_bytes(bytes: &[u8], format: SourceFormat) -> ReviewResult<RawTable> {
    let table = match format {
        SourceFormat::Delimited => {
            let content = decode_text(bytes);
            let delimiter = sniff_delimiter(&content);
            parse_delimited(&content, delimiter)?
        }
        SourceFormat::Tsv => parse_delimited(&decode_text(bytes), b'\t')?,
        SourceFormat::Spreadsheet => parse_spreadsheet(bytes)?,
    };

    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        ?format,
        "loaded table"
    );
    Ok(table)
}

// ============================================================================
// DELIMITED TEXT
// ============================================================================

/// UTF-8 first, Windows-1252 fallback (Excel-exported CSVs)
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Pick the delimiter that gives the most consistent field count (>1) over the first lines.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn parse_delimited(content: &str, delimiter: u8) -> ReviewResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(first) => first?.iter().map(|h| h.to_string()).collect(),
        None => return Ok(RawTable::default()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(Cell::infer).collect());
    }

    Ok(RawTable::new(headers, rows))
}

// ============================================================================
// SPREADSHEETS
// ============================================================================

fn parse_spreadsheet(bytes: &[u8]) -> ReviewResult<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ReviewError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReviewError::Spreadsheet("Workbook contains no sheets".to_string()))?
        .map_err(|e| ReviewError::Spreadsheet(format!("Failed to read first sheet: {}", e)))?;

    Ok(table_from_range(&range))
}

/// Convert a calamine range (first row = headers) into a RawTable
pub fn table_from_range(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| cell_from_data(c).as_text()).collect(),
        None => return RawTable::default(),
    };

    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<Cell>>())
        .filter(|row| row.iter().any(|c| *c != Cell::Empty))
        .collect();

    RawTable::new(headers, body)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(n) => Cell::Number(*n),
        Data::String(s) => Cell::infer(s),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => Cell::Text(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cell_inference() {
        assert_eq!(Cell::infer("1000"), Cell::Number(1000.0));
        assert_eq!(Cell::infer(" -12.5 "), Cell::Number(-12.5));
        assert_eq!(Cell::infer(""), Cell::Empty);
        assert_eq!(Cell::infer("Kas"), Cell::Text("Kas".to_string()));
        assert_eq!(Cell::infer("nan"), Cell::Text("nan".to_string()));
    }

    #[test]
    fn test_cell_as_text_renders_integers_plainly() {
        assert_eq!(Cell::Number(500.0).as_text(), "500");
        assert_eq!(Cell::Number(2.5).as_text(), "2.5");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn test_comma_csv_with_trimmed_headers() {
        let csv = " Akun , Jenis Akun ,Nilai\nPendapatan Jasa,Pendapatan,1000\nKas,Liabilitas,500\n";
        let table = load_bytes(csv.as_bytes(), SourceFormat::Delimited).unwrap();

        assert_eq!(table.headers, vec!["Akun", "Jenis Akun", "Nilai"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2), Some(&Cell::Number(1000.0)));
        assert_eq!(table.cell(1, 1), Some(&Cell::Text("Liabilitas".to_string())));
    }

    #[test]
    fn test_semicolon_delimiter_sniffed() {
        let csv = "Akun;Jenis Akun;Nilai\nBeban Gaji;Beban;250\n";
        let table = load_bytes(csv.as_bytes(), SourceFormat::Delimited).unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, 0), Some(&Cell::Text("Beban Gaji".to_string())));
    }

    #[test]
    fn test_tsv_format() {
        let tsv = "Account\tType\tAmount\nCash\tAsset\t10\n";
        let table = load_bytes(tsv.as_bytes(), SourceFormat::Tsv).unwrap();

        assert_eq!(table.headers, vec!["Account", "Type", "Amount"]);
        assert_eq!(table.cell(0, 2), Some(&Cell::Number(10.0)));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Akun,Jenis Akun,Nilai\nKas,Aset\n";
        let table = load_bytes(csv.as_bytes(), SourceFormat::Delimited).unwrap();

        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.cell(0, 2), Some(&Cell::Empty));
    }

    #[test]
    fn test_empty_input() {
        let table = load_bytes(b"", SourceFormat::Delimited).unwrap();
        assert!(table.headers.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // 0xE9 = 'é' in Windows-1252, invalid as UTF-8
        let bytes = b"Akun,Nilai\nCaf\xe9,5\n";
        let table = load_bytes(bytes, SourceFormat::Delimited).unwrap();

        assert_eq!(table.cell(0, 0), Some(&Cell::Text("Café".to_string())));
    }

    #[test]
    fn test_load_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Akun,Jenis Akun,Nilai").unwrap();
        writeln!(file, "Kas,Aset,100").unwrap();

        let table = load_path(&path).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_path(Path::new("ledger.pdf"));
        assert!(matches!(result, Err(ReviewError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_table_from_range() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("Akun".to_string()));
        range.set_value((0, 1), Data::String("Jenis Akun".to_string()));
        range.set_value((0, 2), Data::String("Nilai".to_string()));
        range.set_value((1, 0), Data::String("Kas".to_string()));
        range.set_value((1, 1), Data::String("Aset".to_string()));
        range.set_value((1, 2), Data::Int(750));
        range.set_value((2, 0), Data::String("Beban Sewa".to_string()));
        range.set_value((2, 1), Data::String("Beban".to_string()));
        range.set_value((2, 2), Data::Float(120.5));

        let table = table_from_range(&range);

        assert_eq!(table.headers, vec!["Akun", "Jenis Akun", "Nilai"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2), Some(&Cell::Number(750.0)));
        assert_eq!(table.cell(1, 2), Some(&Cell::Number(120.5)));
    }
}
