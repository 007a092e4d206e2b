//! Renders attendance and payment views into downloadable CSV or XLSX
//! artifacts. The column layout and wording follow the sheets the club
//! secretaries have always worked with, so headers stay in Spanish.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, Table, TableColumn, TableStyle, Workbook};

use crate::error::{Error, Result};
use crate::models::{DailyView, Group, MemberSummary, PaymentRow, WeeklyMatrix};
use crate::payments::bank_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Xlsx,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "xlsx" => Ok(ReportFormat::Xlsx),
            other => Err(format!("unknown report format '{other}' (expected csv or xlsx)")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered report ready to be written to disk or served as a download.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    /// Header value an HTTP layer attaches when serving the artifact.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Format-independent tabular form of a report. Builders produce one of
/// these; `render` turns it into bytes.
#[derive(Debug, Clone)]
pub struct ReportTable {
    /// Spreadsheet table name, already sanitized.
    pub name: String,
    /// Download file name without extension.
    pub file_stem: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn render(&self, format: ReportFormat) -> Result<ReportArtifact> {
        let bytes = match format {
            ReportFormat::Csv => self.to_csv()?,
            ReportFormat::Xlsx => self.to_xlsx()?,
        };
        Ok(ReportArtifact {
            file_name: format!("{}.{}", self.file_stem, format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }

    fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let absent_fill = Format::new().set_background_color(Color::RGB(0xFFCCCC));

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header)?;
        }
        for (idx, row) in self.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if is_absent_cell(value) {
                    worksheet.write_string_with_format(
                        (idx + 1) as u32,
                        col as u16,
                        value,
                        &absent_fill,
                    )?;
                } else {
                    worksheet.write_string((idx + 1) as u32, col as u16, value)?;
                }
            }
        }

        for (col, width) in column_widths(&self.headers, &self.rows).iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        let columns: Vec<TableColumn> = self
            .headers
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let table = Table::new()
            .set_name(&self.name)
            .set_style(TableStyle::Medium9)
            .set_columns(&columns);
        // A spreadsheet table needs at least one data row to be valid.
        let last_row = self.rows.len().max(1) as u32;
        let last_col = self.headers.len().saturating_sub(1) as u16;
        worksheet.add_table(0, 0, last_row, last_col, &table)?;

        Ok(workbook.save_to_buffer()?)
    }
}

/// Whether a cell reads as an absence and gets the red fill in the
/// spreadsheet output. Case does not matter; "Presente" and "N/A" never
/// match.
fn is_absent_cell(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("ausente")
}

/// Collapses every run of non-word characters into a single underscore,
/// which is what spreadsheet table names allow.
pub fn sanitize_table_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_separator = false;
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }
    out
}

/// Lowercased sanitized form of a group name, used in download file names.
pub fn file_slug(name: &str) -> String {
    sanitize_table_name(name).to_lowercase()
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<f64> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let mut longest = header.chars().count();
            for row in rows {
                if let Some(value) = row.get(idx) {
                    longest = longest.max(value.chars().count());
                }
            }
            (longest + 4) as f64
        })
        .collect()
}

fn dmy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// One-day attendance sheet for a group.
pub fn daily_table(view: &DailyView) -> ReportTable {
    let rows = view
        .rows
        .iter()
        .map(|row| {
            let status = match &row.record {
                Some(record) if record.present => "Presente",
                _ => "Ausente",
            };
            vec![row.member.full_name(), dmy(view.date), status.to_string()]
        })
        .collect();

    let slug = file_slug(&view.group.name);
    ReportTable {
        name: sanitize_table_name(&format!(
            "T_AsistenciasDiaria_{}_{}",
            view.group.name,
            view.date.format("%Y%m%d")
        )),
        file_stem: format!("asistencias_grupo_{slug}_{}", view.date),
        headers: vec!["Nombres".into(), "Fecha".into(), "Asistencias".into()],
        rows,
    }
}

/// Weekly matrix with one column per activated session day plus totals.
pub fn weekly_table(matrix: &WeeklyMatrix) -> ReportTable {
    let mut headers = vec!["Nombres".to_string()];
    headers.extend(matrix.dates.iter().map(|date| dmy(*date)));
    headers.push("total_sesiones".into());
    headers.push("Asistencias".into());

    let rows = matrix
        .rows
        .iter()
        .map(|row| {
            let mut values = vec![row.member.full_name()];
            values.extend(row.cells.iter().map(|cell| cell.label().to_string()));
            values.push(row.total_sessions.to_string());
            values.push(row.total_present.to_string());
            values
        })
        .collect();

    let slug = file_slug(&matrix.group.name);
    ReportTable {
        name: sanitize_table_name(&format!(
            "T_AsistenciasSemana_{}_{}",
            matrix.week, matrix.group.name
        )),
        file_stem: format!("asistencias_grupo_{slug}_semana_{}", matrix.week),
        headers,
        rows,
    }
}

/// Whole-history per-member totals for a group.
pub fn summary_table(group: &Group, summaries: &[MemberSummary]) -> ReportTable {
    let rows = summaries
        .iter()
        .map(|summary| {
            vec![
                summary.member.full_name(),
                summary.first_date.map(|d| d.to_string()).unwrap_or_default(),
                summary.last_date.map(|d| d.to_string()).unwrap_or_default(),
                summary.total_sessions.to_string(),
                summary.total_present.to_string(),
            ]
        })
        .collect();

    ReportTable {
        name: sanitize_table_name(&format!("T_AsistenciasResumen_{}", group.name)),
        file_stem: format!("asistencias_grupo_{}", file_slug(&group.name)),
        headers: vec![
            "Nombres".into(),
            "fecha_primera".into(),
            "fecha_ultima".into(),
            "total_sesiones".into(),
            "Asistencias".into(),
        ],
        rows,
    }
}

/// Payments registered during one calendar month, newest first.
pub fn payments_table(year: i32, month: u32, payments: &[PaymentRow]) -> ReportTable {
    let rows = payments
        .iter()
        .map(|row| {
            let bank = row
                .payment
                .bank
                .as_deref()
                .map(|code| bank_label(code).unwrap_or_else(|| code.to_string()))
                .unwrap_or_default();
            vec![
                row.member_name.clone(),
                dmy(row.payment.paid_on),
                row.payment.reference.clone(),
                bank,
                row.payment.method.label().to_string(),
            ]
        })
        .collect();

    ReportTable {
        name: sanitize_table_name(&format!("T_Pagos_{year}_{month}")),
        file_stem: format!("pagos_{year}_{month:02}"),
        headers: vec![
            "Alumno".into(),
            "Fecha de pago".into(),
            "Número de referencia".into(),
            "Banco emisor".into(),
            "Tipo de transacción".into(),
        ],
        rows,
    }
}
