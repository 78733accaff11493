//! Plain-text rendering of the two views, in Brazilian Portuguese.

use history_lib::utils::format_br_date;
use history_lib::{LatestSnapshot, SeriesProjection, UploadSummary};

use crate::utils::format_br_number;

const HEADER_EXAM: &str = "Exame";
const HEADER_LATEST: &str = "Último Resultado";
const HEADER_DATE: &str = "Data da Coleta";
const COLUMN_GAP: &str = "  ";
/// Width of a bar spanning the whole value axis
const BAR_WIDTH: usize = 40;
const BAR_CHAR: char = '█';

pub fn render_welcome() -> String {
    [
        "Bem-vinda!",
        "Para começar, envie seu arquivo de exames no formato Excel (.xlsx).",
        "",
        "    lab-history upload <ARQUIVO>",
        "",
        "O arquivo precisa das colunas 'Data', 'Tipo de exame', 'Exame' e 'Valor'.",
    ]
    .join("\n")
}

pub fn render_upload_summary(summary: &UploadSummary) -> String {
    let mut lines = vec![format!(
        "✅ Arquivo carregado: {} ({} resultados)",
        summary.file_name, summary.records
    )];

    if !summary.dropped.is_empty() {
        let rows: Vec<String> = summary
            .dropped
            .iter()
            .map(|dropped| dropped.row_number.to_string())
            .collect();
        lines.push(format!(
            "⚠️  {} linha(s) ignorada(s) por dados inválidos: {}",
            summary.dropped.len(),
            rows.join(", ")
        ));
    }

    lines.join("\n")
}

/// One table per exam type with the latest result of each exam
pub fn render_snapshot(snapshot: &LatestSnapshot) -> String {
    let mut sections = Vec::new();

    for group in snapshot.groups() {
        let rows: Vec<[String; 3]> = group
            .entries
            .iter()
            .map(|record| {
                [
                    record.exam_name.clone(),
                    format_br_number(record.value),
                    format_br_date(record.date),
                ]
            })
            .collect();

        let headers = [HEADER_EXAM, HEADER_LATEST, HEADER_DATE];
        let mut widths = headers.map(|header| header.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = vec![group.exam_type.clone()];
        lines.push(table_line(&headers, &widths));
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
        );
        for row in &rows {
            lines.push(table_line(row, &widths));
        }

        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

fn table_line<T: AsRef<str>>(cells: &[T], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

/// Text chart: one line per point with a bar scaled to the axis domain
pub fn render_series(series: &SeriesProjection) -> String {
    let mut lines = vec![format!("Histórico de Resultados: {}", series.exam_name)];

    let Some(upper) = series.domain.upper else {
        lines.push("Nenhum resultado registrado para este exame.".to_string());
        return lines.join("\n");
    };
    let lower = series.domain.lower;

    lines.push(format!(
        "Eixo: {} a {}",
        format_br_number(lower),
        format_br_number(upper)
    ));

    let values: Vec<String> = series
        .points
        .iter()
        .map(|point| format_br_number(point.value))
        .collect();
    let value_width = values
        .iter()
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(0);

    for (point, value) in series.points.iter().zip(&values) {
        let bar = BAR_CHAR.to_string().repeat(bar_length(point.value, lower, upper));
        let line = format!("{}  {value:<value_width$}  {bar}", point.label);
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

fn bar_length(value: f64, lower: f64, upper: f64) -> usize {
    let span = upper - lower;
    // Negative series can yield an inverted domain
    if span <= 0.0 {
        return BAR_WIDTH;
    }
    let fraction = ((value - lower) / span).clamp(0.0, 1.0);
    (fraction * BAR_WIDTH as f64).round() as usize
}

pub fn render_exam_list(options: &[String]) -> String {
    options.join("\n")
}
