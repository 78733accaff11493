use anyhow::bail;
use history_lib::series::{exam_options, project, resolve_selection};
use history_lib::utils::write_error_to_log;
use history_lib::{LatestSnapshot, Session, SnapshotStorage};
use std::io::Write;

use crate::config::{Command, Settings};
use crate::exam_info::{search_url, ExamInfoProvider};
use crate::report::{
    render_exam_list, render_series, render_snapshot, render_upload_summary, render_welcome,
};

/// Execute one CLI command against the session, writing the user-facing output to `out`
pub fn run<S: SnapshotStorage, W: Write>(
    command: &Command,
    session: &mut Session<S>,
    settings: &Settings,
    info: &dyn ExamInfoProvider,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Upload { file } => match session.upload_file(file) {
            Ok(summary) => writeln!(out, "{}", render_upload_summary(&summary))?,
            Err(e) => {
                let mut message = format!("{}: {e}", file.display());
                if let Some(source) = std::error::Error::source(&e) {
                    message.push_str(&format!("\nCaused by: {source}"));
                }
                write_error_to_log(&settings.errors_log(), "Upload Error", &message);
                return Err(e.into());
            }
        },

        Command::Recent { json } => {
            let snapshot = LatestSnapshot::from_dataset(session.dataset());
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            } else if snapshot.is_empty() {
                writeln!(out, "{}", render_welcome())?;
            } else {
                writeln!(out, "{}", render_snapshot(&snapshot))?;
            }
        }

        Command::History { exam, json } => {
            let options = exam_options(session.dataset());
            if let Some(name) = exam {
                if !options.contains(name) {
                    bail!(
                        "Exame '{name}' não encontrado. Exames disponíveis: {}",
                        options.join(", ")
                    );
                }
            }

            let Some(selected) = resolve_selection(&options, exam.as_deref()) else {
                writeln!(out, "{}", render_welcome())?;
                return Ok(());
            };

            let series = project(session.dataset(), &selected);
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&series)?)?;
            } else {
                writeln!(out, "{}", render_series(&series))?;
            }
        }

        Command::Exams => {
            let options = exam_options(session.dataset());
            if options.is_empty() {
                writeln!(out, "{}", render_welcome())?;
            } else {
                writeln!(out, "{}", render_exam_list(&options))?;
            }
        }

        Command::Explain { exam } => writeln!(out, "{}", info.lookup(exam))?,

        Command::Search { exam } => writeln!(out, "{}", search_url(exam))?,

        Command::Clear => {
            session.clear()?;
            writeln!(out, "✅ Resultados removidos.")?;
        }
    }

    Ok(())
}
