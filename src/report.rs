//! Plain-text rendering for the CLI.

use std::fmt::Write;

use crate::models::{BranchInfo, FrameReference, Offender, TraceReport};

const SHORT_ID_LEN: usize = 8;
const MAX_CELL: usize = 60;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M %z";

pub fn render_frames(frames: &[FrameReference]) -> String {
    if frames.is_empty() {
        return "No frames with line information.\n".to_string();
    }

    let rows = frames
        .iter()
        .map(|frame| {
            vec![
                frame.file_path.clone(),
                frame.line_number.to_string(),
                frame.method_name.clone(),
            ]
        })
        .collect::<Vec<_>>();

    render_table(&["FILE", "LINE", "METHOD"], &rows)
}

pub fn render_offenders(offenders: &[Offender]) -> String {
    if offenders.is_empty() {
        return "No commits changed this line.\n".to_string();
    }

    let rows = offenders
        .iter()
        .map(|offender| {
            vec![
                short_id(&offender.commit_id),
                offender.author.clone(),
                offender.date.format(DATE_FORMAT).to_string(),
                offender.original_line.clone(),
                offender.modified_line.clone(),
            ]
        })
        .collect::<Vec<_>>();

    render_table(&["COMMIT", "AUTHOR", "DATE", "BEFORE", "AFTER"], &rows)
}

/// One section per frame: a `path:line method` heading and its offenders.
pub fn render_trace_reports(reports: &[TraceReport]) -> String {
    if reports.is_empty() {
        return "No frames with line information.\n".to_string();
    }

    let mut out = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let frame = &report.frame;
        let _ = writeln!(out, "{}:{} {}", frame.file_path, frame.line_number, frame.method_name);
        out.push_str(&render_offenders(&report.offenders));
    }

    out
}

pub fn render_branches(branches: &[BranchInfo]) -> String {
    let mut out = String::new();

    for branch in branches {
        let marker = if branch.is_current { '*' } else { ' ' };
        let commit = branch.last_commit_id.as_deref().map(short_id).unwrap_or_default();
        let kind = if branch.is_remote { " (remote)" } else { "" };

        let _ = writeln!(out, "{} {} {}{}", marker, branch.name, commit, kind);
    }

    out
}

fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL {
        cell.to_string()
    } else {
        let mut clipped: String = cell.chars().take(MAX_CELL - 3).collect();
        clipped.push_str("...");
        clipped
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }

    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");

    out.push_str(line.trim_end());
    out.push('\n');
}
