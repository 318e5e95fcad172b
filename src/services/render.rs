//! HTML rendering of upload reports.
//!
//! Existing clients locate results by substring search, so the marker
//! strings below and the row/cell shapes of the results table must stay
//! byte-stable. Every marker sits on its own line.

use crate::models::{FileReport, UploadMode, UploadReport};
use crate::services::upload::NO_FILE_SUBMITTED;

pub const UPLOAD_SUCCESSFUL: &str = "Upload Successful";
pub const UPLOAD_FAILED: &str = "Upload Failed";
pub const ERROR_LABEL: &str = "Error:";
pub const NEW_NAME_LABEL: &str = "New Name:";
pub const FILE_NAME_LABEL: &str = "File Name:";
pub const SIZE_LABEL: &str = "Size:";
pub const MIME_TYPE_LABEL: &str = "MIME Type:";

/// Status cell of an accepted row.
pub const STATUS_OK_CELL: &str = "<td class='success'>OK</td>";

/// Start of the status cell of a rejected row.
pub const STATUS_FAILED_CELL_PREFIX: &str = "<td class='error'>FAILED";

/// Render a full HTML page for the report.
pub fn render_html(report: &UploadReport) -> String {
    let body = match report.mode {
        UploadMode::Simple => render_simple(report),
        UploadMode::Multiple => render_multiple(report),
        UploadMode::Info => render_info(report),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>File Upload</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        body
    )
}

fn render_simple(report: &UploadReport) -> String {
    if let Some(error) = &report.error {
        return render_failure(None, error);
    }

    match report.files.first() {
        Some(file) if file.result.is_ok() => {
            let mut out = String::from("<div class='success'>\n");
            out.push_str(&format!("<h2>{}</h2>\n", UPLOAD_SUCCESSFUL));
            out.push_str(&line("Original Name:", &file.original_name));
            out.push_str(&line(
                NEW_NAME_LABEL,
                file.result.stored_name.as_deref().unwrap_or_default(),
            ));
            out.push_str(&line(SIZE_LABEL, &format!("{} bytes", file.size)));
            out.push_str(&line(MIME_TYPE_LABEL, &file.mime_type));
            out.push_str(&line("Extension:", &file.extension));
            if let Some(sha256) = &file.sha256 {
                out.push_str(&line("SHA-256:", sha256));
            }
            out.push_str("</div>\n");
            out
        }
        Some(file) => render_failure(
            Some(file),
            file.result.reason.as_deref().unwrap_or("Unknown error"),
        ),
        None => render_failure(None, NO_FILE_SUBMITTED),
    }
}

fn render_failure(file: Option<&FileReport>, reason: &str) -> String {
    let mut out = String::from("<div class='error'>\n");
    out.push_str(&format!("<h2>{}</h2>\n", UPLOAD_FAILED));
    if let Some(file) = file {
        out.push_str(&line(FILE_NAME_LABEL, &file.original_name));
    }
    out.push_str(&line(ERROR_LABEL, reason));
    out.push_str("</div>\n");
    out
}

fn render_multiple(report: &UploadReport) -> String {
    let mut out = String::from("<h2>Upload Results</h2>\n");
    out.push_str(&format!(
        "<p>Processed {} file(s): {} stored, {} rejected</p>\n",
        report.files.len(),
        report.ok_count(),
        report.failed_count()
    ));
    if let Some(error) = &report.error {
        out.push_str(&line(ERROR_LABEL, error));
    }

    out.push_str("<table>\n");
    out.push_str(
        "<tr><th>Name</th><th>Size</th><th>MIME Type</th><th>Extension</th><th>Status</th></tr>\n",
    );
    for file in &report.files {
        let status = if file.result.is_ok() {
            STATUS_OK_CELL.to_string()
        } else {
            format!(
                "{}: {}</td>",
                STATUS_FAILED_CELL_PREFIX,
                escape_html(file.result.reason.as_deref().unwrap_or("Unknown error"))
            )
        };
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}</tr>\n",
            escape_html(&file.original_name),
            file.size,
            escape_html(&file.mime_type),
            escape_html(&file.extension),
            status
        ));
    }
    out.push_str("</table>\n");
    out
}

fn render_info(report: &UploadReport) -> String {
    let mut out = String::from("<h2>File Information</h2>\n");
    if let Some(error) = &report.error {
        out.push_str(&line(ERROR_LABEL, error));
        return out;
    }

    for file in &report.files {
        out.push_str("<div class='file-info'>\n");
        out.push_str(&line(FILE_NAME_LABEL, &file.original_name));
        out.push_str(&line(SIZE_LABEL, &format!("{} bytes", file.size)));
        out.push_str(&line(MIME_TYPE_LABEL, &file.mime_type));
        out.push_str(&line("Extension:", &file.extension));
        let accepted = match (&file.result.reason, file.result.is_ok()) {
            (_, true) => "Yes".to_string(),
            (Some(reason), false) => format!("No ({})", reason),
            (None, false) => "No".to_string(),
        };
        out.push_str(&line("Accepted:", &accepted));
        out.push_str("</div>\n");
    }
    out
}

/// One `<p>label value</p>` line with the value escaped.
fn line(label: &str, value: &str) -> String {
    format!("<p>{} {}</p>\n", label, escape_html(value))
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
