//! HTML rendering for package pages and the index.
//!
//! The package page carries the `go-import` meta tag that `go get` parses:
//!
//! ```text
//! <meta name="go-import" content="<host>/<name> <vcs> <repository-url>">
//! ```
//!
//! Record fields are embedded as given; only HTML escaping is applied, which
//! a parser undoes. Pages are rendered fully into memory, so callers never
//! see partial output.

use std::fmt::Write;

use thiserror::Error;
use vanity_schema::{PackageRecord, Registry};

/// Rendering failures. Distinct from "no such package", which is the
/// resolver's `None`.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The formatter itself failed.
    #[error("failed to format page: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Render the landing page for `record`, served under `host`.
///
/// # Errors
///
/// Returns [`RenderError::Format`] if writing to the output fails.
pub fn render_package(host: &str, record: &PackageRecord) -> Result<String, RenderError> {
    let import_path = format!("{host}/{}", record.name);

    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "  <head>")?;
    writeln!(
        out,
        r#"    <meta name="go-import" content="{} {} {}">"#,
        escape(&import_path),
        escape(&record.vcs),
        escape(&record.repository_url),
    )?;
    writeln!(out, "  </head>")?;
    writeln!(out, "  <body>")?;
    writeln!(out, "    Install: go get -u {} <br>", escape(&import_path))?;
    writeln!(
        out,
        r#"    <a href="{}">Documentation</a><br>"#,
        escape(&record.documentation_url)
    )?;
    writeln!(out, r#"    <a href="{}">Source</a>"#, escape(&record.source_url))?;
    writeln!(out, "  </body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

/// Render the index page: one link per package, in [`Registry::iter`] order,
/// which is sorted by name.
///
/// # Errors
///
/// Returns [`RenderError::Format`] if writing to the output fails.
pub fn render_index(registry: &Registry) -> Result<String, RenderError> {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "  <body>")?;
    writeln!(out, "    <ul>")?;
    for record in registry.iter() {
        let name = escape(record.name.as_str());
        writeln!(out, r#"      <li><a href="{name}">{name}</a></li>"#)?;
    }
    writeln!(out, "    </ul>")?;
    writeln!(out, "  </body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

/// Escape text for use in HTML content and double- or single-quoted
/// attributes. A parser decodes the result back to the original string.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
