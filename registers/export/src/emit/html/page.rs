// Licensed under the Apache-2.0 license

//! Page markup. Content pages are fragments that `ralbot.js` loads into the
//! main pane of `index.html`.

use super::desc::escape;
use crate::config::HtmlOptions;
use crate::util::address_digits;
use crate::walk::NodeRef;
use std::fmt::Write;

/// One line of a container's contents table.
#[derive(Clone, Debug)]
pub struct ChildRow {
    pub id: usize,
    pub offset: u64,
    pub ident: String,
    pub name: Option<String>,
}

/// One line of a register's field table.
#[derive(Clone, Debug)]
pub struct FieldRow {
    pub ident: String,
    pub low: u32,
    pub high: u32,
    pub access: String,
    pub reset: Option<u64>,
    pub name: Option<String>,
    pub desc: Option<String>,
    /// Name, value and rendered description of each encoding.
    pub encode: Vec<(String, u64, Option<String>)>,
}

impl FieldRow {
    fn bits(&self) -> String {
        if self.low == self.high {
            format!("[{}]", self.low)
        } else {
            format!("[{}:{}]", self.high, self.low)
        }
    }

    fn reset(&self) -> String {
        let digits = (self.high - self.low) as usize / 4 + 1;
        match self.reset {
            Some(v) => format!("0x{v:0digits$x}"),
            None => "-".to_string(),
        }
    }
}

/// `entry[4][2]` for arrays.
pub fn array_ident(node: &NodeRef<'_>) -> String {
    let mut ident = node.inst_name().to_string();
    if node.current_index.is_none() {
        if let Some(array) = &node.node.array {
            for d in &array.dimensions {
                let _ = write!(ident, "[{d}]");
            }
        }
    }
    ident
}

fn heading(out: &mut String, node: &NodeRef<'_>) {
    let ident = escape(&array_ident(node));
    match node.node.display_name() {
        Some(name) => {
            let _ = writeln!(out, "<h1>{} <small>{ident}</small></h1>", escape(name));
        }
        None => {
            let _ = writeln!(out, "<h1>{ident}</h1>");
        }
    }
}

fn summary(out: &mut String, node: &NodeRef<'_>) {
    out.push_str("<table class=\"props\">\n");
    let mut row = |label: &str, value: String| {
        let _ = writeln!(out, "<tr><th>{label}</th><td>{value}</td></tr>");
    };
    row("Path", escape(&node.path));
    row("Type", node.kind().to_string());
    row("Absolute Address", format!("0x{:x}", node.absolute_address));
    row("Base Offset", format!("0x{:x}", node.address_offset()));
    row("Size", format!("0x{:x}", node.size()));
    if let Some(array) = &node.node.array {
        let dims: Vec<String> = array.dimensions.iter().map(u64::to_string).collect();
        row("Array Dimensions", format!("[{}]", dims.join(", ")));
        row("Array Stride", format!("0x{:x}", array.stride));
    }
    out.push_str("</table>\n");
}

fn description(out: &mut String, desc: Option<&str>) {
    if let Some(desc) = desc {
        out.push_str("<h2>Description</h2>\n<div class=\"desc\">\n");
        out.push_str(desc);
        out.push_str("\n</div>\n");
    }
}

/// Address map or register file: a table of its children.
pub fn container(node: &NodeRef<'_>, desc: Option<&str>, rows: &[ChildRow]) -> String {
    let mut out = String::new();
    heading(&mut out, node);
    summary(&mut out, node);
    description(&mut out, desc);
    out.push_str("<h2>Contents</h2>\n");
    out.push_str("<table class=\"contents\">\n<tr><th>Offset</th><th>Identifier</th><th>Name</th></tr>\n");
    let digits = address_digits(node.size());
    for row in rows {
        let _ = writeln!(
            out,
            "<tr><td>0x{:0digits$x}</td><td><a class=\"node-link\" data-id=\"{}\" href=\"#{}\">{}</a></td><td>{}</td></tr>",
            row.offset,
            row.id,
            row.id,
            escape(&row.ident),
            row.name.as_deref().map(escape).unwrap_or_default(),
        );
    }
    out.push_str("</table>\n");
    out
}

/// Register: its field table, then each field's details.
pub fn register(node: &NodeRef<'_>, desc: Option<&str>, fields: &[FieldRow]) -> String {
    let mut out = String::new();
    heading(&mut out, node);
    summary(&mut out, node);
    description(&mut out, desc);
    out.push_str("<h2>Fields</h2>\n");
    out.push_str("<table class=\"fields\">\n<tr><th>Bits</th><th>Identifier</th><th>Access</th><th>Reset</th><th>Name</th></tr>\n");
    for field in fields {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{ident}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            field.bits(),
            field.access,
            field.reset(),
            field.name.as_deref().map(escape).unwrap_or_default(),
            ident = escape(&field.ident),
        );
    }
    out.push_str("</table>\n");

    for field in fields {
        if field.desc.is_none() && field.encode.is_empty() {
            continue;
        }
        let ident = escape(&field.ident);
        let _ = writeln!(out, "<h3 id=\"{ident}\">{ident} {}</h3>", field.bits());
        if let Some(desc) = &field.desc {
            let _ = writeln!(out, "<div class=\"desc\">\n{desc}\n</div>");
        }
        if !field.encode.is_empty() {
            out.push_str("<table class=\"encode\">\n<tr><th>Value</th><th>Name</th><th>Description</th></tr>\n");
            for (name, value, desc) in &field.encode {
                let _ = writeln!(
                    out,
                    "<tr><td>0x{value:x}</td><td>{}</td><td>{}</td></tr>",
                    escape(name),
                    desc.as_deref().unwrap_or_default()
                );
            }
            out.push_str("</table>\n");
        }
    }
    out
}

/// Memory: geometry only.
pub fn memory(node: &NodeRef<'_>, desc: Option<&str>) -> String {
    let mut out = String::new();
    heading(&mut out, node);
    summary(&mut out, node);
    out.push_str("<table class=\"props\">\n");
    if let Some(entries) = node.node.mementries() {
        let _ = writeln!(out, "<tr><th>Entries</th><td>{entries}</td></tr>");
    }
    if let Some(width) = node.node.memwidth() {
        let _ = writeln!(out, "<tr><th>Entry Width</th><td>{width}</td></tr>");
    }
    out.push_str("</table>\n");
    description(&mut out, desc);
    out
}

/// The bundle's entry point.
pub fn index(title: &str, options: &HtmlOptions) -> String {
    let title = escape(title);
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    out.push_str("<link rel=\"stylesheet\" href=\"css/ralbot.css\">\n");
    out.push_str("<script src=\"js/data.js\"></script>\n<script src=\"js/ralbot.js\"></script>\n");
    out.push_str("</head>\n<body onload=\"onPageLoad()\">\n<header>\n");
    if let Some(url) = &options.home_url {
        let _ = writeln!(out, "<a class=\"home\" href=\"{}\">Home</a>", escape(url));
    }
    let _ = writeln!(out, "<span class=\"title\">{title}</span>");
    out.push_str("</header>\n<nav id=\"sb-tree\"></nav>\n<main id=\"content\"></main>\n");
    let _ = writeln!(out, "<footer>{}</footer>", escape(&options.footer));
    out.push_str("</body>\n</html>\n");
    out
}
