// Licensed under the Apache-2.0 license

//! Description rendering and post-processing.
//!
//! A [`DescRenderer`] turns a node's `desc` property into HTML. The result
//! is then rewritten: heading levels are pushed down so descriptions nest
//! under the page's own headings, and local images are copied into the
//! bundle under a content-hashed name.

use crate::error::{ExportError, ExportResult};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use winnow::ascii::{multispace0, Caseless};
use winnow::combinator::{alt, delimited, opt};
use winnow::token::{one_of, take_till, take_until};
use winnow::{ModalResult, Parser};

/// Converts description text to an HTML fragment.
pub trait DescRenderer {
    fn render(&self, text: &str) -> String;
}

/// Escapes the text and turns blank-line separated blocks into paragraphs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl DescRenderer for PlainText {
    fn render(&self, text: &str) -> String {
        let mut out = String::new();
        let mut para: Vec<&str> = Vec::new();
        for line in text.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !para.is_empty() {
                    out.push_str("<p>");
                    out.push_str(&escape(&para.join("\n")));
                    out.push_str("</p>\n");
                    para.clear();
                }
            } else {
                para.push(line.trim());
            }
        }
        out
    }
}

/// Passes descriptions through untouched, for designs that already carry
/// HTML in `desc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawHtml;

impl DescRenderer for RawHtml {
    fn render(&self, text: &str) -> String {
        text.to_string()
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `<h3>` or `</H3>`: whether it closes, and the level.
fn heading_tag(input: &mut &str) -> ModalResult<(bool, u32)> {
    '<'.parse_next(input)?;
    let close = opt('/').parse_next(input)?.is_some();
    one_of(['h', 'H']).parse_next(input)?;
    let level = one_of('0'..='9').parse_next(input)?;
    '>'.parse_next(input)?;
    Ok((close, level.to_digit(10).unwrap_or(0)))
}

/// A self-closing `<img ... />`, yielding its attribute text.
fn img_tag<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    '<'.parse_next(input)?;
    multispace0.parse_next(input)?;
    Caseless("img").parse_next(input)?;
    let attrs = take_until(0.., "/>").parse_next(input)?;
    "/>".parse_next(input)?;
    Ok(attrs)
}

fn quoted<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

/// `src = "value"`, yielding the value.
fn src_attr<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    Caseless("src").parse_next(input)?;
    multispace0.parse_next(input)?;
    '='.parse_next(input)?;
    multispace0.parse_next(input)?;
    quoted.parse_next(input)
}

/// Byte range of the `src` value within an `<img>` attribute string.
fn find_src(attrs: &str) -> Option<(usize, usize)> {
    let mut prev_space = true;
    for (i, c) in attrs.char_indices() {
        if prev_space {
            let mut rest = &attrs[i..];
            if let Ok(value) = src_attr.parse_next(&mut rest) {
                // The value ends one quote before what is left.
                let end = attrs.len() - rest.len() - 1;
                return Some((end - value.len(), end));
            }
        }
        prev_space = c.is_whitespace();
    }
    None
}

/// Add `offset` to every heading level, capping at `h6`.
pub fn promote_headings(html: &str, offset: u8) -> String {
    if offset == 0 {
        return html.to_string();
    }
    rewrite_tags(html, |tag| {
        let mut rest = tag;
        let (close, level) = heading_tag.parse_next(&mut rest).ok()?;
        let level = (level + u32::from(offset)).min(6);
        let slash = if close { "/" } else { "" };
        Some((tag.len() - rest.len(), format!("<{slash}h{level}>")))
    })
}

/// Scan `html` for `<`. At each one `edit` may consume a prefix of the
/// remaining text and supply its replacement.
fn rewrite_tags(html: &str, mut edit: impl FnMut(&str) -> Option<(usize, String)>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(found) = html[pos..].find('<') {
        let start = pos + found;
        out.push_str(&html[pos..start]);
        match edit(&html[start..]) {
            Some((consumed, replacement)) => {
                out.push_str(&replacement);
                pos = start + consumed;
            }
            None => {
                out.push('<');
                pos = start + 1;
            }
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Images copied into the bundle, keyed by path below the output root.
pub type Assets = BTreeMap<PathBuf, Vec<u8>>;

fn is_remote(src: &str) -> bool {
    match src.split_once(':') {
        // A one-letter scheme is a Windows drive.
        Some((scheme, _)) if scheme.len() > 1 => scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)),
        _ => src.starts_with("//"),
    }
}

/// Find an image on disk. Relative paths are tried against the directory of
/// the describing node's source file first, then the working directory.
fn locate(src: &str, source: Option<&Path>) -> Option<PathBuf> {
    if src.is_empty() || is_remote(src) {
        return None;
    }
    let path = Path::new(src);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    if let Some(dir) = source.and_then(Path::parent) {
        let candidate = dir.join(path);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    path.is_file().then(|| path.to_path_buf())
}

/// Bundle name for an image: eight hex digits of its SHA-256 and its
/// original file name.
pub fn asset_name(bytes: &[u8], file: &Path) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    let base = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_{base}", &digest[..8])
}

/// Copy every locally resolvable `<img>` into `assets` and point its `src`
/// at the copy. Missing images are left alone.
pub fn bundle_images(
    html: &str,
    source: Option<&Path>,
    assets: &mut Assets,
) -> ExportResult<String> {
    let mut failure = None;
    let out = rewrite_tags(html, |tag| {
        if failure.is_some() {
            return None;
        }
        let mut rest = tag;
        let attrs = img_tag.parse_next(&mut rest).ok()?;
        let (start, end) = find_src(attrs)?;
        let file = locate(&attrs[start..end], source)?;
        let bytes = match std::fs::read(&file) {
            Ok(bytes) => bytes,
            Err(e) => {
                failure = Some(ExportError::io(&file, e));
                return None;
            }
        };
        let target = Path::new("content").join(asset_name(&bytes, &file));
        let new_src = target.to_string_lossy().replace('\\', "/");
        assets.entry(target).or_insert(bytes);

        let consumed = tag.len() - rest.len();
        let attrs_at = consumed - attrs.len() - 2;
        let tag = &tag[..consumed];
        Some((
            consumed,
            format!(
                "{}{new_src}{}",
                &tag[..attrs_at + start],
                &tag[attrs_at + end..]
            ),
        ))
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(out),
    }
}
