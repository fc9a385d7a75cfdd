//! Minimal, tolerant HTML extraction for procyclingstats pages.
//!
//! Not a parser: we only look for flat `<table>`, `<tr>`, `<li>` blocks and
//! pull out text and the first link of each cell. Tag matching is
//! ASCII case-insensitive. Nested blocks of the same tag are not supported.

use std::collections::BTreeMap;

use crate::fetch::types::{Cell, RankingRow};
use crate::utils::{column_key, normalize_ws};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Convert to rows keyed by normalized header name.
    /// Cells without a header get a positional `col{n}` key.
    pub fn into_rows(self) -> Vec<RankingRow> {
        let keys: Vec<String> = self.headers.iter().map(|h| column_key(h)).collect();
        self.rows
            .into_iter()
            .map(|cells| {
                let mut row = RankingRow::default();
                for (i, cell) in cells.into_iter().enumerate() {
                    let key = match keys.get(i) {
                        Some(k) if !k.is_empty() && !row.has_column(k) => k.clone(),
                        _ => format!("col{}", i),
                    };
                    row.insert(key, cell);
                }
                row
            })
            .collect()
    }
}

/// Find every `<tag ...>...</tag>` block, returned with its outer tags.
fn blocks<'a>(html: &'a str, lower: &str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(rel) = lower.get(from..).and_then(|s| s.find(&open)) {
        let start = from + rel;
        let after_name = start + open.len();
        // `<th` must not match `<thead`
        let boundary = lower[after_name..].chars().next();
        if !matches!(boundary, Some(' ' | '>' | '\t' | '\n' | '\r' | '/')) {
            from = after_name;
            continue;
        }
        let Some(close_rel) = lower[after_name..].find(&close) else {
            break;
        };
        let close_start = after_name + close_rel;
        let end = lower[close_start..]
            .find('>')
            .map(|i| close_start + i + 1)
            .unwrap_or(lower.len());
        out.push(&html[start..end]);
        from = end;
    }
    out
}

/// Content between the end of the opening tag and the start of the closing tag
fn inner(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(open_end), Some(close_start)) if close_start > open_end => {
            &block[open_end + 1..close_start]
        }
        _ => "",
    }
}

/// Read an attribute value from the first tag in `fragment`
fn attr(fragment: &str, name: &str) -> Option<String> {
    let lower = fragment.to_ascii_lowercase();
    let tag_end = lower.find('>').unwrap_or(lower.len());
    for quote in ['"', '\''] {
        let pat = format!("{}={}", name, quote);
        let mut from = 0;
        while let Some(rel) = lower.get(from..tag_end).and_then(|s| s.find(&pat)) {
            let pos = from + rel;
            // Avoid matching `data-href=` when asking for `href=`
            let preceded_ok = pos == 0
                || lower[..pos]
                    .chars()
                    .last()
                    .map(|c| c.is_whitespace())
                    .unwrap_or(true);
            let value_start = pos + pat.len();
            if preceded_ok {
                let value_end = fragment[value_start..].find(quote)? + value_start;
                return Some(decode_entities(&fragment[value_start..value_end]));
            }
            from = value_start;
        }
    }
    None
}

/// Text content with tags removed, entities decoded and whitespace collapsed
pub fn text(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;

    for ch in fragment.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|&i| i <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn cell(fragment: &str) -> Cell {
    let lower = fragment.to_ascii_lowercase();
    let href = blocks(fragment, &lower, "a")
        .first()
        .and_then(|a| attr(a, "href"));
    Cell {
        text: text(inner(fragment)),
        href,
    }
}

/// All tables in the document, in order
pub fn tables(html: &str) -> Vec<Table> {
    let lower = html.to_ascii_lowercase();
    blocks(html, &lower, "table")
        .into_iter()
        .map(parse_table)
        .collect()
}

fn parse_table(block: &str) -> Table {
    let lower = block.to_ascii_lowercase();
    let mut table = Table::default();

    for tr in blocks(block, &lower, "tr") {
        let tr_lower = tr.to_ascii_lowercase();
        let headers = blocks(tr, &tr_lower, "th");
        let cells = blocks(tr, &tr_lower, "td");

        if cells.is_empty() {
            if table.headers.is_empty() && !headers.is_empty() {
                table.headers = headers.iter().map(|th| text(inner(th))).collect();
            }
            continue;
        }
        table.rows.push(cells.iter().map(|td| cell(td)).collect());
    }
    table
}

/// Rows of the first table in the document, keyed by header.
/// A page without any table yields no rows.
pub fn first_table_rows(html: &str) -> Vec<RankingRow> {
    tables(html)
        .into_iter()
        .next()
        .map(Table::into_rows)
        .unwrap_or_default()
}

/// Distinct link targets starting with `prefix`, in document order
pub fn links(html: &str, prefix: &str) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();
    for a in blocks(html, &lower, "a") {
        if let Some(href) = attr(a, "href") {
            let href = href.trim_start_matches('/').to_string();
            if href.starts_with(prefix) && !out.contains(&href) {
                out.push(href);
            }
        }
    }
    out
}

/// Text of the first `<tag>` element
pub fn first_text(html: &str, tag: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    blocks(html, &lower, tag)
        .first()
        .map(|b| text(inner(b)))
        .filter(|t| !t.is_empty())
}

/// Cells of every table row carrying `class` (e.g. the `sum` row of a points table)
pub fn rows_with_class(html: &str, class: &str) -> Vec<Vec<Cell>> {
    let lower = html.to_ascii_lowercase();
    blocks(html, &lower, "tr")
        .into_iter()
        .filter(|tr| {
            attr(tr, "class")
                .map(|c| c.split_whitespace().any(|c| c == class))
                .unwrap_or(false)
        })
        .map(|tr| {
            let tr_lower = tr.to_ascii_lowercase();
            blocks(tr, &tr_lower, "td").into_iter().map(cell).collect()
        })
        .collect()
}

/// Every `<li>` as a cell: its text and first link
pub fn list_items(html: &str) -> Vec<Cell> {
    let lower = html.to_ascii_lowercase();
    blocks(html, &lower, "li").into_iter().map(cell).collect()
}

/// `Key: value` pairs from list items, keyed by normalized label.
/// The first occurrence of a label wins.
pub fn info_fields(html: &str) -> BTreeMap<String, String> {
    let lower = html.to_ascii_lowercase();
    let mut fields = BTreeMap::new();
    for li in blocks(html, &lower, "li") {
        let content = text(inner(li));
        if let Some((label, value)) = content.split_once(':') {
            let key = column_key(label);
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                fields.entry(key).or_insert_with(|| value.to_string());
            }
        }
    }
    fields
}

/// `src` of the first image whose source contains `needle`
pub fn image_src(html: &str, needle: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("<img") {
        let start = from + rel;
        if let Some(src) = attr(&html[start..], "src") {
            if src.contains(needle) {
                return Some(src);
            }
        }
        from = start + 4;
    }
    None
}
