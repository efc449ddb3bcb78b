//! Text form of element trees.
//!
//! The server SDK renders trees as XML for wire dumps. The same form is used
//! here for tracing and for feeding canned responses to test transports and
//! the command-line tool. Attributes only matter on a `results` root, where
//! they carry the status, errno and reason of a call.

use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::elem::Elem;
use crate::error::{NamError, Result};
use crate::server::{ResultStatus, Results};

impl Elem {
    /// Render the subtree as indented XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_elem(&mut out, self, "", 0);
        out
    }

    /// Parse an XML document into a tree. Attributes are ignored.
    pub fn parse_xml(xml: &str) -> Result<Elem> {
        parse_document(xml).map(|(elem, _)| elem)
    }
}

impl Results {
    /// Render as a `<results>` document with status attributes.
    pub fn to_xml(&self) -> String {
        let attrs = match &self.status {
            ResultStatus::Passed => " status=\"passed\"".to_string(),
            ResultStatus::Failed { errno, reason } => format!(
                " status=\"failed\" errno=\"{errno}\" reason=\"{}\"",
                escape(reason.as_str())
            ),
        };
        let mut out = String::new();
        write_elem(&mut out, &self.elem, &attrs, 0);
        out
    }

    /// Parse a `<results>` document. A missing `status` attribute reads as
    /// passed; `status="failed"` takes `errno` and `reason` from the root.
    pub fn parse_xml(xml: &str) -> Result<Results> {
        let (elem, attrs) = parse_document(xml)?;
        let attr = |key: &str| {
            attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let status = match attr("status") {
            Some("failed") => {
                let errno = match attr("errno") {
                    Some(s) => s.trim().parse().map_err(|_| {
                        NamError::Parse(format!("invalid errno attribute: {s:?}"))
                    })?,
                    None => 0,
                };
                ResultStatus::Failed {
                    errno,
                    reason: attr("reason").unwrap_or_default().to_string(),
                }
            }
            Some("passed") | None => ResultStatus::Passed,
            Some(other) => {
                return Err(NamError::Parse(format!("unknown result status: {other:?}")));
            }
        };

        Ok(Results { status, elem })
    }
}

fn write_elem(out: &mut String, elem: &Elem, attrs: &str, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
    let name = elem.name();
    if elem.has_children() {
        let _ = writeln!(out, "<{name}{attrs}>");
        for child in elem.children() {
            write_elem(out, child, "", depth + 1);
        }
        for _ in 0..depth {
            out.push('\t');
        }
        let _ = writeln!(out, "</{name}>");
    } else {
        match elem.content() {
            Some(text) if !text.is_empty() => {
                let _ = writeln!(out, "<{name}{attrs}>{}</{name}>", escape(text));
            }
            _ => {
                let _ = writeln!(out, "<{name}{attrs}/>");
            }
        }
    }
}

fn tag_name(start: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| NamError::Parse(format!("invalid UTF-8 in element name: {e}")))
}

fn root_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| NamError::Parse(format!("bad attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| NamError::Parse(format!("invalid UTF-8 in attribute name: {e}")))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Attach a finished node to its parent, or make it the root.
fn finish(stack: &mut Vec<Elem>, root: &mut Option<Elem>, elem: Elem) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.child_add(elem);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(elem);
            Ok(())
        }
        None => Err(NamError::Parse("multiple root elements".into())),
    }
}

/// Leaf text is kept verbatim. Text next to child elements is layout and is
/// dropped.
fn parse_document(xml: &str) -> Result<(Elem, Vec<(String, String)>)> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Elem> = Vec::new();
    let mut root: Option<Elem> = None;
    let mut attrs = Vec::new();
    let mut pending = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.is_empty() && root.is_none() {
                    attrs = root_attributes(&e)?;
                }
                pending.clear();
                stack.push(Elem::new(tag_name(&e)?));
            }
            Event::Empty(e) => {
                if stack.is_empty() && root.is_none() {
                    attrs = root_attributes(&e)?;
                }
                pending.clear();
                let elem = Elem::new(tag_name(&e)?);
                finish(&mut stack, &mut root, elem)?;
            }
            Event::Text(t) => {
                if !stack.is_empty() {
                    pending.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if !stack.is_empty() {
                    let raw = c.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|e| NamError::Parse(format!("invalid UTF-8 in CDATA: {e}")))?;
                    pending.push_str(text);
                }
            }
            Event::End(_) => {
                let mut elem = stack
                    .pop()
                    .ok_or_else(|| NamError::Parse("unbalanced end tag".into()))?;
                if !elem.has_children() && !pending.is_empty() {
                    elem.set_content(std::mem::take(&mut pending));
                }
                pending.clear();
                finish(&mut stack, &mut root, elem)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(NamError::Parse(format!(
            "unexpected end of document inside <{}>",
            open.name()
        )));
    }
    let root = root.ok_or_else(|| NamError::Parse("document has no root element".into()))?;
    Ok((root, attrs))
}
