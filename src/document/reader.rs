//! Builds a [`Document`] arena from raw bytes using quick-xml events.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smol_str::SmolStr;

use super::{Document, Element, NodeId, Span};
use crate::error::TrimError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub(super) fn parse(source: Vec<u8>) -> Result<Document, TrimError> {
    // The BOM stays in `source` so it survives rendering; the reader never sees it.
    let offset = if source.starts_with(UTF8_BOM) {
        UTF8_BOM.len()
    } else {
        0
    };

    let parsed = read_elements(&source[offset..], offset)?;
    Ok(Document {
        source,
        elements: parsed.elements,
        root: parsed.root,
    })
}

/// Stream events out of `input`; all spans are shifted by `offset`.
fn read_elements(input: &[u8], offset: usize) -> Result<ParsedElements, TrimError> {
    let mut builder = TreeBuilder::new(offset);
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            TrimError::xml(offset + reader.error_position() as usize, e.to_string())
        })?;
        let end = offset + reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                // `<` + content + `>`
                builder.open(e, end - e.len() - 2)?;
            }
            Event::Empty(ref e) => {
                // `<` + content + `/>`
                builder.open(e, end - e.len() - 3)?;
                builder.close(end)?;
            }
            Event::End(_) => builder.close(end)?,
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish(offset + reader.buffer_position() as usize)
}

struct ParsedElements {
    elements: Vec<Element>,
    root: NodeId,
}

/// Tracks open elements while events stream in.
struct TreeBuilder {
    offset: usize,
    elements: Vec<Element>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn new(offset: usize) -> Self {
        Self {
            offset,
            elements: Vec::new(),
            open: Vec::new(),
            root: None,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, start: usize) -> Result<NodeId, TrimError> {
        let tag = decode(e.name().as_ref(), start)?;
        let local_name = decode(e.local_name().as_ref(), start)?;

        let mut attributes = IndexMap::new();
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| TrimError::xml(start, format!("Attribute error: {err}")))?;
            let key = decode(attr.key.as_ref(), start)?;
            let value = attr
                .unescape_value()
                .map_err(|err| TrimError::xml(start, format!("Attribute value error: {err}")))?
                .into_owned();
            attributes.insert(key, value);
        }

        let id = NodeId(self.elements.len());
        let parent = self.open.last().copied();
        match parent {
            Some(parent) => self.elements[parent.0].children.push(id),
            None if self.root.is_some() => {
                return Err(TrimError::xml(start, format!("Multiple root elements: <{tag}>")));
            }
            None => self.root = Some(id),
        }

        self.elements.push(Element {
            tag,
            local_name,
            attributes,
            parent,
            children: Vec::new(),
            span: Span { start, end: start },
            removed: false,
        });
        self.open.push(id);
        Ok(id)
    }

    fn close(&mut self, end: usize) -> Result<(), TrimError> {
        let id = self
            .open
            .pop()
            .ok_or_else(|| TrimError::xml(end, "Closing tag without matching opening tag"))?;
        self.elements[id.0].span.end = end;
        Ok(())
    }

    fn finish(self, position: usize) -> Result<ParsedElements, TrimError> {
        if let Some(&unclosed) = self.open.last() {
            let tag = &self.elements[unclosed.0].tag;
            return Err(TrimError::xml(
                position,
                format!("Unexpected end of input: <{tag}> is not closed"),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| TrimError::xml(self.offset, "Document has no root element"))?;
        Ok(ParsedElements {
            elements: self.elements,
            root,
        })
    }
}

fn decode(bytes: &[u8], position: usize) -> Result<SmolStr, TrimError> {
    std::str::from_utf8(bytes)
        .map(SmolStr::new)
        .map_err(|e| TrimError::xml(position, format!("Invalid UTF-8 in name: {e}")))
}
