//! Conversion between XML text and [`ConfigDocument`] trees.

use std::io;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::node::{ConfigDocument, Declaration, Element, Node};
use super::ParseError;

pub(crate) fn parse_document(text: &str) -> Result<ConfigDocument, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<Element> = None;
    // Open elements, innermost last.
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let node = match reader.read_event()? {
            Event::Eof => break,
            Event::Decl(decl) => {
                declaration = Some(read_declaration(&decl)?);
                continue;
            }
            Event::Start(start) => {
                stack.push(read_element(&start)?);
                continue;
            }
            Event::End(end) => {
                let name = utf8(end.name().as_ref())?;
                let element = match stack.pop() {
                    Some(element) if element.name() == name => element,
                    _ => return Err(ParseError::UnexpectedClose(name)),
                };
                Node::Element(element)
            }
            Event::Empty(start) => Node::Element(read_element(&start)?),
            Event::Text(text) => Node::Text(text.unescape()?.into_owned()),
            Event::CData(data) => Node::CData(utf8(&data)?),
            Event::Comment(comment) => Node::Comment(utf8(&comment)?),
            Event::PI(pi) => Node::ProcessingInstruction(utf8(&pi)?),
            Event::DocType(doctype) => Node::DocumentType(utf8(&doctype)?),
        };

        if let Some(parent) = stack.last_mut() {
            parent.push(node);
            continue;
        }

        match node {
            Node::Element(element) => {
                if root.is_some() {
                    return Err(ParseError::MultipleRoots(element.name().to_string()));
                }
                root = Some(element);
            }
            Node::Text(_) | Node::CData(_) => return Err(ParseError::StrayText),
            other if root.is_some() => epilog.push(other),
            other => prolog.push(other),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open.name().to_string()));
    }
    let root = root.ok_or(ParseError::MissingRoot)?;

    Ok(ConfigDocument {
        declaration,
        prolog,
        root,
        epilog,
    })
}

fn read_element(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let name = utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value()?;
        element.set_attribute(name, value.into_owned());
    }
    Ok(element)
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<Declaration, ParseError> {
    let version = utf8(&decl.version()?)?;
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|e| utf8(&e))
        .transpose()?;
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|s| utf8(&s))
        .transpose()?;
    Ok(Declaration {
        version,
        encoding,
        standalone,
    })
}

fn utf8(bytes: &[u8]) -> Result<String, ParseError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Renders `doc` as indented XML text.
pub(crate) fn write_document(doc: &ConfigDocument) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    if let Some(decl) = &doc.declaration {
        let event = BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        );
        writer.write_event(Event::Decl(event)).map_err(io::Error::other)?;
    }
    for node in &doc.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &doc.root)?;
    for node in &doc.epilog {
        write_node(&mut writer, node)?;
    }

    String::from_utf8(writer.into_inner()).map_err(io::Error::other)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    let event = match node {
        Node::Element(element) => return write_element(writer, element),
        Node::Text(text) => Event::Text(BytesText::new(text)),
        Node::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        Node::Comment(comment) => Event::Comment(BytesText::from_escaped(comment.as_str())),
        Node::ProcessingInstruction(pi) => Event::PI(BytesPI::new(pi.as_str())),
        Node::DocumentType(doctype) => Event::DocType(BytesText::from_escaped(doctype.as_str())),
    };
    writer.write_event(event).map_err(io::Error::other)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(element.name());
    for attribute in element.attributes() {
        start.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(io::Error::other);
    }

    writer.write_event(Event::Start(start)).map_err(io::Error::other)?;
    for child in element.children() {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(io::Error::other)
}
