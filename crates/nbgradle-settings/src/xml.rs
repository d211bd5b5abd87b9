//! Mapping between profile XML documents and [`ConfigTree`]s.
//!
//! The children of the document element become the children of the tree root. Every element is
//! a node keyed by its (local) tag name and its trimmed text content is the node value. Attributes
//! carry no meaning in profile documents and are ignored; when siblings repeat a tag name the last
//! one wins.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{ConfigKey, ConfigTree, ConfigTreeBuilder, Result, SettingsError};

/// Document element written by [`write_xml`] when saving a profile.
pub const PROFILE_ROOT_ELEMENT: &str = "gradle-project-properties";

pub fn parse_xml(text: &str) -> Result<ConfigTreeBuilder> {
    let doc = roxmltree::Document::parse(text).map_err(|err| SettingsError::Xml(err.to_string()))?;

    let mut builder = ConfigTreeBuilder::new();
    read_element(doc.root_element(), &mut builder)?;
    Ok(builder)
}

fn read_element(node: roxmltree::Node<'_, '_>, builder: &mut ConfigTreeBuilder) -> Result<()> {
    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let key = ConfigKey::new(child.tag_name().name())?;
            let mut child_builder = ConfigTreeBuilder::new();
            read_element(child, &mut child_builder)?;
            builder.set_child_tree(key, child_builder.create());
        } else if let Some(fragment) = child.text().filter(|_| child.is_text()) {
            text.push_str(fragment);
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        builder.set_value(Some(text.to_owned()));
    }
    Ok(())
}

pub fn write_xml(tree: &ConfigTree, root_element: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
        .map_err(write_error)?;
    write_node(&mut writer, root_element, tree)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(write_error)
}

fn write_node<W: Write>(writer: &mut Writer<W>, name: &str, tree: &ConfigTree) -> Result<()> {
    if tree.is_empty() {
        writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(write_error)?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_error)?;
    if let Some(value) = tree.value() {
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(write_error)?;
    }
    for (key, child) in tree.child_trees() {
        write_node(writer, key.as_str(), child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)?;
    Ok(())
}

fn write_error(err: impl std::fmt::Display) -> SettingsError {
    SettingsError::XmlWrite(err.to_string())
}
