use std::str::FromStr;

use scraper::{ElementRef, Html};
use thiserror::Error;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid mount selector: {0}")]
    InvalidSelector(String),
    #[error("mount point not found: {0}")]
    MountNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

/// `#id`, `.class` or a bare tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountSelector {
    Id(String),
    Class(String),
    Tag(String),
}

impl FromStr for MountSelector {
    type Err = DomError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, name): (fn(String) -> MountSelector, &str) =
            if let Some(rest) = trimmed.strip_prefix('#') {
                (MountSelector::Id, rest)
            } else if let Some(rest) = trimmed.strip_prefix('.') {
                (MountSelector::Class, rest)
            } else {
                (MountSelector::Tag, trimmed)
            };
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(DomError::InvalidSelector(trimmed.to_string()));
        }
        Ok(kind(name.to_string()))
    }
}

impl std::fmt::Display for MountSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MountSelector::Id(id) => write!(f, "#{id}"),
            MountSelector::Class(class) => write!(f, ".{class}"),
            MountSelector::Tag(tag) => f.write_str(tag),
        }
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn class(self, value: &str) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, element: Element) -> Self {
        self.append(element);
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(Node::Text(value.into()));
        self
    }

    pub fn append(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
    }

    #[cfg(test)]
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    #[cfg(test)]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    pub fn matches(&self, selector: &MountSelector) -> bool {
        match selector {
            MountSelector::Id(id) => self.get_attr("id") == Some(id.as_str()),
            MountSelector::Class(class) => self.has_class(class),
            MountSelector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
        }
    }

    /// First match in document order, including `self`.
    #[cfg(test)]
    pub fn find(&self, selector: &MountSelector) -> Option<&Element> {
        if self.matches(selector) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(selector))
    }

    pub fn find_mut(&mut self, selector: &MountSelector) -> Option<&mut Element> {
        if self.matches(selector) {
            return Some(self);
        }
        for node in &mut self.children {
            if let Node::Element(child) = node {
                if let Some(found) = child.find_mut(selector) {
                    return Some(found);
                }
            }
        }
        None
    }

    #[cfg(test)]
    pub fn count(&self, selector: &MountSelector) -> usize {
        let own = usize::from(self.matches(selector));
        own + self
            .child_elements()
            .map(|child| child.count(selector))
            .sum::<usize>()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for node in &self.children {
            match node {
                Node::Element(child) => child.write_html(out),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    #[cfg(test)]
    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Element(child) => child.collect_text(out),
                Node::Text(text) => out.push_str(text),
            }
        }
    }
}

/// Owned, mutable page tree rooted at `<html>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Minimal page with an empty `.rail` aside to mount into.
    pub fn shell(title: &str) -> Self {
        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "utf-8"))
            .child(Element::new("title").text(title));
        let body = Element::new("body")
            .child(Element::new("main"))
            .child(Element::new("aside").class("rail"));
        Self {
            root: Element::new("html").child(head).child(body),
        }
    }

    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        Self {
            root: import(parsed.root_element()),
        }
    }

    #[cfg(test)]
    pub fn find(&self, selector: &MountSelector) -> Option<&Element> {
        self.root.find(selector)
    }

    pub fn mount(&mut self, selector: &MountSelector, element: Element) -> Result<(), DomError> {
        let target = self
            .root
            .find_mut(selector)
            .ok_or_else(|| DomError::MountNotFound(selector.to_string()))?;
        target.append(element);
        Ok(())
    }

    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>{}", self.root.to_html())
    }
}

fn import(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut out = Element::new(value.name());
    for (name, attr) in value.attrs() {
        out.attrs.push((name.to_string(), attr.to_string()));
    }
    for child in element.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    out.append(import(child));
                }
            }
            scraper::Node::Text(text) => {
                let content: &str = text;
                out.children.push(Node::Text(content.to_string()));
            }
            _ => {}
        }
    }
    out
}
