//! Owned element tree of one project file
//!
//! Tags and attribute names use the qualified `{namespace}Local` form so the
//! namespace of every element survives parsing and can be checked later.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SurveyError};

/// A single XML element of a project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Qualified tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Direct child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// All elements below this one, depth first, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (qualified_name(attr.namespace(), attr.name()), attr.value().to_string()))
            .collect();

        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Element::from_node)
            .collect();

        let name = node.tag_name();
        Self {
            tag: qualified_name(name.namespace(), name.name()),
            attributes,
            children,
        }
    }
}

/// Depth-first iterator over the descendants of an [`Element`]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

fn qualified_name(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(ns) => format!("{{{}}}{}", ns, local),
        None => local.to_string(),
    }
}

/// Parsed tree of one project file
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    path: PathBuf,
    root: Element,
}

impl ProjectDocument {
    /// Read and parse a project file
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| SurveyError::Parse {
            file: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let text = String::from_utf8(bytes).map_err(|e| SurveyError::Parse {
            file: path.to_path_buf(),
            details: format!("not valid UTF-8: {}", e.utf8_error()),
        })?;

        Self::parse(path, &text)
    }

    /// Parse project XML that was read from `path`
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let doc = roxmltree::Document::parse(text).map_err(|e| SurveyError::Parse {
            file: path.to_path_buf(),
            details: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            root: Element::from_node(doc.root_element()),
        })
    }

    pub fn from_root(path: impl Into<PathBuf>, root: Element) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}
