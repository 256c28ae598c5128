//! Collapsible sections for generated documentation pages.
//!
//! A section is a `<div>`; a button anywhere inside it toggles the section
//! between [`Visibility::Collapsed`] and [`Visibility::Expanded`]. The
//! toggle state lives in one place, the [`Collapser`], and every class or
//! label shown on the page is derived from it.

use std::{collections::BTreeMap, fmt};

use thiserror::Error;

/// Label of a button whose section is collapsed (up arrow).
pub const HIDE_ARROW: &str = "&#x25B2;";
/// Label of a button whose section is expanded (down arrow).
pub const RESET_ARROW: &str = "&#x25BC;";
pub const VISIBLE_CLASS: &str = "visible";
pub const PRESSED_CLASS: &str = "pressed";

pub type Result<T> = std::result::Result<T, CollapseError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollapseError {
    #[error("No such node: {0}")]
    UnknownNode(NodeId),
    #[error("No element with id: {0}")]
    UnknownElement(String),
    #[error("Node {0} is not a div")]
    NotADiv(NodeId),
    #[error("Node {0} is not inside any div")]
    NoEnclosingDiv(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Div,
    Button,
    Paragraph,
}

impl Tag {
    fn name(&self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Button => "button",
            Tag::Paragraph => "p",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Expanded,
    Collapsed,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Expanded => Visibility::Collapsed,
            Visibility::Collapsed => Visibility::Expanded,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Visibility::Expanded => RESET_ARROW,
            Visibility::Collapsed => HIDE_ARROW,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: Tag,
    element_id: Option<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A minimal element tree.
#[derive(Debug, Clone, Default)]
pub struct Page {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent`, or as a new root.
    pub fn add(&mut self, parent: Option<NodeId>, tag: Tag) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(Node {
            tag,
            element_id: None,
            text: String::new(),
            parent,
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn set_element_id(&mut self, node: NodeId, id: &str) -> Result<()> {
        self.node_mut(node)?.element_id = Some(id.to_owned());
        Ok(())
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.node_mut(node)?.text = text.to_owned();
        Ok(())
    }

    pub fn find(&self, element_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.element_id.as_deref() == Some(element_id))
            .map(NodeId)
    }

    pub fn tag(&self, node: NodeId) -> Result<Tag> {
        Ok(self.node(node)?.tag)
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(node)?.children)
    }

    /// Closest strict ancestor of `node` that is a div.
    pub fn nearest_div(&self, node: NodeId) -> Result<NodeId> {
        let mut current = self.node(node)?.parent;
        while let Some(ancestor) = current {
            let ancestor_node = self.node(ancestor)?;
            if ancestor_node.tag == Tag::Div {
                return Ok(ancestor);
            }
            current = ancestor_node.parent;
        }
        Err(CollapseError::NoEnclosingDiv(node))
    }

    fn node(&self, node: NodeId) -> Result<&Node> {
        self.nodes
            .get(node.0)
            .ok_or(CollapseError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(node.0)
            .ok_or(CollapseError::UnknownNode(node))
    }
}

/// Owns a [`Page`] and the visibility of each of its sections.
///
/// Sections start collapsed.
#[derive(Debug, Clone)]
pub struct Collapser {
    page: Page,
    sections: BTreeMap<NodeId, Visibility>,
}

impl Collapser {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            sections: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn visibility(&self, section: NodeId) -> Visibility {
        self.sections
            .get(&section)
            .copied()
            .unwrap_or(Visibility::Collapsed)
    }

    /// Flip the section `section` and return its new visibility.
    pub fn toggle(&mut self, section: NodeId) -> Result<Visibility> {
        if self.page.tag(section)? != Tag::Div {
            return Err(CollapseError::NotADiv(section));
        }
        let visibility = self.visibility(section).toggled();
        self.sections.insert(section, visibility);
        log::debug!("section {} is now {:?}", section, visibility);
        Ok(visibility)
    }

    /// [`toggle`](Self::toggle) addressed by the section's element id.
    pub fn toggle_id(&mut self, element_id: &str) -> Result<Visibility> {
        let section = self.page.find(element_id).ok_or_else(|| {
            CollapseError::UnknownElement(element_id.to_owned())
        })?;
        self.toggle(section)
    }

    /// A click on `button`: toggles the div enclosing it.
    pub fn press(&mut self, button: NodeId) -> Result<Visibility> {
        let section = self.page.nearest_div(button)?;
        self.toggle(section)
    }

    pub fn label(&self, button: NodeId) -> Result<&'static str> {
        let section = self.page.nearest_div(button)?;
        Ok(self.visibility(section).arrow())
    }

    /// Whether `node` is hidden by a collapsed ancestor. Buttons stay
    /// visible in their own section so it can be reopened.
    pub fn is_hidden(&self, node: NodeId) -> Result<bool> {
        let mut current = node;
        while let Some(parent) = self.page.parent(current)? {
            if self.page.tag(parent)? == Tag::Div
                && self.visibility(parent) == Visibility::Collapsed
                && self.page.tag(current)? != Tag::Button
            {
                return Ok(true);
            }
            current = parent;
        }
        Ok(false)
    }

    pub fn class(&self, node: NodeId) -> Result<Option<&'static str>> {
        match self.page.tag(node)? {
            Tag::Button => {
                let expanded = self.label(node).ok() == Some(RESET_ARROW);
                Ok(expanded.then_some(PRESSED_CLASS))
            }
            _ => Ok((!self.is_hidden(node)?).then_some(VISIBLE_CLASS)),
        }
    }

    pub fn to_html(&self) -> Result<String> {
        let mut html = String::new();
        for root in &self.page.roots {
            self.render(*root, 0, &mut html)?;
        }
        Ok(html)
    }

    fn render(
        &self,
        node: NodeId,
        depth: usize,
        html: &mut String,
    ) -> Result<()> {
        let element = self.page.node(node)?;
        let indent = "  ".repeat(depth);
        let mut attributes = String::new();
        if let Some(id) = &element.element_id {
            attributes.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if let Some(class) = self.class(node)? {
            attributes.push_str(&format!(" class=\"{}\"", class));
        }

        let tag = element.tag.name();
        if element.tag == Tag::Button {
            let label = self.label(node).unwrap_or(HIDE_ARROW);
            html.push_str(&format!(
                "{}<{}{}>{}</{}>\n",
                indent, tag, attributes, label, tag
            ));
            return Ok(());
        }

        html.push_str(&format!(
            "{}<{}{}>{}",
            indent,
            tag,
            attributes,
            escape(&element.text)
        ));
        if element.children.is_empty() {
            html.push_str(&format!("</{}>\n", tag));
            return Ok(());
        }
        html.push('\n');
        for child in &element.children {
            self.render(*child, depth + 1, html)?;
        }
        html.push_str(&format!("{}</{}>\n", indent, tag));
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
