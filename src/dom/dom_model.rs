use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

// ============================================================================
// Page snapshot: the serialized form a page is loaded from and written back to
// ============================================================================

/// A serialized page: URL, title, and the `<body>` node tree.
///
/// Produced by a DOM dump of a live page. Element nodes carry their markup
/// attributes plus optional live control state (`value`, `checked`,
/// `selected`) that overrides what the attributes imply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub body: NodeSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSnapshot {
    Text { text: String },
    Element(ElementSnapshot),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
    /// Bounding box in document coordinates. Absent means "no layout info".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Index of the selected option (selects only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

// ============================================================================
// In-memory document
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

/// Live state of a form control. Only meaningful for input, select, textarea.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState {
    pub value: String,
    pub checked: bool,
    pub selected_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub rect: Option<Rect>,
    pub state: ControlState,
}

const INPUT_TYPES: &[&str] = &[
    "text",
    "search",
    "email",
    "url",
    "tel",
    "password",
    "number",
    "range",
    "date",
    "month",
    "week",
    "time",
    "datetime-local",
    "color",
    "checkbox",
    "radio",
    "file",
    "hidden",
    "submit",
    "reset",
    "button",
    "image",
];

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.non_empty_attr("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.non_empty_attr("name")
    }

    pub fn class_name(&self) -> Option<&str> {
        self.non_empty_attr("class")
    }

    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// The control's native type as a browser reports it: inputs normalize
    /// unknown types to `text`, selects report `select-one`/`select-multiple`.
    pub fn control_type(&self) -> String {
        match self.tag.as_str() {
            "input" => {
                let raw = self.attr("type").unwrap_or("").trim().to_lowercase();
                if INPUT_TYPES.contains(&raw.as_str()) {
                    raw
                } else {
                    "text".to_string()
                }
            }
            "select" if self.has_attr("multiple") => "select-multiple".to_string(),
            "select" => "select-one".to_string(),
            "textarea" => "textarea".to_string(),
            other => other.to_string(),
        }
    }

    /// True when an inline `style` attribute sets `display: none`.
    pub fn has_display_none(&self) -> bool {
        self.attr("style")
            .unwrap_or("")
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .any(|(prop, value)| {
                prop.trim().eq_ignore_ascii_case("display")
                    && value.trim().eq_ignore_ascii_case("none")
            })
    }
}

// ============================================================================
// Synthetic events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowDown,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Focus,
    Blur,
    Input,
    Change,
    Click,
    KeyDown { key: Key },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: NodeId,
    #[serde(flatten)]
    pub kind: EventKind,
    pub bubbles: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomError {
    UnknownNode(NodeId),
    NotAnElement(NodeId),
    OptionOutOfRange { index: usize, len: usize },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::UnknownNode(id) => write!(f, "node {} is not in the document", id.0),
            DomError::NotAnElement(id) => write!(f, "node {} is not an element", id.0),
            DomError::OptionOutOfRange { index, len } => {
                write!(f, "option index {} out of range ({} options)", index, len)
            }
        }
    }
}

impl std::error::Error for DomError {}

/// A document shared between the extractor and its deferred tasks.
pub type SharedDocument = Arc<Mutex<Document>>;

/// A page document: node arena, live control state, focus, and the log of
/// events dispatched into it.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    title: String,
    nodes: Vec<Node>,
    root: NodeId,
    focused: Option<NodeId>,
    events: Vec<DomEvent>,
    generation: u64,
}

impl Document {
    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        let mut doc = Document {
            url: snapshot.url,
            title: snapshot.title,
            nodes: Vec::new(),
            root: NodeId(0),
            focused: None,
            events: Vec::new(),
            generation: 0,
        };
        doc.root = doc.insert(snapshot.body, None);
        doc
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Swap in a freshly loaded page. Node ids from the old page become
    /// meaningless, so the generation counter moves on.
    pub fn replace(&mut self, mut other: Document) {
        other.generation = self.generation + 1;
        *self = other;
    }

    fn insert(&mut self, snapshot: NodeSnapshot, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());

        match snapshot {
            NodeSnapshot::Text { text } => {
                self.nodes.push(Node {
                    parent,
                    children: Vec::new(),
                    data: NodeData::Text(text),
                });
            }
            NodeSnapshot::Element(el) => {
                self.nodes.push(Node {
                    parent,
                    children: Vec::new(),
                    data: NodeData::Element(Element {
                        tag: el.tag.to_lowercase(),
                        attrs: el.attrs,
                        rect: el.rect,
                        state: ControlState::default(),
                    }),
                });

                let children: Vec<NodeId> = el
                    .children
                    .into_iter()
                    .map(|child| self.insert(child, Some(id)))
                    .collect();
                self.nodes[id.0].children = children;

                let state = self.initial_state(id, el.value, el.checked, el.selected);
                if let NodeData::Element(element) = &mut self.nodes[id.0].data {
                    element.state = state;
                }
            }
        }

        id
    }

    fn initial_state(
        &self,
        id: NodeId,
        value: Option<String>,
        checked: Option<bool>,
        selected: Option<usize>,
    ) -> ControlState {
        let Some(el) = self.element(id) else {
            return ControlState::default();
        };

        match el.tag.as_str() {
            "input" => {
                let checkable = matches!(el.control_type().as_str(), "checkbox" | "radio");
                let default_value = match el.attr("value") {
                    Some(v) => v.to_string(),
                    None if checkable => "on".to_string(),
                    None => String::new(),
                };
                ControlState {
                    value: value.unwrap_or(default_value),
                    checked: checked.unwrap_or_else(|| el.has_attr("checked")),
                    selected_index: None,
                }
            }
            "textarea" => ControlState {
                value: value.unwrap_or_else(|| self.text_content(id)),
                checked: false,
                selected_index: None,
            },
            "select" => {
                let options = self.select_options(id);
                let from_markup = options
                    .iter()
                    .position(|opt| self.element(*opt).is_some_and(|o| o.has_attr("selected")));
                let selected_index = selected
                    .filter(|i| *i < options.len())
                    .or(from_markup)
                    .or(if options.is_empty() { None } else { Some(0) });
                ControlState {
                    value: String::new(),
                    checked: false,
                    selected_index,
                }
            }
            _ => ControlState::default(),
        }
    }

    /// Write the document back out, carrying live control state.
    pub fn to_snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            url: self.url.clone(),
            title: self.title.clone(),
            body: self.snapshot_node(self.root),
        }
    }

    fn snapshot_node(&self, id: NodeId) -> NodeSnapshot {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Text(text) => NodeSnapshot::Text { text: text.clone() },
            NodeData::Element(el) => {
                let control_type = el.control_type();
                let checkable = matches!(control_type.as_str(), "checkbox" | "radio");
                NodeSnapshot::Element(ElementSnapshot {
                    tag: el.tag.clone(),
                    attrs: el.attrs.clone(),
                    children: node.children.iter().map(|c| self.snapshot_node(*c)).collect(),
                    rect: el.rect,
                    value: match el.tag.as_str() {
                        "input" | "textarea" => Some(el.state.value.clone()),
                        _ => None,
                    },
                    checked: (el.is("input") && checkable).then_some(el.state.checked),
                    selected: if el.is("select") {
                        el.state.selected_index
                    } else {
                        None
                    },
                })
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.nodes.get_mut(id.0) {
            Some(Node {
                data: NodeData::Element(el),
                ..
            }) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.state.value = value.to_string();
        Ok(())
    }

    /// Set a checkbox/radio checked state. Checking a radio unchecks the
    /// other radios sharing its name within the same form.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        el.state.checked = checked;

        let is_radio = el.is("input") && el.control_type() == "radio";
        let group = el.name().map(str::to_string);
        if !(checked && is_radio) {
            return Ok(());
        }
        let Some(group) = group else {
            return Ok(());
        };

        let owner = self.closest(id, "form");
        let peers: Vec<NodeId> = self
            .elements_by_tag("input")
            .into_iter()
            .filter(|peer| *peer != id)
            .filter(|peer| {
                self.element(*peer).is_some_and(|p| {
                    p.control_type() == "radio" && p.name() == Some(group.as_str())
                })
            })
            .filter(|peer| self.closest(*peer, "form") == owner)
            .collect();

        for peer in peers {
            self.element_mut(peer)?.state.checked = false;
        }
        Ok(())
    }

    pub fn set_selected_index(&mut self, id: NodeId, index: usize) -> Result<(), DomError> {
        let len = self.select_options(id).len();
        if index >= len {
            return Err(DomError::OptionOutOfRange { index, len });
        }
        self.element_mut(id)?.state.selected_index = Some(index);
        Ok(())
    }

    pub fn focus(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element_mut(id)?;
        self.focused = Some(id);
        Ok(())
    }

    /// Dispatch a synthetic, bubbling event at an element.
    pub fn dispatch(&mut self, id: NodeId, kind: EventKind) -> Result<(), DomError> {
        self.element_mut(id)?;
        self.events.push(DomEvent {
            target: id,
            kind,
            bubbles: true,
        });
        Ok(())
    }
}
