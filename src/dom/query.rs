use crate::dom::dom_model::{Document, Element, NodeData, NodeId};

/// Elements a form counts in its `elements` collection.
const LISTED_TAGS: &[&str] = &["button", "fieldset", "input", "object", "output", "select", "textarea"];

impl Document {
    /// All nodes below `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };

        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every element in document order, root first.
    pub fn all_elements(&self) -> Vec<NodeId> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| el.is(tag)))
            .collect()
    }

    /// First element matching the predicate, in document order.
    pub fn find_element<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.all_elements()
            .into_iter()
            .find(|id| self.element(*id).is_some_and(&predicate))
    }

    pub fn element_by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.find_element(|el| el.attr("id") == Some(id_attr))
    }

    /// Concatenated text of all descendant text nodes (like `textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        if let NodeData::Text(text) = &node.data {
            return text.clone();
        }

        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.node(d)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                NodeData::Element(_) => None,
            })
            .collect()
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        self.element(parent).map(|_| parent)
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        let siblings = &self.node(parent)?.children;
        let pos = siblings.iter().position(|s| *s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|s| self.element(*s).is_some())
    }

    /// Nearest inclusive ancestor matching the predicate (like `Element.closest`).
    pub fn closest_matching<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if self.element(node_id).is_some_and(&predicate) {
                return Some(node_id);
            }
            current = self.node(node_id)?.parent;
        }
        None
    }

    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.closest_matching(id, |el| el.is(tag))
    }

    // ------------------------------------------------------------------------
    // Form controls
    // ------------------------------------------------------------------------

    pub fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| el.is("option")))
            .collect()
    }

    /// Displayed option text, trimmed.
    pub fn option_text(&self, option: NodeId) -> String {
        self.text_content(option).trim().to_string()
    }

    /// Option value: the `value` attribute, else the whitespace-collapsed text.
    pub fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|el| el.attr("value")) {
            Some(v) => v.to_string(),
            None => self
                .text_content(option)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Current value as a script would read `element.value`.
    pub fn control_value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        if el.is("select") {
            return el
                .state
                .selected_index
                .and_then(|i| self.select_options(id).get(i).copied())
                .map(|opt| self.option_value(opt))
                .unwrap_or_default();
        }
        el.state.value.clone()
    }

    /// Listed elements of a form, in document order.
    pub fn form_elements(&self, form: NodeId) -> Vec<NodeId> {
        self.descendants(form)
            .into_iter()
            .filter(|id| {
                self.element(*id)
                    .is_some_and(|el| LISTED_TAGS.contains(&el.tag.as_str()))
            })
            .collect()
    }

    /// Whether the element takes up visible space on the page.
    ///
    /// Hidden when it or an ancestor is `hidden` or inline `display:none`,
    /// or when its own box is zero-size or lies entirely offscreen.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(el) = self.element(node_id) {
                if el.has_attr("hidden") || el.has_display_none() {
                    return false;
                }
            }
            current = self.node(node_id).and_then(|n| n.parent);
        }

        match self.element(id).and_then(|el| el.rect) {
            Some(rect) => {
                let zero_size = rect.width <= 0.0 && rect.height <= 0.0;
                let offscreen = rect.x + rect.width <= 0.0 || rect.y + rect.height <= 0.0;
                !zero_size && !offscreen
            }
            None => true,
        }
    }
}
