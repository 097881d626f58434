//! Primitive types - Nodes, component definitions, props and callbacks.
//!
//! A render function returns a list of [`Node`]s. A node is either a
//! [`Leaf`] (exactly one grid cell) or a [`Composite`] (a component
//! definition plus props, expanded by calling its render function).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::context::RenderContext;
use crate::engine::{Key, NodeKind, LEAF_TAG};
use crate::error::Result;
use crate::pipeline::EventContext;
use crate::types::{ActionKind, ActionMask, CellContent, Position, Rect};

// =============================================================================
// Callback Types
// =============================================================================

/// Event callback (Rc for cloning into render output on every pass).
pub type EventCallback = Rc<dyn Fn(&mut EventContext<'_>) -> Result<()>>;

/// Render function of a component definition.
pub type RenderFn = Rc<dyn Fn(&mut RenderContext<'_>) -> Result<Vec<Node>>>;

/// Callback run once after the pass that mounted an instance commits.
pub type MountCallback = Box<dyn FnOnce() -> Result<()>>;

/// An event callback plus the action kinds it accepts.
#[derive(Clone)]
pub struct Handler {
    pub mask: ActionMask,
    pub callback: EventCallback,
}

impl Handler {
    pub fn new<F>(mask: ActionMask, callback: F) -> Self
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        Self {
            mask,
            callback: Rc::new(callback),
        }
    }

    #[inline]
    pub fn accepts(&self, kind: ActionKind) -> bool {
        self.mask.accepts(kind)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("mask", &self.mask).finish_non_exhaustive()
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single immutable prop.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Content(CellContent),
    List(Vec<PropValue>),
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u16> for PropValue {
    fn from(value: u16) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CellContent> for PropValue {
    fn from(value: CellContent) -> Self {
        Self::Content(value)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Props
// =============================================================================

/// Named props of a composite node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<&'static str, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a prop.
    pub fn with(mut self, name: &'static str, value: impl Into<PropValue>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn content(&self, name: &str) -> Option<&CellContent> {
        match self.get(name)? {
            PropValue::Content(v) => Some(v),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[PropValue]> {
        match self.get(name)? {
            PropValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Component definition
// =============================================================================

/// A reusable component: a type tag and a render function.
///
/// The tag is the component's identity. Two definitions with the same tag
/// are treated as the same component type by the reconciler.
///
/// Render functions must be free of side effects other than reading
/// state: same props and state, same tree shape. Writing state or doing
/// I/O from a render function is a caller bug the engine does not detect.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: RenderFn,
}

impl Component {
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut RenderContext<'_>) -> Result<Vec<Node>> + 'static,
    {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Type tag.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Vec<Node>> {
        (self.render)(ctx)
    }

    /// A node instantiating this component with `props`.
    pub fn with(&self, props: Props) -> Composite {
        Composite {
            component: self.clone(),
            props,
            children: Vec::new(),
            key: None,
            offset: Position::default(),
            clip: None,
        }
    }

    /// A node instantiating this component without props.
    pub fn node(&self) -> Composite {
        self.with(Props::new())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A node mapping to exactly one grid cell.
#[derive(Debug, Clone)]
pub struct Leaf {
    /// Cell position, relative to the enclosing composite's offset.
    pub at: Position,
    pub content: CellContent,
    pub key: Option<Key>,
    pub handler: Option<Handler>,
}

impl Leaf {
    pub fn new(at: impl Into<Position>, content: CellContent) -> Self {
        Self {
            at: at.into(),
            content,
            key: None,
            handler: None,
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Handle every click kind.
    pub fn on_click<F>(self, callback: F) -> Self
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.on(ActionMask::ANY_CLICK, callback)
    }

    /// Handle the action kinds in `mask`.
    pub fn on<F>(mut self, mask: ActionMask, callback: F) -> Self
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.handler = Some(Handler::new(mask, callback));
        self
    }
}

/// A component instantiation.
#[derive(Debug, Clone)]
pub struct Composite {
    pub component: Component,
    pub props: Props,
    /// Nodes handed to the component, available as `ctx.children()`.
    pub children: Vec<Node>,
    pub key: Option<Key>,
    /// Added to every position the component renders.
    pub offset: Position,
    /// Area, relative to `offset`, outside which rendered leaves are
    /// dropped. Nested clips intersect.
    pub clip: Option<Rect>,
}

impl Composite {
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn at(mut self, offset: impl Into<Position>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Drop rendered leaves outside `area` (relative to the offset).
    pub fn clip(mut self, area: Rect) -> Self {
        self.clip = Some(area);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = children.into_iter().collect();
        self
    }
}

/// Tree node: leaf or composite.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Leaf),
    Composite(Composite),
}

impl Node {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Node::Leaf(leaf) => leaf.key.as_ref(),
            Node::Composite(c) => c.key.as_ref(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Composite(_) => NodeKind::Composite,
        }
    }

    /// Type tag used for identity.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Leaf(_) => LEAF_TAG,
            Node::Composite(c) => c.component.name(),
        }
    }

    /// Where the node starts, relative to its parent.
    pub fn anchor(&self) -> Position {
        match self {
            Node::Leaf(leaf) => leaf.at,
            Node::Composite(c) => c.offset,
        }
    }

    /// The node without its explicit key.
    pub fn unkeyed(self) -> Self {
        match self {
            Node::Leaf(mut leaf) => {
                leaf.key = None;
                Node::Leaf(leaf)
            }
            Node::Composite(mut c) => {
                c.key = None;
                Node::Composite(c)
            }
        }
    }

    /// Move the node so it starts at `at`.
    pub fn placed(self, at: Position) -> Self {
        match self {
            Node::Leaf(mut leaf) => {
                leaf.at = at;
                Node::Leaf(leaf)
            }
            Node::Composite(mut c) => {
                c.offset = at;
                Node::Composite(c)
            }
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Composite> for Node {
    fn from(composite: Composite) -> Self {
        Node::Composite(composite)
    }
}

// =============================================================================
// Tests
// =============================================================================
