//! Node model for the design surface.
//!
//! A design is a tree of frame, text and image nodes, but the tree is never
//! stored as one: each node carries a non-owning `parent_id` back-reference
//! and an integer `layer` (its depth), and the `SceneStore` keeps all nodes
//! in one flat ordered list. Position in that list is both z-order and
//! grouping (a subtree occupies a contiguous run).
//!
//! Absolutely positioned nodes are described by four insets to their
//! container rather than by x/y/width/height, so dragging opposite edges
//! scales symmetrically.

use crate::error::{SceneError, SceneResult};
use crate::id::NodeId;
use serde::{Deserialize, Serialize};

// ─── Points & Boxes ──────────────────────────────────────────────────────

/// A 2D point. Screen space or canvas space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box given by its four edges, with cached extents.
///
/// This is the shape the rendering layer reports for every node
/// (`screen_box`), and the shape the clipboard captures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenBox {
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Normalized box spanning two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_edges(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &ScreenBox) -> ScreenBox {
        Self::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Translate every edge by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> ScreenBox {
        Self::from_edges(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

/// Distances from each edge of a node to the matching edge of its container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Pure translation: width and height stay the same.
    pub fn translate(&self, dx: f32, dy: f32) -> Insets {
        Insets {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right - dx,
            bottom: self.bottom - dy,
        }
    }

    /// Subtract `amount` from every side.
    pub fn shrink(&self, amount: f32) -> Insets {
        Insets {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right - amount,
            bottom: self.bottom - amount,
        }
    }

    /// Insets of `inner` measured from `container`, in canvas units.
    ///
    /// Both boxes are in screen space; the distances are divided by `zoom`.
    pub fn between(inner: &ScreenBox, container: &ScreenBox, zoom: f32) -> Insets {
        Insets {
            left: (inner.left - container.left) / zoom,
            top: (inner.top - container.top) / zoom,
            right: (container.right - inner.right) / zoom,
            bottom: (container.bottom - inner.bottom) / zoom,
        }
    }

    /// Inverse of [`Insets::between`]: place these insets inside `container`.
    pub fn resolve_in(&self, container: &ScreenBox, zoom: f32) -> ScreenBox {
        ScreenBox::from_edges(
            container.left + self.left * zoom,
            container.top + self.top * zoom,
            container.right - self.right * zoom,
            container.bottom - self.bottom * zoom,
        )
    }

    pub fn approx_eq(&self, other: &Insets, tolerance: f32) -> bool {
        (self.left - other.left).abs() <= tolerance
            && (self.top - other.top).abs() <= tolerance
            && (self.right - other.right).abs() <= tolerance
            && (self.bottom - other.bottom).abs() <= tolerance
    }
}

// ─── Sizing & Positioning ────────────────────────────────────────────────

/// How a node is placed in its container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Position {
    /// Placed by the container's layout; no geometry of its own.
    #[default]
    Relative,
    /// Pinned by four insets to the container.
    Absolute(Insets),
}

impl Position {
    pub fn insets(&self) -> Option<Insets> {
        match self {
            Position::Absolute(insets) => Some(*insets),
            Position::Relative => None,
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Position::Absolute(_))
    }
}

/// A width or height: a concrete size, or left to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Length {
    #[default]
    Auto,
    Px(f32),
}

impl Length {
    pub fn is_fixed(&self) -> bool {
        matches!(self, Length::Px(_))
    }
}

// ─── Frame layout descriptors ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowMode {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Overflow {
    pub x: OverflowMode,
    pub y: OverflowMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Block,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

/// Flex-like arrangement of a frame's relative children.
///
/// The core never lays children out itself: it only reads back the boxes
/// the renderer produced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Display {
    pub mode: DisplayMode,
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub wrap: bool,
    pub gap: f32,
    pub margin: Insets,
    pub padding: Insets,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// The closed set of node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Frame,
    Text,
    Image,
}

impl NodeType {
    /// Capitalized name, also the default display name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Frame => "Frame",
            NodeType::Text => "Text",
            NodeType::Image => "Image",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            NodeType::Frame => "frame",
            NodeType::Text => "text",
            NodeType::Image => "image",
        }
    }
}

/// Type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Frame {
        overflow: Overflow,
        display: Option<Display>,
    },
    Text {
        text: String,
    },
    Image {
        src: String,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Frame { .. } => NodeType::Frame,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Image { .. } => NodeType::Image,
        }
    }
}

/// One visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Immutable identity.
    pub id: NodeId,

    pub kind: NodeKind,

    /// Containing node, or `None` at the canvas root. A back-reference only.
    pub parent_id: Option<NodeId>,

    /// Tree depth; always `parent.layer + 1` for non-root nodes.
    pub layer: u32,

    pub position: Position,
    pub width: Length,
    pub height: Length,

    /// User-editable label.
    pub display_name: String,
}

impl Node {
    pub fn builder(node_type: NodeType) -> NodeBuilder {
        NodeBuilder::new(node_type)
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, NodeKind::Frame { .. })
    }

    pub fn insets(&self) -> Option<Insets> {
        self.position.insets()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Builder that default-fills optional fields and validates the result.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node_type: NodeType,
    id: Option<NodeId>,
    parent: Option<(NodeId, u32)>,
    position: Position,
    width: Length,
    height: Length,
    display_name: Option<String>,
    text: Option<String>,
    src: Option<String>,
    overflow: Overflow,
    display: Option<Display>,
}

impl NodeBuilder {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            id: None,
            parent: None,
            position: Position::Relative,
            width: Length::Auto,
            height: Length::Auto,
            display_name: None,
            text: None,
            src: None,
            overflow: Overflow::default(),
            display: None,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(NodeId::intern(id));
        self
    }

    pub fn node_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Nest under `parent`, whose own layer is `parent_layer`.
    pub fn parent(mut self, parent: NodeId, parent_layer: u32) -> Self {
        self.parent = Some((parent, parent_layer));
        self
    }

    pub fn absolute(mut self, insets: Insets) -> Self {
        self.position = Position::Absolute(insets);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Content for text nodes; ignored for other types.
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Source for image nodes; ignored for other types.
    pub fn src(mut self, src: &str) -> Self {
        self.src = Some(src.to_string());
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    /// Validate and produce the node.
    ///
    /// # Errors
    /// `InvalidConfig` when an absolutely positioned node also declares both
    /// a concrete width and a concrete height: its size comes from its insets.
    pub fn build(self) -> SceneResult<Node> {
        if self.position.is_absolute() && self.width.is_fixed() && self.height.is_fixed() {
            return Err(SceneError::InvalidConfig(format!(
                "absolute {} cannot also fix both width and height",
                self.node_type.name()
            )));
        }

        let kind = match self.node_type {
            NodeType::Frame => NodeKind::Frame {
                overflow: self.overflow,
                display: self.display,
            },
            NodeType::Text => NodeKind::Text {
                text: self.text.unwrap_or_default(),
            },
            NodeType::Image => NodeKind::Image {
                src: self.src.unwrap_or_default(),
            },
        };

        let (parent_id, layer) = match self.parent {
            Some((parent, parent_layer)) => (Some(parent), parent_layer + 1),
            None => (None, 0),
        };

        Ok(Node {
            id: self
                .id
                .unwrap_or_else(|| NodeId::with_prefix(self.node_type.id_prefix())),
            kind,
            parent_id,
            layer,
            position: self.position,
            width: self.width,
            height: self.height,
            display_name: self
                .display_name
                .unwrap_or_else(|| self.node_type.name().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_filled() {
        let node = Node::builder(NodeType::Text).build().unwrap();
        assert_eq!(node.display_name, "Text");
        assert!(node.id.as_str().starts_with("text_"));
        assert_eq!(node.layer, 0);
        assert_eq!(node.position, Position::Relative);
        assert_eq!(node.kind, NodeKind::Text { text: String::new() });
    }

    #[test]
    fn parent_sets_layer() {
        let frame = Node::builder(NodeType::Frame).id("outer").build().unwrap();
        let child = Node::builder(NodeType::Image)
            .id("logo")
            .parent(frame.id, frame.layer)
            .src("logo.png")
            .build()
            .unwrap();
        assert_eq!(child.parent_id, Some(frame.id));
        assert_eq!(child.layer, 1);
        assert_eq!(
            child.kind,
            NodeKind::Image {
                src: "logo.png".into()
            }
        );
    }

    #[test]
    fn absolute_with_fixed_size_is_rejected() {
        let result = Node::builder(NodeType::Frame)
            .absolute(Insets::new(10.0, 10.0, 10.0, 10.0))
            .width(Length::Px(100.0))
            .height(Length::Px(50.0))
            .build();
        assert!(matches!(result, Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn absolute_with_one_fixed_axis_is_allowed() {
        let result = Node::builder(NodeType::Frame)
            .absolute(Insets::new(10.0, 10.0, 10.0, 10.0))
            .width(Length::Px(100.0))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn insets_translate_keeps_extent() {
        let insets = Insets::new(10.0, 20.0, 30.0, 40.0);
        let moved = insets.translate(5.0, -5.0);
        assert_eq!(moved, Insets::new(15.0, 15.0, 25.0, 45.0));
        assert_eq!(
            insets.left + insets.right,
            moved.left + moved.right,
            "horizontal extent changed"
        );
    }

    #[test]
    fn insets_between_and_resolve_are_inverse() {
        let container = ScreenBox::from_edges(100.0, 100.0, 500.0, 400.0);
        let inner = ScreenBox::from_edges(120.0, 150.0, 300.0, 380.0);
        let insets = Insets::between(&inner, &container, 2.0);
        assert_eq!(insets, Insets::new(10.0, 25.0, 100.0, 10.0));
        assert_eq!(insets.resolve_in(&container, 2.0), inner);
    }

    #[test]
    fn corners_are_normalized() {
        let b = ScreenBox::from_corners(Point::new(50.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(b, ScreenBox::from_edges(10.0, 10.0, 50.0, 40.0));
        assert_eq!(b.width, 40.0);
        assert_eq!(b.height, 30.0);
    }
}
