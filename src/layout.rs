//! Layout Host - resize notifications from taffy layout passes.
//!
//! Elements are nodes in a shared [`TaffyTree`]. Their offset size is the
//! border box from the last computed layout. Every [`LayoutHost::compute`]
//! runs taffy and then notifies observations whose node changed size since
//! the last size they were given. A new observation always hears about the
//! first layout after it starts, the same way a browser reports the initial
//! size of a newly observed element. Nodes live as long as the host.
//!
//! ```text
//! set_style / add nodes → compute() → taffy → changed border boxes → callbacks
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use taffy::{AvailableSpace, NodeId, Size, Style, TaffyError, TaffyTree};
use thiserror::Error;

use crate::element::MeasuredElement;
use crate::observer::{ObserveError, ResizeCallback, ResizeEntry, ResizeHost, Subscription};
use crate::registry::{self, Delivery, ObserverRegistry};
use crate::types::{BoxSize, Dimensions, ObserveOptions, ObservedBox};

/// Taffy tree shared between a host and its nodes.
pub type SharedTree = Rc<RefCell<TaffyTree<()>>>;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("taffy layout failed: {0}")]
    Taffy(#[from] TaffyError),

    #[error("node belongs to a different layout host")]
    ForeignNode,
}

// =============================================================================
// Layout Node
// =============================================================================

/// A node of a [`LayoutHost`] tree, usable as a tracked element.
#[derive(Clone)]
pub struct LayoutNode {
    tree: SharedTree,
    id: NodeId,
}

impl LayoutNode {
    /// Taffy id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl PartialEq for LayoutNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.tree, &other.tree)
    }
}

impl fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayoutNode").field(&self.id).finish()
    }
}

impl MeasuredElement for LayoutNode {
    fn offset_width(&self) -> f64 {
        self.offset_size().width
    }

    fn offset_height(&self) -> f64 {
        self.offset_size().height
    }

    fn offset_size(&self) -> Dimensions {
        border_box(&self.tree.borrow(), self.id).unwrap_or(Dimensions::ZERO)
    }
}

/// Border box of `id` from the last computed layout.
fn border_box(tree: &TaffyTree<()>, id: NodeId) -> Option<Dimensions> {
    let layout = tree.layout(id).ok()?;
    Some(Dimensions::new(
        f64::from(layout.size.width),
        f64::from(layout.size.height),
    ))
}

// =============================================================================
// Layout Host
// =============================================================================

/// Resize host driven by taffy layout computation.
///
/// Clones share the tree and the observations.
#[derive(Clone)]
pub struct LayoutHost {
    tree: SharedTree,
    registry: Rc<RefCell<ObserverRegistry<LayoutNode>>>,
}

impl LayoutHost {
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(TaffyTree::new())),
            registry: Rc::new(RefCell::new(ObserverRegistry::new())),
        }
    }

    /// Create a leaf node.
    pub fn node(&self, style: Style) -> Result<LayoutNode, LayoutError> {
        let id = self.tree.borrow_mut().new_leaf(style)?;
        Ok(self.wrap(id))
    }

    /// Create a node with children.
    pub fn node_with_children(
        &self,
        style: Style,
        children: &[LayoutNode],
    ) -> Result<LayoutNode, LayoutError> {
        let ids = children
            .iter()
            .map(|child| self.own(child))
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.tree.borrow_mut().new_with_children(style, &ids)?;
        Ok(self.wrap(id))
    }

    /// Replace a node's style. Takes effect on the next [`compute`](Self::compute).
    pub fn set_style(&self, node: &LayoutNode, style: Style) -> Result<(), LayoutError> {
        let id = self.own(node)?;
        self.tree.borrow_mut().set_style(id, style)?;
        Ok(())
    }

    /// Compute layout from `root` and notify observers of resized nodes.
    ///
    /// Returns the number of observations notified.
    pub fn compute(
        &self,
        root: &LayoutNode,
        available: Size<AvailableSpace>,
    ) -> Result<usize, LayoutError> {
        let root = self.own(root)?;
        self.tree.borrow_mut().compute_layout(root, available)?;

        // Collect first, dispatch after the borrows are gone
        let deliveries: Vec<Delivery<LayoutNode>> = {
            let tree = self.tree.borrow();
            let mut registry = self.registry.borrow_mut();
            let changed: Vec<Delivery<LayoutNode>> = registry
                .registrations_mut()
                .filter_map(|registration| {
                    let size = border_box(&tree, registration.target.id)?;
                    if registration.last_reported == Some(size) {
                        return None;
                    }
                    registration.last_reported = Some(size);
                    Some(Delivery {
                        id: registration.id,
                        callback: registration.callback.clone(),
                        batch: vec![ResizeEntry::new(
                            registration.target.clone(),
                            BoxSize::new(size.width, size.height),
                        )],
                    })
                })
                .collect();
            changed
        };

        tracing::debug!(resized = deliveries.len(), "layout computed");
        Ok(registry::dispatch(&self.registry, deliveries))
    }

    /// Observations currently live.
    pub fn active_count(&self) -> usize {
        self.registry.borrow().active_count()
    }

    fn wrap(&self, id: NodeId) -> LayoutNode {
        LayoutNode {
            tree: self.tree.clone(),
            id,
        }
    }

    fn own(&self, node: &LayoutNode) -> Result<NodeId, LayoutError> {
        if Rc::ptr_eq(&node.tree, &self.tree) {
            Ok(node.id)
        } else {
            Err(LayoutError::ForeignNode)
        }
    }
}

impl Default for LayoutHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeHost<LayoutNode> for LayoutHost {
    fn observe(
        &self,
        target: &LayoutNode,
        options: ObserveOptions,
        callback: ResizeCallback<LayoutNode>,
    ) -> Result<Subscription, ObserveError> {
        // Taffy reports border boxes
        if options.box_model != ObservedBox::BorderBox {
            return Err(ObserveError::Unsupported(options.box_model));
        }
        if self.own(target).is_err() {
            return Err(ObserveError::Detached);
        }

        Ok(registry::register(&self.registry, target.clone(), callback))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::track;
    use std::cell::Cell;
    use taffy::prelude::length;

    fn sized(width: f32, height: f32) -> Style {
        Style {
            size: Size {
                width: length(width),
                height: length(height),
            },
            ..Default::default()
        }
    }

    fn counting_callback(count: &Rc<Cell<usize>>) -> ResizeCallback<LayoutNode> {
        let count = count.clone();
        Box::new(move |_| count.set(count.get() + 1))
    }

    #[test]
    fn test_offset_size_before_layout_is_zero() {
        let host = LayoutHost::new();
        let node = host.node(sized(10.0, 10.0)).unwrap();
        assert_eq!(node.offset_size(), Dimensions::ZERO);
    }

    #[test]
    fn test_compute_reports_initial_size_once() {
        let host = LayoutHost::new();
        let child = host.node(sized(50.0, 20.0)).unwrap();
        let root = host.node_with_children(sized(200.0, 100.0), &[child.clone()]).unwrap();
        let count = Rc::new(Cell::new(0));

        let _sub = host
            .observe(&child, ObserveOptions::border_box(), counting_callback(&count))
            .unwrap();

        assert_eq!(host.compute(&root, Size::max_content()).unwrap(), 1);
        assert_eq!(host.compute(&root, Size::max_content()).unwrap(), 0);
        assert_eq!(count.get(), 1);
        assert_eq!(child.offset_size(), Dimensions::new(50.0, 20.0));
    }

    #[test]
    fn test_style_change_reaches_tracker() {
        let host = LayoutHost::new();
        let child = host.node(sized(50.0, 20.0)).unwrap();
        let root = host.node_with_children(sized(200.0, 100.0), &[child.clone()]).unwrap();

        let size = track(child.clone(), host.clone());
        assert_eq!(size.dimensions(), Some(Dimensions::ZERO));

        host.compute(&root, Size::max_content()).unwrap();
        assert_eq!(size.dimensions(), Some(Dimensions::new(50.0, 20.0)));

        host.set_style(&child, sized(80.0, 30.0)).unwrap();
        host.compute(&root, Size::max_content()).unwrap();
        assert_eq!(size.width(), 80.0);
        assert_eq!(size.height(), 30.0);
    }

    #[test]
    fn test_observe_rejects_other_box_models() {
        let host = LayoutHost::new();
        let node = host.node(sized(1.0, 1.0)).unwrap();
        let count = Rc::new(Cell::new(0));

        let result = host.observe(&node, ObserveOptions::default(), counting_callback(&count));
        assert_eq!(result.err(), Some(ObserveError::Unsupported(ObservedBox::ContentBox)));
    }

    #[test]
    fn test_observe_foreign_node_is_detached() {
        let host = LayoutHost::new();
        let other = LayoutHost::new();
        let node = other.node(sized(1.0, 1.0)).unwrap();
        let count = Rc::new(Cell::new(0));

        let result = host.observe(&node, ObserveOptions::border_box(), counting_callback(&count));
        assert_eq!(result.err(), Some(ObserveError::Detached));
        assert!(matches!(host.set_style(&node, Style::default()), Err(LayoutError::ForeignNode)));
    }

    #[test]
    fn test_released_observation_not_notified() {
        let host = LayoutHost::new();
        let child = host.node(sized(50.0, 20.0)).unwrap();
        let root = host.node_with_children(sized(200.0, 100.0), &[child.clone()]).unwrap();
        let count = Rc::new(Cell::new(0));

        let sub = host
            .observe(&child, ObserveOptions::border_box(), counting_callback(&count))
            .unwrap();
        drop(sub);

        assert_eq!(host.compute(&root, Size::max_content()).unwrap(), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(host.active_count(), 0);
    }
}
