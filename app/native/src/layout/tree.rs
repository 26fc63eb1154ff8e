//! Tree layout: arbitrary grids built by splitting windows.
//!
//! Every window is a leaf of a tree of splits. A split lays its children out side
//! by side (horizontal) or stacked (vertical), each with a weight that sums to one
//! across the split. A new window splits the most recently added one in the
//! engine's add direction:
//!
//! ```text
//! add right:        then add down:
//! ┌─────┬─────┐     ┌─────┬─────┐
//! │     │     │     │     │  2  │
//! │  1  │  2  │     │  1  ├─────┤
//! │     │     │     │     │  3  │
//! └─────┴─────┘     └─────┴─────┘
//! ```
//!
//! Nodes are reference counted, so every update rebuilds only the spine from the
//! root to the changed node and shares the rest with the previous version.
//!
//! Custom actions, prefixed by the engine name:
//! - `<name>.add_node_direction` takes `"left"`, `"right"`, `"up"` or `"down"`

use std::sync::Arc;

use tracing::{debug, warn};

use super::{EngineRef, LayoutEngine, LayoutEngineCustomAction, LayoutEngineId, Placements, WindowPlacement};
use crate::geometry::{Direction, Point, Rect};
use crate::model::{Monitor, WindowList};
use crate::native::{WindowHandle, WindowSize};

/// Smallest share a child may be resized down to.
const MIN_WEIGHT: f64 = 0.05;

/// Distance past an edge at which the neighbouring leaf is looked up.
const EDGE_OFFSET: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Window(WindowHandle),
    Split(Arc<Split>),
}

#[derive(Debug, PartialEq)]
struct Split {
    /// Children side by side when set, stacked otherwise.
    horizontal: bool,
    children: Vec<(f64, Node)>,
}

#[allow(clippy::cast_precision_loss)]
fn equal_split(horizontal: bool, nodes: Vec<Node>) -> Node {
    let weight = 1.0 / nodes.len() as f64;
    Node::Split(Arc::new(Split { horizontal, children: nodes.into_iter().map(|node| (weight, node)).collect() }))
}

const fn inserts_after(direction: Direction) -> bool { matches!(direction, Direction::Right | Direction::Down) }

/// `existing` and `added` in a new split, `added` on the `direction` side.
fn pair(existing: Node, added: Node, direction: Direction) -> Node {
    let nodes = if inserts_after(direction) { vec![existing, added] } else { vec![added, existing] };
    equal_split(direction.is_horizontal(), nodes)
}

/// The side of `rect` that `point` lies towards, split along the diagonals.
fn direction_to_point(rect: &Rect, point: Point) -> Direction {
    let local = rect.to_local(point);
    let diagonal = local.x * rect.height / rect.width;
    let anti_diagonal = rect.height - diagonal;

    match (diagonal >= local.y, anti_diagonal >= local.y) {
        (true, true) => Direction::Up,
        (true, false) => Direction::Right,
        (false, true) => Direction::Left,
        (false, false) => Direction::Down,
    }
}

impl Node {
    /// Child rectangles of a split laid out in `rect`.
    fn children_in(split: &Split, rect: Rect) -> impl Iterator<Item = (Rect, &Node)> + '_ {
        let mut offset: f64 = 0.0;
        split.children.iter().map(move |(weight, node)| {
            let child = if split.horizontal {
                Rect::new(offset.mul_add(rect.width, rect.x), rect.y, weight * rect.width, rect.height)
            } else {
                Rect::new(rect.x, offset.mul_add(rect.height, rect.y), rect.width, weight * rect.height)
            };
            offset += weight;
            (child, node)
        })
    }

    fn contains(&self, window: WindowHandle) -> bool { self.path_to(window).is_some() }

    fn leaves(&self, out: &mut Vec<WindowHandle>) {
        match self {
            Self::Window(window) => out.push(*window),
            Self::Split(split) => split.children.iter().for_each(|(_, child)| child.leaves(out)),
        }
    }

    fn first_leaf(&self) -> WindowHandle {
        match self {
            Self::Window(window) => *window,
            Self::Split(split) => split.children.first().map_or(WindowHandle(0), |(_, child)| child.first_leaf()),
        }
    }

    fn last_leaf(&self) -> WindowHandle {
        match self {
            Self::Window(window) => *window,
            Self::Split(split) => split.children.last().map_or(WindowHandle(0), |(_, child)| child.last_leaf()),
        }
    }

    /// Child indices leading from this node to `window`.
    fn path_to(&self, window: WindowHandle) -> Option<Vec<usize>> {
        match self {
            Self::Window(leaf) => (*leaf == window).then(Vec::new),
            Self::Split(split) => split.children.iter().enumerate().find_map(|(idx, (_, child))| {
                child.path_to(window).map(|mut path| {
                    path.insert(0, idx);
                    path
                })
            }),
        }
    }

    fn layout(&self, rect: Rect, out: &mut Vec<(WindowHandle, Rect)>) {
        match self {
            Self::Window(window) => out.push((*window, rect)),
            Self::Split(split) => Self::children_in(split, rect).for_each(|(child_rect, child)| child.layout(child_rect, out)),
        }
    }

    /// Rectangle of the node at `path` when this node fills `rect`.
    fn rect_at(&self, rect: Rect, path: &[usize]) -> Option<Rect> {
        let Some((idx, rest)) = path.split_first() else {
            return Some(rect);
        };
        let Self::Split(split) = self else {
            return None;
        };
        let (child_rect, child) = Self::children_in(split, rect).nth(*idx)?;
        child.rect_at(child_rect, rest)
    }

    /// The leaf containing `point`, its path and its rectangle.
    fn leaf_at(&self, rect: Rect, point: Point) -> Option<(WindowHandle, Vec<usize>, Rect)> {
        match self {
            Self::Window(window) => rect.contains_point(point).then(|| (*window, Vec::new(), rect)),
            Self::Split(split) => Self::children_in(split, rect).enumerate().find_map(|(idx, (child_rect, child))| {
                if !child_rect.contains_point(point) {
                    return None;
                }
                child.leaf_at(child_rect, point).map(|(window, mut path, leaf_rect)| {
                    path.insert(0, idx);
                    (window, path, leaf_rect)
                })
            }),
        }
    }

    /// Rebuilds the spine along `path`, replacing the node at its end.
    fn replace_at(&self, path: &[usize], replace: impl FnOnce(&Self) -> Self) -> Self {
        let Some((idx, rest)) = path.split_first() else {
            return replace(self);
        };
        let Self::Split(split) = self else {
            return self.clone();
        };

        let mut children = split.children.clone();
        if let Some((_, child)) = children.get_mut(*idx) {
            *child = child.replace_at(rest, replace);
        }
        Self::Split(Arc::new(Split { horizontal: split.horizontal, children }))
    }

    /// This tree without `window`. `None` when nothing is left.
    fn without(&self, window: WindowHandle) -> Option<Self> {
        let path = self.path_to(window)?;
        let Some((idx, parent_path)) = path.split_last() else {
            return None;
        };

        Some(self.replace_at(parent_path, |parent| {
            let Self::Split(split) = parent else {
                return parent.clone();
            };
            let mut children = split.children.clone();
            children.remove(*idx);
            if children.len() == 1 {
                return children.remove(0).1;
            }

            let total: f64 = children.iter().map(|(weight, _)| weight).sum();
            for (weight, _) in &mut children {
                *weight /= total;
            }
            Self::Split(Arc::new(Split { horizontal: split.horizontal, children }))
        }))
    }

    /// Adds `window` next to the leaf at `path`, on its `direction` side.
    fn insert_beside(&self, path: &[usize], window: WindowHandle, direction: Direction) -> Self {
        let added = Self::Window(window);
        let Some((idx, parent_path)) = path.split_last() else {
            return pair(self.clone(), added, direction);
        };

        self.replace_at(parent_path, |parent| match parent {
            Self::Split(split) if split.horizontal == direction.is_horizontal() => {
                let mut nodes: Vec<Self> = split.children.iter().map(|(_, child)| child.clone()).collect();
                let at = if inserts_after(direction) { idx + 1 } else { *idx };
                nodes.insert(at, added);
                equal_split(split.horizontal, nodes)
            }
            Self::Split(split) => {
                let mut children = split.children.clone();
                if let Some((_, child)) = children.get_mut(*idx) {
                    *child = pair(child.clone(), added, direction);
                }
                Self::Split(Arc::new(Split { horizontal: split.horizontal, children }))
            }
            Self::Window(_) => parent.clone(),
        })
    }

    /// This tree with the leaves `a` and `b` exchanged.
    fn swapped(&self, a: WindowHandle, b: WindowHandle) -> Self {
        match self {
            Self::Window(window) if *window == a => Self::Window(b),
            Self::Window(window) if *window == b => Self::Window(a),
            Self::Window(_) => self.clone(),
            Self::Split(split) => Self::Split(Arc::new(Split {
                horizontal: split.horizontal,
                children: split.children.iter().map(|(weight, child)| (*weight, child.swapped(a, b))).collect(),
            })),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TreeLayoutEngine {
    identity: LayoutEngineId,
    name: String,
    add_direction: Direction,
    root: Option<Node>,
    minimized: WindowList,
    /// The leaf the next window splits, while it is still in the tree.
    last_added: Option<WindowHandle>,
}

impl TreeLayoutEngine {
    #[must_use]
    pub fn new(name: impl Into<String>, add_direction: Direction) -> Self {
        Self {
            identity: LayoutEngineId::new(),
            name: name.into(),
            add_direction,
            root: None,
            minimized: WindowList::new(),
            last_added: None,
        }
    }

    #[must_use]
    pub fn new_ref(add_direction: Direction) -> EngineRef { Arc::new(Self::new("Tree", add_direction)) }

    #[must_use]
    pub const fn add_direction(&self) -> Direction { self.add_direction }

    fn rebuild(&self, root: Option<Node>, minimized: WindowList, last_added: Option<WindowHandle>) -> EngineRef {
        Arc::new(Self {
            identity: self.identity,
            name: self.name.clone(),
            add_direction: self.add_direction,
            root,
            minimized,
            last_added,
        })
    }

    fn in_tree(&self, window: WindowHandle) -> bool { self.root.as_ref().is_some_and(|root| root.contains(window)) }

    /// The tree with `window` added beside the most recently added leaf.
    fn grown(&self, window: WindowHandle) -> Node {
        let Some(root) = &self.root else {
            return Node::Window(window);
        };

        let anchor = self.last_added.filter(|anchor| root.contains(*anchor)).unwrap_or_else(|| root.last_leaf());
        let path = root.path_to(anchor).unwrap_or_default();
        root.insert_beside(&path, window, self.add_direction)
    }

    /// The leaf across the `direction` edge of `window`.
    fn adjacent(&self, window: WindowHandle, direction: Direction) -> Option<WindowHandle> {
        let root = self.root.as_ref()?;
        let rect = root.rect_at(Rect::unit(), &root.path_to(window)?)?;
        let point = match direction {
            Direction::Left => Point::new(rect.x - EDGE_OFFSET, rect.y + EDGE_OFFSET),
            Direction::Right => Point::new(rect.right() + EDGE_OFFSET, rect.y + EDGE_OFFSET),
            Direction::Up => Point::new(rect.x + EDGE_OFFSET, rect.y - EDGE_OFFSET),
            Direction::Down => Point::new(rect.x + EDGE_OFFSET, rect.bottom() + EDGE_OFFSET),
        };

        root.leaf_at(Rect::unit(), point).map(|(leaf, _, _)| leaf).filter(|leaf| *leaf != window)
    }

    fn with_direction(self: Arc<Self>, direction: Direction) -> EngineRef {
        if direction == self.add_direction {
            return self;
        }

        debug!(engine = %self.name, %direction, "add direction changed");
        Arc::new(Self { add_direction: direction, ..(*self).clone() })
    }
}

impl LayoutEngine for TreeLayoutEngine {
    fn name(&self) -> &str { &self.name }

    fn identity(&self) -> LayoutEngineId { self.identity }

    fn count(&self) -> usize {
        let mut leaves = Vec::new();
        if let Some(root) = &self.root {
            root.leaves(&mut leaves);
        }
        leaves.len() + self.minimized.len()
    }

    fn contains_window(&self, window: WindowHandle) -> bool {
        self.in_tree(window) || self.minimized.contains(&window)
    }

    fn first_window(&self) -> Option<WindowHandle> {
        self.root.as_ref().map(Node::first_leaf).or_else(|| self.minimized.first().copied())
    }

    fn do_layout<'a>(&'a self, rect: Rect, _monitor: &'a Monitor) -> Placements<'a> {
        let mut tiled = Vec::new();
        if let Some(root) = &self.root {
            root.layout(rect, &mut tiled);
        }
        let minimized = self
            .minimized
            .iter()
            .map(move |window| WindowPlacement { window: *window, rect, size: WindowSize::Minimized });

        Box::new(tiled.into_iter().map(|(window, frame)| WindowPlacement::normal(window, frame)).chain(minimized))
    }

    fn add_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.contains_window(window) {
            return self;
        }

        debug!(engine = %self.name, %window, direction = %self.add_direction, "adding window");
        let root = self.grown(window);
        self.rebuild(Some(root), self.minimized.clone(), Some(window))
    }

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.contains_window(window) {
            return self;
        }

        debug!(engine = %self.name, %window, "removing window");
        let root = self.root.as_ref().and_then(|root| if root.contains(window) { root.without(window) } else { Some(root.clone()) });
        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        self.rebuild(root, minimized, self.last_added)
    }

    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, point: Point) -> EngineRef {
        let root = match &self.root {
            Some(root) if root.contains(window) => root.without(window),
            other => other.clone(),
        };
        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);

        let point = Point::new(point.x.clamp(0.0, 1.0 - EDGE_OFFSET), point.y.clamp(0.0, 1.0 - EDGE_OFFSET));
        let root = match root {
            None => Node::Window(window),
            Some(root) => match root.leaf_at(Rect::unit(), point) {
                Some((_, path, rect)) => root.insert_beside(&path, window, direction_to_point(&rect, point)),
                None => {
                    warn!(engine = %self.name, %point, "no leaf at point");
                    return self;
                }
            },
        };

        debug!(engine = %self.name, %window, %point, "moved window to point");
        self.rebuild(Some(root), minimized, self.last_added)
    }

    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>) {
        let target = self.adjacent(window, direction);
        (self, target)
    }

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef {
        let (Some(root), Some(other)) = (&self.root, self.adjacent(window, direction)) else {
            return self;
        };

        let root = root.swapped(window, other);
        self.rebuild(Some(root), self.minimized.clone(), self.last_added)
    }

    fn move_window_edges_in_direction(
        self: Arc<Self>,
        edge: Direction,
        deltas: Point,
        window: WindowHandle,
    ) -> EngineRef {
        let Some(root) = &self.root else {
            return self;
        };
        let Some(neighbour) = self.adjacent(window, edge) else {
            return self;
        };
        let (Some(own), Some(other)) = (root.path_to(window), root.path_to(neighbour)) else {
            return self;
        };

        let depth = own.iter().zip(&other).take_while(|(a, b)| a == b).count();
        let (Some(own_idx), Some(other_idx)) = (own.get(depth).copied(), other.get(depth).copied()) else {
            return self;
        };
        let Some(parent_rect) = root.rect_at(Rect::unit(), &own[..depth]) else {
            return self;
        };

        let (delta, extent) = if edge.is_horizontal() {
            (deltas.x, parent_rect.width)
        } else {
            (deltas.y, parent_rect.height)
        };
        let grow = if inserts_after(edge) { delta / extent } else { -delta / extent };

        let mut resized = false;
        let updated = root.replace_at(&own[..depth], |parent| {
            let Node::Split(split) = parent else {
                return parent.clone();
            };
            let mut children = split.children.clone();
            let own_weight = children[own_idx].0 + grow;
            let other_weight = children[other_idx].0 - grow;
            if own_weight < MIN_WEIGHT || other_weight < MIN_WEIGHT || !grow.is_finite() {
                return parent.clone();
            }

            children[own_idx].0 = own_weight;
            children[other_idx].0 = other_weight;
            resized = true;
            Node::Split(Arc::new(Split { horizontal: split.horizontal, children }))
        });

        if !resized {
            return self;
        }
        self.rebuild(Some(updated), self.minimized.clone(), self.last_added)
    }

    fn minimize_window_start(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.in_tree(window) {
            return self;
        }

        let root = self.root.as_ref().and_then(|root| root.without(window));
        let mut minimized = self.minimized.clone();
        minimized.push(window);
        self.rebuild(root, minimized, self.last_added)
    }

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.minimized.contains(&window) {
            return self;
        }

        let root = self.grown(window);
        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        self.rebuild(Some(root), minimized, self.last_added)
    }

    fn perform_custom_action(self: Arc<Self>, action: &LayoutEngineCustomAction) -> EngineRef {
        let Some(verb) = action.name.strip_prefix(self.name.as_str()).and_then(|rest| rest.strip_prefix('.')) else {
            return self;
        };

        match verb {
            "add_node_direction" => match serde_json::from_value::<Direction>(action.payload.clone()) {
                Ok(direction) => self.with_direction(direction),
                Err(err) => {
                    warn!(engine = %self.name, error = %err, "invalid add direction");
                    self
                }
            },
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::test_support::{layout, with_windows};
    use crate::layout::{BarLayoutEngine, FloatingLayoutEngine, GapsLayoutEngine};

    const RECT: Rect = Rect::new(0.0, 0.0, 900.0, 600.0);

    fn rects(engine: &EngineRef) -> Vec<(isize, Rect)> {
        let mut placements: Vec<_> = layout(engine, RECT).into_iter().map(|p| (p.window.0, p.rect)).collect();
        placements.sort_by_key(|(handle, _)| *handle);
        placements
    }

    fn add_direction(direction: &str) -> LayoutEngineCustomAction {
        LayoutEngineCustomAction::new("Tree.add_node_direction", None).with_payload(serde_json::json!(direction))
    }

    /// `1 | (2 / 3)`: window 1 on the left half, 2 above 3 on the right.
    fn grid() -> EngineRef {
        let engine = with_windows(TreeLayoutEngine::new_ref(Direction::Right), &[1, 2]);
        with_windows(engine.perform_custom_action(&add_direction("down")), &[3])
    }

    #[test]
    fn test_windows_split_in_add_direction() {
        let engine = with_windows(TreeLayoutEngine::new_ref(Direction::Right), &[1, 2, 3]);
        assert_eq!(
            rects(&engine),
            vec![
                (1, Rect::new(0.0, 0.0, 300.0, 600.0)),
                (2, Rect::new(300.0, 0.0, 300.0, 600.0)),
                (3, Rect::new(600.0, 0.0, 300.0, 600.0)),
            ]
        );
        assert_eq!(engine.first_window(), Some(WindowHandle(1)));
        assert_eq!(engine.count(), 3);
    }

    #[test]
    fn test_add_node_direction_nests_a_split() {
        assert_eq!(
            rects(&grid()),
            vec![
                (1, Rect::new(0.0, 0.0, 450.0, 600.0)),
                (2, Rect::new(450.0, 0.0, 450.0, 300.0)),
                (3, Rect::new(450.0, 300.0, 450.0, 300.0)),
            ]
        );
    }

    #[test]
    fn test_add_direction_left_inserts_before() {
        let engine = TreeLayoutEngine::new_ref(Direction::Left);
        let engine = with_windows(engine, &[1, 2]);
        assert_eq!(rects(&engine)[1], (2, Rect::new(0.0, 0.0, 450.0, 600.0)));
    }

    #[test]
    fn test_custom_action_is_addressed_by_name() {
        let engine = TreeLayoutEngine::new_ref(Direction::Right);
        let same = Arc::clone(&engine).perform_custom_action(&add_direction("right"));
        assert!(Arc::ptr_eq(&engine, &same));

        let other = LayoutEngineCustomAction::new("Master.add_node_direction", None).with_payload(serde_json::json!("up"));
        let same = Arc::clone(&engine).perform_custom_action(&other);
        assert!(Arc::ptr_eq(&engine, &same));

        let invalid = add_direction("diagonal");
        let same = Arc::clone(&engine).perform_custom_action(&invalid);
        assert!(Arc::ptr_eq(&engine, &same));
    }

    #[test]
    fn test_custom_action_reaches_tree_through_proxies() {
        let tree = TreeLayoutEngine::new_ref(Direction::Right);
        let engine = BarLayoutEngine::wrap(GapsLayoutEngine::wrap(FloatingLayoutEngine::wrap(tree), 10.0, 5.0), 30.0);
        let engine = with_windows(engine, &[1]);

        let changed = Arc::clone(&engine).perform_custom_action(&add_direction("down"));
        assert!(!Arc::ptr_eq(&engine, &changed));

        let placements = layout(&with_windows(changed, &[2]), RECT);
        assert_eq!(placements[0].rect.x, placements[1].rect.x);
        assert!(placements[1].rect.y > placements[0].rect.bottom());
    }

    #[test]
    fn test_focus_follows_geometry() {
        let engine = grid();
        let focus = |direction, window| Arc::clone(&engine).focus_window_in_direction(direction, WindowHandle(window)).1;

        assert_eq!(focus(Direction::Right, 1), Some(WindowHandle(2)));
        assert_eq!(focus(Direction::Left, 3), Some(WindowHandle(1)));
        assert_eq!(focus(Direction::Up, 3), Some(WindowHandle(2)));
        assert_eq!(focus(Direction::Down, 2), Some(WindowHandle(3)));
        assert_eq!(focus(Direction::Left, 1), None);
        assert_eq!(focus(Direction::Down, 3), None);
    }

    #[test]
    fn test_remove_collapses_single_child_splits() {
        let removed = grid().remove_window(WindowHandle(2));
        assert_eq!(
            rects(&removed),
            vec![(1, Rect::new(0.0, 0.0, 450.0, 600.0)), (3, Rect::new(450.0, 0.0, 450.0, 600.0))]
        );

        let empty = removed.remove_window(WindowHandle(1)).remove_window(WindowHandle(3));
        assert_eq!(empty.count(), 0);
        assert_eq!(empty.first_window(), None);
    }

    #[test]
    fn test_swap_exchanges_leaves() {
        let swapped = grid().swap_window_in_direction(Direction::Right, WindowHandle(1));
        assert_eq!(rects(&swapped)[0], (1, Rect::new(450.0, 0.0, 450.0, 300.0)));
        assert_eq!(rects(&swapped)[1], (2, Rect::new(0.0, 0.0, 450.0, 600.0)));

        let same = Arc::clone(&swapped).swap_window_in_direction(Direction::Up, WindowHandle(2));
        assert!(Arc::ptr_eq(&swapped, &same));
    }

    #[test]
    fn test_edge_move_shifts_weight_between_neighbours() {
        let engine = with_windows(TreeLayoutEngine::new_ref(Direction::Right), &[1, 2]);

        let wider = Arc::clone(&engine).move_window_edges_in_direction(Direction::Right, Point::new(0.1, 0.0), WindowHandle(1));
        let placements = rects(&wider);
        assert!((placements[0].1.width - 540.0).abs() < 1e-9);
        assert!((placements[1].1.x - 540.0).abs() < 1e-9);

        let narrower = Arc::clone(&engine).move_window_edges_in_direction(Direction::Left, Point::new(0.1, 0.0), WindowHandle(2));
        assert!((rects(&narrower)[1].1.width - 360.0).abs() < 1e-9);

        let outer = Arc::clone(&engine).move_window_edges_in_direction(Direction::Left, Point::new(-0.1, 0.0), WindowHandle(1));
        assert!(Arc::ptr_eq(&engine, &outer));

        let too_far = Arc::clone(&engine).move_window_edges_in_direction(Direction::Right, Point::new(0.6, 0.0), WindowHandle(1));
        assert!(Arc::ptr_eq(&engine, &too_far));
    }

    #[test]
    fn test_move_to_point_splits_the_leaf_under_it() {
        let engine = with_windows(TreeLayoutEngine::new_ref(Direction::Right), &[1, 2]);

        let moved = engine.move_window_to_point(WindowHandle(3), Point::new(0.75, 0.9));
        assert_eq!(rects(&moved)[1], (2, Rect::new(450.0, 0.0, 450.0, 300.0)));
        assert_eq!(rects(&moved)[2], (3, Rect::new(450.0, 300.0, 450.0, 300.0)));

        let back = moved.move_window_to_point(WindowHandle(3), Point::new(0.02, 0.5));
        assert_eq!(rects(&back)[2], (3, Rect::new(0.0, 0.0, 300.0, 600.0)));
    }

    #[test]
    fn test_minimized_windows_leave_the_tree() {
        let engine = with_windows(TreeLayoutEngine::new_ref(Direction::Right), &[1, 2]);
        let minimized = engine.minimize_window_start(WindowHandle(1));

        let placements = layout(&minimized, RECT);
        assert_eq!(placements[0], WindowPlacement::normal(WindowHandle(2), RECT));
        assert_eq!(placements[1].size, WindowSize::Minimized);
        assert_eq!(minimized.count(), 2);

        let restored = minimized.minimize_window_end(WindowHandle(1));
        assert!(layout(&restored, RECT).iter().all(|p| p.size == WindowSize::Normal));
        assert_eq!(rects(&restored)[0], (1, Rect::new(450.0, 0.0, 450.0, 600.0)));
    }

    #[test]
    fn test_direction_to_point_uses_diagonals() {
        let rect = Rect::new(0.5, 0.0, 0.5, 1.0);
        assert_eq!(direction_to_point(&rect, Point::new(0.75, 0.1)), Direction::Up);
        assert_eq!(direction_to_point(&rect, Point::new(0.75, 0.9)), Direction::Down);
        assert_eq!(direction_to_point(&rect, Point::new(0.52, 0.5)), Direction::Left);
        assert_eq!(direction_to_point(&rect, Point::new(0.98, 0.5)), Direction::Right);
    }
}
