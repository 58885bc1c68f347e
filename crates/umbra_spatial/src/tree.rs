//! # Creature Quadtree
//!
//! Point quadtree over fixed-point ground positions. Every node owns a
//! square (`center ± radius`); a leaf stores at most one [`Entry`], an
//! internal node exactly four children.
//!
//! ## Layout
//!
//! ```text
//!        UL (1) | UR (0)        routing: x >= cx -> right half
//!       --------c--------                y >= cy -> upper half
//!        BL (2) | BR (3)
//! ```
//!
//! Nodes live in one arena `Vec` and refer to each other by [`NodeId`].
//! Freed ids (collapsed or pruned subtrees) are recycled. A locator map
//! tracks which leaf holds each creature, so a move never searches the tree.
//!
//! ## Locking
//!
//! The tree itself is lock-free: every mutating method takes `&mut self`.
//! [`SpatialIndex`](crate::SpatialIndex) wraps it in the single root mutex.

use fxhash::{FxHashMap, FxHashSet};
use umbra_geometry::{Fixed, FixedVector2, Segment, Side};

use crate::entry::{CreatureId, Entry};
use crate::error::{SpatialError, SpatialResult};

/// Longest root-to-leaf path a healthy tree can have.
///
/// The radius halves at every level and subdivision stops at one raw unit,
/// so depth is bounded by the bit width of the coordinates.
pub const MAX_DEPTH: usize = 64;

/// Arena index of a quadtree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Child slot of an internal node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    /// `x >= cx`, `y >= cy`.
    UpperRight = 0,
    /// `x < cx`, `y >= cy`.
    UpperLeft = 1,
    /// `x < cx`, `y < cy`.
    BottomLeft = 2,
    /// `x >= cx`, `y < cy`.
    BottomRight = 3,
}

impl Quadrant {
    /// All quadrants in child-slot order.
    pub const ALL: [Self; 4] = [
        Self::UpperRight,
        Self::UpperLeft,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Quadrant of `center` that `point` routes to.
    #[inline]
    #[must_use]
    pub fn of(center: FixedVector2, point: FixedVector2) -> Self {
        match (point.x >= center.x, point.y >= center.y) {
            (true, true) => Self::UpperRight,
            (false, true) => Self::UpperLeft,
            (false, false) => Self::BottomLeft,
            (true, false) => Self::BottomRight,
        }
    }

    /// Child slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Center of this quadrant's child, `half` being the child radius.
    #[must_use]
    pub fn child_center(self, center: FixedVector2, half: Fixed) -> FixedVector2 {
        let (dx, dy) = match self {
            Self::UpperRight => (half, half),
            Self::UpperLeft => (-half, half),
            Self::BottomLeft => (-half, -half),
            Self::BottomRight => (half, -half),
        };
        FixedVector2::new(center.x + dx, center.y + dy)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeKind {
    Leaf(Option<Entry>),
    Internal([NodeId; 4]),
}

/// One square of the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuadNode {
    center: FixedVector2,
    radius: Fixed,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl QuadNode {
    fn leaf(center: FixedVector2, radius: Fixed, parent: Option<NodeId>) -> Self {
        Self {
            center,
            radius,
            parent,
            kind: NodeKind::Leaf(None),
        }
    }

    /// Square center.
    #[must_use]
    pub fn center(&self) -> FixedVector2 {
        self.center
    }

    /// Half width of the square.
    #[must_use]
    pub fn radius(&self) -> Fixed {
        self.radius
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns true for leaves (empty or not).
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Returns true for a leaf without an entry.
    #[must_use]
    pub fn is_empty_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(None))
    }

    /// The entry of a non-empty leaf.
    #[must_use]
    pub fn entry(&self) -> Option<&Entry> {
        match &self.kind {
            NodeKind::Leaf(entry) => entry.as_ref(),
            NodeKind::Internal(_) => None,
        }
    }

    /// Children in [`Quadrant`] order, `None` for leaves.
    #[must_use]
    pub fn children(&self) -> Option<[NodeId; 4]> {
        match self.kind {
            NodeKind::Internal(children) => Some(children),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Strict containment: `|p - center| < radius` on both axes.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: FixedVector2) -> bool {
        (p.x - self.center.x).abs() < self.radius && (p.y - self.center.y).abs() < self.radius
    }

    /// Closed containment: `|p - center| <= radius` on both axes.
    #[inline]
    #[must_use]
    pub fn covers(&self, p: FixedVector2) -> bool {
        (p.x - self.center.x).abs() <= self.radius && (p.y - self.center.y).abs() <= self.radius
    }

    /// Square corners and edge midpoints, counter-clockwise from the right.
    fn octants(&self) -> [FixedVector2; 8] {
        let (c, r) = (self.center, self.radius);
        let at = |dx: Fixed, dy: Fixed| FixedVector2::new(c.x + dx, c.y + dy);
        let zero = Fixed::ZERO;
        [
            at(r, zero),
            at(r, r),
            at(zero, r),
            at(-r, r),
            at(-r, zero),
            at(-r, -r),
            at(zero, -r),
            at(r, -r),
        ]
    }
}

/// Arena quadtree of creature positions.
///
/// `Clone` is a deep structural copy.
#[derive(Clone, Debug)]
pub struct SpatialQuadTree {
    nodes: Vec<QuadNode>,
    free: Vec<NodeId>,
    locator: FxHashMap<CreatureId, NodeId>,
    root: NodeId,
}

impl SpatialQuadTree {
    /// Creates an empty tree covering at least `center ± radius`.
    ///
    /// The radius is rounded up to a power of two in raw units so that every
    /// halving is exact and the four children tile their parent.
    #[must_use]
    pub fn new(center: FixedVector2, radius: Fixed) -> Self {
        Self {
            nodes: vec![QuadNode::leaf(center, square_radius(radius), None)],
            free: Vec::new(),
            locator: FxHashMap::default(),
            root: NodeId(0),
        }
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Read access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.0]
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of indexed creatures.
    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.locator.len()
    }

    /// Returns true if no creature is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }

    /// Leaf currently holding `creature`.
    #[must_use]
    pub fn locate(&self, creature: CreatureId) -> Option<NodeId> {
        self.locator.get(&creature).copied()
    }

    /// Indexed position of `creature`.
    #[must_use]
    pub fn position_of(&self, creature: CreatureId) -> Option<FixedVector2> {
        let node = self.locate(creature)?;
        self.node(node).entry().map(|e| e.position)
    }

    /// Strict containment test against a node's square.
    #[must_use]
    pub fn contains(&self, node: NodeId, p: FixedVector2) -> bool {
        self.node(node).contains(p)
    }

    /// Every creature reachable from the root.
    #[must_use]
    pub fn creatures(&self) -> FxHashSet<CreatureId> {
        let mut out = FxHashSet::default();
        self.visit_entries(self.root, |entry| out.extend(entry.creatures.iter().copied()));
        out
    }

    /// Number of non-empty leaves.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let mut count = 0;
        self.visit_entries(self.root, |_| count += 1);
        count
    }

    /// Descends from `from` to the leaf whose region routes `point`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::StructuralInvariantViolation`] if the descent exceeds
    /// [`MAX_DEPTH`].
    pub fn find(&self, from: NodeId, point: FixedVector2) -> SpatialResult<NodeId> {
        let mut node = from;
        for _ in 0..=MAX_DEPTH {
            let n = self.node(node);
            match n.kind {
                NodeKind::Leaf(_) => return Ok(node),
                NodeKind::Internal(children) => {
                    node = children[Quadrant::of(n.center, point).index()];
                }
            }
        }
        Err(violation(node, "descent exceeded maximum depth"))
    }

    /// Indexes a new creature at `position`. Returns the leaf that holds it.
    ///
    /// # Errors
    ///
    /// [`SpatialError::DuplicateCreature`], [`SpatialError::OutOfBounds`] for
    /// positions not strictly inside the root square, or a structural
    /// violation.
    pub fn insert(&mut self, creature: CreatureId, position: FixedVector2) -> SpatialResult<NodeId> {
        if self.locator.contains_key(&creature) {
            return Err(SpatialError::DuplicateCreature(creature));
        }
        if !self.contains(self.root, position) {
            return Err(SpatialError::OutOfBounds {
                x: position.x,
                y: position.y,
            });
        }
        self.insert_from(self.root, Entry::new(creature, position))
    }

    /// Finds the leaf under `node` for `entry` and stores it there.
    ///
    /// # Errors
    ///
    /// Structural violations from [`find`](Self::find) or
    /// [`shallow_insert`](Self::shallow_insert).
    pub fn insert_from(&mut self, node: NodeId, entry: Entry) -> SpatialResult<NodeId> {
        let leaf = self.find(node, entry.position)?;
        self.shallow_insert(leaf, entry)
    }

    /// Stores `entry` in `leaf` without descending first.
    ///
    /// An empty leaf takes the entry, a leaf at the same coordinate merges
    /// creature lists, a leaf at another coordinate subdivides until the two
    /// entries separate.
    ///
    /// # Errors
    ///
    /// [`SpatialError::StructuralInvariantViolation`] if `leaf` is internal
    /// or the square can no longer be halved.
    pub fn shallow_insert(&mut self, leaf: NodeId, mut entry: Entry) -> SpatialResult<NodeId> {
        let mut node = leaf;
        loop {
            let taken = match &mut self.nodes[node.0].kind {
                NodeKind::Leaf(slot) => Some(slot.take()),
                NodeKind::Internal(_) => None,
            };
            let Some(taken) = taken else {
                self.forget(&entry);
                return Err(violation(node, "insert into an internal node"));
            };

            let resident = match taken {
                None => {
                    self.store(node, entry);
                    return Ok(node);
                }
                Some(mut existing) if existing.position == entry.position => {
                    existing.creatures.append(&mut entry.creatures);
                    self.store(node, existing);
                    return Ok(node);
                }
                Some(existing) => existing,
            };

            let children = match self.subdivide(node) {
                Ok(children) => children,
                Err(err) => {
                    self.store(node, resident);
                    self.forget(&entry);
                    return Err(err);
                }
            };
            let center = self.node(node).center;
            self.store(children[Quadrant::of(center, resident.position).index()], resident);
            node = children[Quadrant::of(center, entry.position).index()];
        }
    }

    /// Moves `creature` to `new_position`. Returns the leaf now holding it.
    ///
    /// | entry     | target in leaf square | action                          |
    /// |-----------|-----------------------|---------------------------------|
    /// | singleton | yes                   | update position in place        |
    /// | singleton | no                    | detach, parent `reinsert`       |
    /// | shared    | yes                   | split off, `insert_from` leaf   |
    /// | shared    | no                    | split off, parent `reinsert`    |
    ///
    /// Moving to the current position changes nothing.
    ///
    /// # Errors
    ///
    /// [`SpatialError::UnknownCreature`], or [`SpatialError::NodeHasNoParent`]
    /// when the target leaves the leaf square and either the leaf is the root
    /// or the target lies outside the root square. Both are reported before
    /// the tree is touched.
    pub fn move_entry_delta(
        &mut self,
        creature: CreatureId,
        new_position: FixedVector2,
    ) -> SpatialResult<NodeId> {
        let node = self
            .locate(creature)
            .ok_or(SpatialError::UnknownCreature(creature))?;
        let (position, singleton) = match self.node(node).entry() {
            Some(entry) => (entry.position, entry.is_singleton()),
            None => return Err(violation(node, "locator points at an empty node")),
        };
        if position == new_position {
            return Ok(node);
        }

        let inside = self.contains(node, new_position);
        let parent = self.node(node).parent;
        let escaping = !inside && (parent.is_none() || !self.contains(self.root, new_position));
        if escaping {
            return Err(SpatialError::NodeHasNoParent {
                node: node.0,
                x: new_position.x,
                y: new_position.y,
            });
        }

        match (singleton, inside, parent) {
            (true, true, _) => {
                if let NodeKind::Leaf(Some(entry)) = &mut self.nodes[node.0].kind {
                    entry.position = new_position;
                }
                Ok(node)
            }
            (true, false, Some(parent)) => {
                let mut entry = self.take_entry(node)?;
                entry.position = new_position;
                self.reinsert(parent, entry)
            }
            (false, true, _) => {
                self.detach(node, creature);
                self.insert_from(node, Entry::new(creature, new_position))
            }
            (false, false, Some(parent)) => {
                self.detach(node, creature);
                self.reinsert(parent, Entry::new(creature, new_position))
            }
            (_, false, None) => Err(SpatialError::NodeHasNoParent {
                node: node.0,
                x: new_position.x,
                y: new_position.y,
            }),
        }
    }

    /// Walks up from `from` until a square strictly contains `entry`, then
    /// inserts it there. Nodes left with four empty leaves on the way up are
    /// collapsed back into a leaf.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NodeHasNoParent`] if the root does not contain the
    /// entry (checked first, nothing is modified), or a structural violation.
    pub fn reinsert(&mut self, from: NodeId, entry: Entry) -> SpatialResult<NodeId> {
        if !self.contains(self.root, entry.position) {
            return Err(SpatialError::NodeHasNoParent {
                node: from.0,
                x: entry.position.x,
                y: entry.position.y,
            });
        }

        let mut node = from;
        for _ in 0..=MAX_DEPTH {
            if self.contains(node, entry.position) {
                return self.insert_from(node, entry);
            }
            self.collapse(node);
            match self.node(node).parent {
                Some(parent) => node = parent,
                None => break,
            }
        }
        self.forget(&entry);
        Err(violation(node, "reinsert walked past the root"))
    }

    /// Removes `creature` from the tree, returning its last position.
    ///
    /// A leaf whose entry empties becomes an empty leaf.
    ///
    /// # Errors
    ///
    /// [`SpatialError::UnknownCreature`].
    pub fn remove(&mut self, creature: CreatureId) -> SpatialResult<FixedVector2> {
        let node = self
            .locate(creature)
            .ok_or(SpatialError::UnknownCreature(creature))?;
        let position = self
            .node(node)
            .entry()
            .map(|e| e.position)
            .ok_or_else(|| violation(node, "locator points at an empty node"))?;
        self.detach(node, creature);
        Ok(position)
    }

    /// Drops everything strictly on the outside of `segment`.
    ///
    /// Children whose four corners are all outside are pruned wholesale;
    /// children with at least one outside corner are visited; the rest are
    /// kept untouched.
    pub fn cut(&mut self, segment: &Segment) {
        self.cut_node(self.root, segment);
    }

    /// Verifies the structural invariants of the whole tree.
    ///
    /// # Errors
    ///
    /// [`SpatialError::StructuralInvariantViolation`] naming the first node
    /// that breaks one.
    pub fn check_invariants(&self) -> SpatialResult<()> {
        let mut stack = vec![(self.root, 0usize)];
        let mut seen = 0usize;
        while let Some((id, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(violation(id, "tree deeper than the maximum depth"));
            }
            let node = self.node(id);
            match &node.kind {
                NodeKind::Leaf(None) => {}
                NodeKind::Leaf(Some(entry)) => {
                    if entry.creatures.is_empty() {
                        return Err(violation(id, "stored entry has no creatures"));
                    }
                    if !node.covers(entry.position) {
                        return Err(violation(id, "entry outside its leaf square"));
                    }
                    for creature in &entry.creatures {
                        if self.locate(*creature) != Some(id) {
                            return Err(violation(id, "locator disagrees with entry"));
                        }
                    }
                    seen += entry.creatures.len();
                }
                NodeKind::Internal(children) => {
                    for child in children {
                        if self.node(*child).parent != Some(id) {
                            return Err(violation(*child, "child does not point at its parent"));
                        }
                        stack.push((*child, depth + 1));
                    }
                }
            }
        }
        if seen != self.locator.len() {
            return Err(violation(self.root, "locator tracks unreachable creatures"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn alloc(&mut self, node: QuadNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId(self.nodes.len() - 1)
        }
    }

    fn subdivide(&mut self, node: NodeId) -> SpatialResult<[NodeId; 4]> {
        let (center, radius) = {
            let n = self.node(node);
            (n.center, n.radius)
        };
        if radius.raw() < 2 {
            return Err(violation(node, "square too small to subdivide"));
        }
        let half = radius / 2;
        let children = Quadrant::ALL
            .map(|q| self.alloc(QuadNode::leaf(q.child_center(center, half), half, Some(node))));
        self.nodes[node.0].kind = NodeKind::Internal(children);
        tracing::trace!(node = node.0, "quad subdivided");
        Ok(children)
    }

    /// Turns an internal node whose four children are empty leaves back into
    /// an empty leaf.
    fn collapse(&mut self, node: NodeId) {
        let Some(children) = self.node(node).children() else {
            return;
        };
        if children.iter().all(|c| self.node(*c).is_empty_leaf()) {
            self.free.extend(children);
            self.nodes[node.0].kind = NodeKind::Leaf(None);
            tracing::trace!(node = node.0, "quad collapsed");
        }
    }

    fn store(&mut self, node: NodeId, entry: Entry) {
        for creature in &entry.creatures {
            self.locator.insert(*creature, node);
        }
        self.nodes[node.0].kind = NodeKind::Leaf(Some(entry));
    }

    fn forget(&mut self, entry: &Entry) {
        for creature in &entry.creatures {
            self.locator.remove(creature);
        }
    }

    fn take_entry(&mut self, node: NodeId) -> SpatialResult<Entry> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Leaf(slot) => slot
                .take()
                .ok_or_else(|| violation(node, "expected a non-empty leaf")),
            NodeKind::Internal(_) => Err(violation(node, "expected a non-empty leaf")),
        }
    }

    /// Takes one creature out of the entry at `node`, clearing the leaf when
    /// it was the last one.
    fn detach(&mut self, node: NodeId, creature: CreatureId) {
        if let NodeKind::Leaf(slot) = &mut self.nodes[node.0].kind {
            if let Some(entry) = slot {
                entry.remove(creature);
                if entry.creatures.is_empty() {
                    *slot = None;
                }
            }
        }
        self.locator.remove(&creature);
    }

    fn cut_node(&mut self, node: NodeId, segment: &Segment) {
        let children = match self.node(node).kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf(_) => {
                let outside = self
                    .node(node)
                    .entry()
                    .is_some_and(|e| segment.side(e.position) == Side::Outside);
                if outside {
                    if let Ok(entry) = self.take_entry(node) {
                        self.forget(&entry);
                    }
                }
                return;
            }
        };

        let n = self.node(node);
        let center_side = segment.side(n.center);
        let sides = n.octants().map(|p| segment.side(p));

        for (i, child) in children.into_iter().enumerate() {
            let corners = [sides[2 * i], sides[2 * i + 1], sides[(2 * i + 2) % 8], center_side];
            if corners.iter().all(|s| *s == Side::Outside) {
                self.prune(child);
            } else if corners.contains(&Side::Outside) {
                self.cut_node(child, segment);
            }
        }
    }

    /// Empties the subtree under `node`, leaving `node` an empty leaf.
    fn prune(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let kind = std::mem::replace(&mut self.nodes[id.0].kind, NodeKind::Leaf(None));
            match kind {
                NodeKind::Leaf(Some(entry)) => self.forget(&entry),
                NodeKind::Leaf(None) => {}
                NodeKind::Internal(children) => stack.extend(children),
            }
            if id != node {
                self.free.push(id);
            }
        }
    }

    fn visit_entries(&self, from: NodeId, mut visit: impl FnMut(&Entry)) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            match &self.node(id).kind {
                NodeKind::Leaf(Some(entry)) => visit(entry),
                NodeKind::Leaf(None) => {}
                NodeKind::Internal(children) => stack.extend(children.iter().copied()),
            }
        }
    }
}

/// Smallest power of two in raw units that is `>= radius` (at least one).
fn square_radius(radius: Fixed) -> Fixed {
    const LARGEST: i64 = 1 << 62;
    let raw = radius.raw().max(1).unsigned_abs();
    let rounded = raw
        .checked_next_power_of_two()
        .and_then(|r| i64::try_from(r).ok())
        .unwrap_or(LARGEST);
    Fixed::from_raw(rounded)
}

fn violation(node: NodeId, reason: &'static str) -> SpatialError {
    SpatialError::StructuralInvariantViolation {
        node: node.0,
        reason,
    }
}
