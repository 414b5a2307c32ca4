//! Bounding volume hierarchy over hittable primitives.
//!
//! The tree is stored as an arena of [`BvhNode`]s. Leaves reference the
//! primitive array by index and internal nodes reference their two children
//! by node id, so a subtree is shared simply by naming its id twice.
//!
//! Construction splits each range at the median along the longest axis of its
//! bounding box. Traversal visits the left child first and narrows the ray
//! range to the left hit before visiting the right child, so only strictly
//! closer hits can replace it.

use std::ops::Range;

use log::debug;

use crate::aabb::Aabb;
use crate::error::BvhError;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::ray::Ray;

/// Index of a node inside [`Bvh`]'s arena.
pub type NodeId = usize;

/// Single node of the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// A primitive, by index into the tree's object array.
    Leaf {
        /// Index of the primitive
        object: usize,
    },
    /// Two children and the box enclosing both.
    ///
    /// `left` and `right` name the same leaf when the node wraps exactly one
    /// primitive, so every internal node always has two children.
    Internal {
        /// Left child
        left: NodeId,
        /// Right child
        right: NodeId,
        /// Union of both children's boxes
        bbox: Aabb,
    },
}

/// Bounding volume hierarchy owning its primitives.
///
/// Immutable once built; changing the scene means building a new tree. A
/// `Bvh` implements [`Hittable`] itself, so trees nest inside lists or other
/// trees.
#[derive(Debug, Clone)]
pub struct Bvh<T> {
    objects: Vec<T>,
    nodes: Vec<BvhNode>,
    root: NodeId,
    /// Bounding box of every object, queried once at build time.
    boxes: Vec<Aabb>,
    leaves: usize,
}

impl<T: Hittable> Bvh<T> {
    /// Build a tree over every object.
    pub fn new(objects: Vec<T>) -> Result<Self, BvhError> {
        let len = objects.len();
        Self::with_range(objects, 0..len)
    }

    /// Build a tree over `objects[range]`.
    ///
    /// Objects outside the range are kept but never queried.
    pub fn with_range(objects: Vec<T>, range: Range<usize>) -> Result<Self, BvhError> {
        let Range { start, end } = range;
        if end > objects.len() {
            return Err(BvhError::RangeOutOfBounds {
                start,
                end,
                len: objects.len(),
            });
        }
        if start >= end {
            return Err(BvhError::EmptyRange { start, end });
        }

        let boxes: Vec<Aabb> = objects.iter().map(Hittable::bounding_box).collect();

        // Order a permutation of indices, never the primitives themselves.
        let mut order: Vec<usize> = (start..end).collect();
        let mut builder = Builder {
            boxes: &boxes,
            nodes: Vec::with_capacity(2 * order.len()),
        };
        let root = builder.build(&mut order);
        let nodes = builder.nodes;

        let bvh = Self {
            objects,
            nodes,
            root,
            boxes,
            leaves: end - start,
        };
        debug!(
            "Built BVH over {} primitives: {} nodes, depth {}",
            bvh.leaves,
            bvh.node_count(),
            bvh.depth()
        );
        Ok(bvh)
    }
}

impl<T> Bvh<T> {
    /// Number of primitives reachable from the root.
    pub fn len(&self) -> usize {
        self.leaves
    }

    /// Always false: a tree cannot be built over an empty range.
    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    /// All primitives, including any outside the build range.
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node stored under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &BvhNode {
        &self.nodes[id]
    }

    /// Box enclosing every primitive in the tree.
    pub fn root_box(&self) -> Aabb {
        self.node_box(self.root)
    }

    /// Number of internal levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.depth_of(self.root)
    }

    fn depth_of(&self, id: NodeId) -> usize {
        match self.nodes[id] {
            BvhNode::Leaf { .. } => 0,
            BvhNode::Internal { left, right, .. } => {
                1 + self.depth_of(left).max(self.depth_of(right))
            }
        }
    }

    fn node_box(&self, id: NodeId) -> Aabb {
        match self.nodes[id] {
            BvhNode::Leaf { object } => self.boxes[object],
            BvhNode::Internal { bbox, .. } => bbox,
        }
    }
}

impl<T: Hittable> Bvh<T> {
    fn hit_node(&self, id: NodeId, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self.nodes[id] {
            BvhNode::Leaf { object } => self.objects[object].hit(r, ray_t),
            BvhNode::Internal { left, right, bbox } => {
                if !bbox.hit(r, ray_t) {
                    return None;
                }

                let hit_left = self.hit_node(left, r, ray_t);
                // Only hits strictly closer than the left one may replace it.
                let right_t = Interval::new(ray_t.min, hit_left.map_or(ray_t.max, |rec| rec.t));
                self.hit_node(right, r, right_t).or(hit_left)
            }
        }
    }
}

impl<T: Hittable> Hittable for Bvh<T> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        debug_assert!(r.is_valid(), "ray direction must be finite and non-zero: {r:?}");
        self.hit_node(self.root, r, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.root_box()
    }
}

/// Top-down construction state: cached object boxes and the growing arena.
struct Builder<'a> {
    boxes: &'a [Aabb],
    nodes: Vec<BvhNode>,
}

impl Builder<'_> {
    fn push(&mut self, node: BvhNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn node_box(&self, id: NodeId) -> Aabb {
        match self.nodes[id] {
            BvhNode::Leaf { object } => self.boxes[object],
            BvhNode::Internal { bbox, .. } => bbox,
        }
    }

    /// Build the subtree over `order`, a non-empty slice of object indices,
    /// and return its root.
    fn build(&mut self, order: &mut [usize]) -> NodeId {
        let boxes = self.boxes;

        let (left, right) = match order.len() {
            0 => unreachable!("BVH ranges are validated to be non-empty"),
            1 => {
                let leaf = self.push(BvhNode::Leaf { object: order[0] });
                (leaf, leaf)
            }
            2 => (
                self.push(BvhNode::Leaf { object: order[0] }),
                self.push(BvhNode::Leaf { object: order[1] }),
            ),
            span => {
                let bbox = order
                    .iter()
                    .fold(Aabb::EMPTY, |acc, &i| Aabb::enclosing(&acc, &boxes[i]));
                let axis = bbox.longest_axis();

                let mid = span / 2;
                order.select_nth_unstable_by(mid, |&a, &b| {
                    let a_min = boxes[a].axis_interval(axis).min;
                    let b_min = boxes[b].axis_interval(axis).min;
                    a_min.total_cmp(&b_min)
                });

                let (lower, upper) = order.split_at_mut(mid);
                (self.build(lower), self.build(upper))
            }
        };

        let bbox = Aabb::enclosing(&self.node_box(left), &self.node_box(right));
        self.push(BvhNode::Internal { left, right, bbox })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HittableList;
    use crate::material::MaterialType;
    use crate::quad::Quad;
    use crate::sphere::Sphere;
    use approx::assert_relative_eq;
    use glam::Vec3A;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    const FORWARD: Interval = Interval::new(0.001, f32::INFINITY);

    fn sphere(x: f32, y: f32, z: f32, radius: f32) -> Sphere {
        Sphere::new(Vec3A::new(x, y, z), radius, MaterialType::default())
    }

    fn three_spheres() -> Vec<Sphere> {
        vec![
            sphere(0.0, 0.0, -1.0, 0.5),
            sphere(2.0, 0.0, -1.0, 0.5),
            sphere(4.0, 0.0, -1.0, 0.5),
        ]
    }

    #[test]
    fn rejects_empty_and_out_of_bounds_ranges() {
        let err = Bvh::<Sphere>::new(Vec::new()).unwrap_err();
        assert_eq!(err, BvhError::EmptyRange { start: 0, end: 0 });

        let err = Bvh::with_range(three_spheres(), 2..2).unwrap_err();
        assert_eq!(err, BvhError::EmptyRange { start: 2, end: 2 });

        let err = Bvh::with_range(three_spheres(), 1..4).unwrap_err();
        assert_eq!(err, BvhError::RangeOutOfBounds { start: 1, end: 4, len: 3 });
    }

    #[test]
    fn single_primitive_duplicates_the_leaf() {
        let bvh = Bvh::new(vec![sphere(0.0, 0.0, -1.0, 0.5)]).unwrap();
        assert_eq!(bvh.node_count(), 2);
        assert_eq!(bvh.depth(), 1);
        let BvhNode::Internal { left, right, bbox } = *bvh.node(bvh.root()) else {
            panic!("root must be internal");
        };
        assert_eq!(left, right);
        assert_eq!(*bvh.node(left), BvhNode::Leaf { object: 0 });
        assert_eq!(bbox, bvh.objects()[0].bounding_box());

        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let rec = bvh.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 0.5);
    }

    #[test]
    fn two_primitives_become_direct_leaves() {
        let bvh = Bvh::new(vec![sphere(0.0, 0.0, -1.0, 0.5), sphere(2.0, 0.0, -1.0, 0.5)]).unwrap();
        assert_eq!(bvh.node_count(), 3);
        assert_eq!(bvh.depth(), 1);
        let BvhNode::Internal { left, right, .. } = *bvh.node(bvh.root()) else {
            panic!("root must be internal");
        };
        assert_eq!(*bvh.node(left), BvhNode::Leaf { object: 0 });
        assert_eq!(*bvh.node(right), BvhNode::Leaf { object: 1 });
    }

    #[test]
    fn median_split_along_longest_axis() {
        // Spread along x only, given out of order.
        let objects: Vec<Sphere> = [3.0, 0.0, 5.0, 1.0, 4.0, 2.0]
            .iter()
            .map(|&x| sphere(x * 3.0, 0.0, 0.0, 0.5))
            .collect();
        let bvh = Bvh::new(objects).unwrap();

        let BvhNode::Internal { left, right, .. } = *bvh.node(bvh.root()) else {
            panic!("root must be internal");
        };
        let left_box = match *bvh.node(left) {
            BvhNode::Internal { bbox, .. } => bbox,
            BvhNode::Leaf { .. } => panic!("left subtree holds three primitives"),
        };
        let right_box = match *bvh.node(right) {
            BvhNode::Internal { bbox, .. } => bbox,
            BvhNode::Leaf { .. } => panic!("right subtree holds three primitives"),
        };
        // Lower three centers (0, 3, 6) go left, upper three (9, 12, 15) right.
        assert_eq!(left_box.x, Interval::new(-0.5, 6.5));
        assert_eq!(right_box.x, Interval::new(8.5, 15.5));
        assert_eq!(bvh.len(), 6);
        assert_eq!(bvh.depth(), 3);
    }

    #[test]
    fn every_internal_box_encloses_its_children() {
        let objects: Vec<Sphere> = (0..37)
            .map(|i| {
                let f = i as f32;
                sphere((f * 7.3) % 11.0, (f * 3.1) % 5.0, -(f * 1.7) % 9.0, 0.3)
            })
            .collect();
        let bvh = Bvh::new(objects).unwrap();

        for id in 0..bvh.node_count() {
            if let BvhNode::Internal { left, right, bbox } = *bvh.node(id) {
                for child in [left, right] {
                    let child_box = bvh.node_box(child);
                    assert_eq!(Aabb::enclosing(&bbox, &child_box), bbox);
                }
            }
        }
        assert_eq!(bvh.len(), 37);
    }

    #[test]
    fn three_sphere_example_matches_brute_force() {
        let bvh = Bvh::new(three_spheres()).unwrap();
        let mut list = HittableList::new();
        for s in three_spheres() {
            list.add(Box::new(s));
        }

        let r = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, 0.0, -1.0));
        let from_tree = bvh.hit(&r, FORWARD).unwrap();
        let from_list = list.hit(&r, FORWARD).unwrap();

        assert_eq!(from_tree.t, from_list.t);
        assert_relative_eq!(from_tree.t, 0.5);
        assert_eq!(from_tree.p, from_list.p);
        assert_eq!(from_tree.normal, Vec3A::new(0.0, 0.0, 1.0));
        assert_eq!(from_tree.normal, from_list.normal);
    }

    #[test]
    fn range_build_ignores_objects_outside() {
        let bvh = Bvh::with_range(three_spheres(), 1..3).unwrap();
        assert_eq!(bvh.len(), 2);
        assert_eq!(bvh.objects().len(), 3);

        // The sphere at x = 0 is outside the range.
        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        assert!(bvh.hit(&r, FORWARD).is_none());

        let r = Ray::new(Vec3A::new(4.0, 0.0, 0.0), -Vec3A::Z);
        assert!(bvh.hit(&r, FORWARD).is_some());
        assert_eq!(bvh.root_box().x, Interval::new(1.5, 4.5));
    }

    #[test]
    fn trees_nest_inside_trees() {
        let inner = Bvh::new(three_spheres()).unwrap();
        let far = sphere(0.0, 0.0, -10.0, 1.0);
        let outer = Bvh::new(vec![
            Box::new(inner) as Box<dyn Hittable>,
            Box::new(far) as Box<dyn Hittable>,
        ])
        .unwrap();

        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let rec = outer.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 0.5);

        let r = Ray::new(Vec3A::new(0.0, 0.0, -3.0), -Vec3A::Z);
        let rec = outer.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 6.0);
    }

    #[test]
    fn flat_quads_are_found_through_padded_boxes() {
        let quads = vec![
            Quad::new(
                Vec3A::new(-1.0, -1.0, -2.0),
                Vec3A::X * 2.0,
                Vec3A::Y * 2.0,
                MaterialType::default(),
            ),
            Quad::new(
                Vec3A::new(-1.0, -1.0, -4.0),
                Vec3A::X * 2.0,
                Vec3A::Y * 2.0,
                MaterialType::default(),
            ),
            Quad::new(
                Vec3A::new(3.0, -1.0, -1.0),
                Vec3A::Z * -2.0,
                Vec3A::Y * 2.0,
                MaterialType::default(),
            ),
        ];
        let bvh = Bvh::new(quads).unwrap();

        // Axis-parallel ray: two zero direction components.
        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let rec = bvh.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 2.0);

        let r = Ray::new(Vec3A::ZERO, Vec3A::X);
        assert!(bvh.hit(&r, FORWARD).is_none());

        let r = Ray::new(Vec3A::new(0.0, 0.0, -2.0), Vec3A::X);
        let rec = bvh.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 3.0);
    }

    /// Wraps a primitive and records every query window it receives.
    struct Probe {
        inner: Sphere,
        calls: AtomicUsize,
        last_max: AtomicU32,
    }

    impl Probe {
        fn new(inner: Sphere) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                last_max: AtomicU32::new(f32::NAN.to_bits()),
            }
        }

        fn last_max(&self) -> f32 {
            f32::from_bits(self.last_max.load(Ordering::Relaxed))
        }
    }

    impl Hittable for Probe {
        fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.last_max.store(ray_t.max.to_bits(), Ordering::Relaxed);
            self.inner.hit(r, ray_t)
        }

        fn bounding_box(&self) -> Aabb {
            self.inner.bounding_box()
        }
    }

    #[test]
    fn right_child_is_queried_with_the_left_hit_as_bound() {
        // Near sphere first so it lands in the left leaf.
        let bvh = Bvh::new(vec![
            Probe::new(sphere(0.0, 0.0, -2.0, 1.0)),
            Probe::new(sphere(0.0, 0.0, -6.0, 1.0)),
        ])
        .unwrap();

        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let rec = bvh.hit(&r, FORWARD).unwrap();
        assert_relative_eq!(rec.t, 1.0);

        let objects = bvh.objects();
        assert_eq!(objects[0].calls.load(Ordering::Relaxed), 1);
        assert_eq!(objects[0].last_max(), f32::INFINITY);
        assert_eq!(objects[1].calls.load(Ordering::Relaxed), 1);
        assert_eq!(objects[1].last_max(), 1.0);
    }

    #[test]
    fn sibling_hit_at_equal_distance_is_not_accepted() {
        // Two coincident spheres: the right one can only tie, never beat.
        let bvh = Bvh::new(vec![
            Sphere::new(Vec3A::new(0.0, 0.0, -2.0), 1.0, MaterialType::metal(Vec3A::ONE, 0.0)),
            Sphere::new(Vec3A::new(0.0, 0.0, -2.0), 1.0, MaterialType::default()),
        ])
        .unwrap();

        let r = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let rec = bvh.hit(&r, FORWARD).unwrap();
        assert_eq!(rec.material, MaterialType::metal(Vec3A::ONE, 0.0));
    }

    #[test]
    fn box_miss_prunes_the_whole_subtree() {
        let bvh = Bvh::new(vec![
            Probe::new(sphere(0.0, 0.0, -2.0, 1.0)),
            Probe::new(sphere(3.0, 0.0, -2.0, 1.0)),
            Probe::new(sphere(6.0, 0.0, -2.0, 1.0)),
        ])
        .unwrap();

        let r = Ray::new(Vec3A::new(0.0, 10.0, 0.0), -Vec3A::Z);
        assert!(bvh.hit(&r, FORWARD).is_none());
        for probe in bvh.objects() {
            assert_eq!(probe.calls.load(Ordering::Relaxed), 0);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "ray direction must be finite and non-zero")]
    fn zero_direction_fails_fast() {
        use crate::error::RayError;

        assert_eq!(
            Ray::try_new(Vec3A::ZERO, Vec3A::ZERO, 0.0),
            Err(RayError::DegenerateDirection)
        );
        let bvh = Bvh::new(three_spheres()).unwrap();
        bvh.hit(&Ray::new(Vec3A::ZERO, Vec3A::ZERO), FORWARD);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "ray direction must be finite and non-zero")]
    fn nan_direction_fails_fast() {
        use crate::error::RayError;

        let direction = Vec3A::new(f32::NAN, 0.0, -1.0);
        assert_eq!(
            Ray::try_new(Vec3A::ZERO, direction, 0.0),
            Err(RayError::NonFinite)
        );
        let bvh = Bvh::new(three_spheres()).unwrap();
        bvh.hit(&Ray::new(Vec3A::ZERO, direction), FORWARD);
    }
}
