//! Scene nodes and the scene container.
//!
//! A [`SceneNode`] owns an ordered, unique-by-kind list of behaviors and its
//! child nodes. Every node is created with a [`Transform`] that stays attached
//! for the node's whole life. Hierarchy is structural only: child transforms
//! are not multiplied by their parent's matrix.

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use log::{debug, warn};

use crate::{
    data_structures::{
        behavior::{Behave, Behavior, BehaviorKind, BehaviorVariant},
        camera::Camera,
        transform::Transform,
    },
    error::{EngineError, Result},
    math::Vec3,
};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique node identity. Behaviors use it to refer back to their owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    behaviors: Vec<Behavior>,
    children: Vec<SceneNode>,
    parent: Option<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_transform(name, Transform::new())
    }

    pub fn with_position(name: impl Into<String>, position: Vec3) -> Self {
        Self::with_transform(name, Transform::from_position(position))
    }

    fn with_transform(name: impl Into<String>, transform: Transform) -> Self {
        let id = NodeId::next();
        let mut transform = Behavior::from(transform);
        transform.set_owner(Some(id));
        Self {
            id,
            name: name.into(),
            behaviors: vec![transform],
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches `behavior` unless a behavior of the same kind is already present.
    ///
    /// On a duplicate the existing behavior stays attached and the new one is dropped.
    pub fn add_behavior(&mut self, behavior: impl Into<Behavior>) -> Result<&mut Behavior> {
        let mut behavior = behavior.into();
        let kind = behavior.kind();
        if self.has(kind) {
            warn!("Node '{}' already has a {kind} behavior; keeping the original", self.name);
            return Err(EngineError::DuplicateBehavior {
                node: self.name.clone(),
                kind,
            });
        }
        behavior.set_owner(Some(self.id));
        self.behaviors.push(behavior);
        let idx = self.behaviors.len() - 1;
        Ok(&mut self.behaviors[idx])
    }

    /// Builder form of [`SceneNode::add_behavior`]. Duplicates are logged and dropped.
    pub fn with_behavior(mut self, behavior: impl Into<Behavior>) -> Self {
        let _ = self.add_behavior(behavior);
        self
    }

    pub fn has(&self, kind: BehaviorKind) -> bool {
        self.behaviors.iter().any(|b| b.kind() == kind)
    }

    pub fn get_behavior(&self, kind: BehaviorKind) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.kind() == kind)
    }

    pub fn get_behavior_mut(&mut self, kind: BehaviorKind) -> Option<&mut Behavior> {
        self.behaviors.iter_mut().find(|b| b.kind() == kind)
    }

    pub fn get<T: BehaviorVariant>(&self) -> Option<&T> {
        self.behaviors.iter().find_map(T::from_behavior)
    }

    pub fn get_mut<T: BehaviorVariant>(&mut self) -> Option<&mut T> {
        self.behaviors.iter_mut().find_map(T::from_behavior_mut)
    }

    /// Detaches the behavior of `kind`, running its destroy hook first.
    ///
    /// Returns `Ok(None)` when no such behavior is attached. The returned
    /// behavior has released its GPU resources and no longer has an owner. The
    /// transform cannot be removed.
    pub fn remove_behavior(&mut self, kind: BehaviorKind) -> Result<Option<Behavior>> {
        if kind == BehaviorKind::Transform {
            warn!("Refusing to remove the transform of node '{}'", self.name);
            return Err(EngineError::TransformRequired(self.name.clone()));
        }
        let Some(idx) = self.behaviors.iter().position(|b| b.kind() == kind) else {
            return Ok(None);
        };
        self.behaviors[idx].destroy();
        let mut removed = self.behaviors.remove(idx);
        removed.set_owner(None);
        Ok(Some(removed))
    }

    pub fn transform(&self) -> &Transform {
        match self.behaviors.first() {
            Some(Behavior::Transform(t)) => t,
            _ => unreachable!("node '{}' lost its transform", self.name),
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self.behaviors.first_mut() {
            Some(Behavior::Transform(t)) => t,
            _ => unreachable!("node '{}' lost its transform", self.name),
        }
    }

    /// Attached behaviors in insertion order. The transform always comes first.
    pub fn behaviors(&self) -> impl Iterator<Item = &Behavior> {
        self.behaviors.iter()
    }

    pub fn add_child(&mut self, mut child: SceneNode) -> &mut SceneNode {
        child.parent = Some(self.id);
        self.children.push(child);
        let idx = self.children.len() - 1;
        &mut self.children[idx]
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Calls `f` on this node and then every descendant, depth first.
    pub fn visit(&self, f: &mut dyn FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn start(&mut self) {
        debug!("Starting node '{}' {}", self.name, self.id);
        self.visit_mut(&mut |node: &mut SceneNode| {
            node.behaviors.iter_mut().for_each(Behave::start)
        });
    }

    pub fn update(&mut self, dt: Duration) {
        self.visit_mut(&mut |node: &mut SceneNode| {
            for behavior in &mut node.behaviors {
                behavior.update(dt);
            }
        });
    }

    /// Runs every destroy hook on this node and its descendants.
    pub fn destroy(&mut self) {
        self.visit_mut(&mut |node: &mut SceneNode| {
            node.behaviors.iter_mut().for_each(Behave::destroy)
        });
    }
}

/// A camera node plus the drawable nodes it looks at.
#[derive(Debug)]
pub struct Scene {
    pub camera: SceneNode,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera: SceneNode::new("Camera").with_behavior(camera),
            nodes: Vec::new(),
        }
    }

    pub fn add(&mut self, node: SceneNode) -> &mut SceneNode {
        self.nodes.push(node);
        let idx = self.nodes.len() - 1;
        &mut self.nodes[idx]
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.get::<Camera>()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.get_mut::<Camera>()
    }

    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.name() == name)
    }

    pub fn start(&mut self) {
        for node in &mut self.nodes {
            node.start();
        }
        self.camera.start();
    }

    /// Updates drawable nodes first, then the camera node.
    pub fn update(&mut self, dt: Duration) {
        for node in &mut self.nodes {
            node.update(dt);
        }
        self.camera.update(dt);
    }

    pub fn destroy(&mut self) {
        for node in &mut self.nodes {
            node.destroy();
        }
        self.camera.destroy();
    }
}
