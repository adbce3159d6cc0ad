//! Attachable behaviors.
//!
//! A [`Behavior`] is one of a closed set of kinds. Each kind implements
//! [`Behave`] for the lifecycle hooks it cares about and [`BehaviorVariant`]
//! so nodes can hand out typed references (`node.get::<Camera>()`).

use std::{fmt, time::Duration};

use crate::data_structures::{
    camera::Camera, mesh_renderer::MeshRenderer, scene_graph::NodeId, transform::Transform,
};

/// Tag identifying a behavior kind. A node holds at most one behavior per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Transform,
    Camera,
    MeshRenderer,
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BehaviorKind::Transform => "Transform",
            BehaviorKind::Camera => "Camera",
            BehaviorKind::MeshRenderer => "MeshRenderer",
        };
        f.write_str(name)
    }
}

/// Lifecycle hooks. Every hook is optional.
pub trait Behave {
    /// Called once when the owning node is started.
    fn start(&mut self) {}

    /// Called every frame with the time elapsed since the previous frame.
    fn update(&mut self, _dt: Duration) {}

    /// Called right before the behavior is detached; release owned GPU resources here.
    fn destroy(&mut self) {}
}

#[derive(Debug)]
pub enum Behavior {
    Transform(Transform),
    Camera(Camera),
    MeshRenderer(MeshRenderer),
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Transform(_) => BehaviorKind::Transform,
            Behavior::Camera(_) => BehaviorKind::Camera,
            Behavior::MeshRenderer(_) => BehaviorKind::MeshRenderer,
        }
    }

    /// Node this behavior is attached to, if any.
    pub fn owner(&self) -> Option<NodeId> {
        match self {
            Behavior::Transform(t) => t.owner,
            Behavior::Camera(c) => c.owner,
            Behavior::MeshRenderer(m) => m.owner,
        }
    }

    pub(crate) fn set_owner(&mut self, id: Option<NodeId>) {
        let owner = match self {
            Behavior::Transform(t) => &mut t.owner,
            Behavior::Camera(c) => &mut c.owner,
            Behavior::MeshRenderer(m) => &mut m.owner,
        };
        *owner = id;
    }

    fn hooks(&mut self) -> &mut dyn Behave {
        match self {
            Behavior::Transform(t) => t,
            Behavior::Camera(c) => c,
            Behavior::MeshRenderer(m) => m,
        }
    }
}

impl Behave for Behavior {
    fn start(&mut self) {
        self.hooks().start();
    }

    fn update(&mut self, dt: Duration) {
        self.hooks().update(dt);
    }

    fn destroy(&mut self) {
        self.hooks().destroy();
    }
}

/// Typed access to one variant of [`Behavior`].
pub trait BehaviorVariant: Behave + Into<Behavior> {
    const KIND: BehaviorKind;

    fn from_behavior(behavior: &Behavior) -> Option<&Self>;

    fn from_behavior_mut(behavior: &mut Behavior) -> Option<&mut Self>;
}

macro_rules! behavior_variant {
    ($ty:ident) => {
        impl From<$ty> for Behavior {
            fn from(b: $ty) -> Self {
                Behavior::$ty(b)
            }
        }

        impl BehaviorVariant for $ty {
            const KIND: BehaviorKind = BehaviorKind::$ty;

            fn from_behavior(behavior: &Behavior) -> Option<&Self> {
                match behavior {
                    Behavior::$ty(b) => Some(b),
                    _ => None,
                }
            }

            fn from_behavior_mut(behavior: &mut Behavior) -> Option<&mut Self> {
                match behavior {
                    Behavior::$ty(b) => Some(b),
                    _ => None,
                }
            }
        }
    };
}

behavior_variant!(Transform);
behavior_variant!(Camera);
behavior_variant!(MeshRenderer);
