//! The network node variant.

use rf_graph::NodeKind;

use crate::booster::PressureBooster;
use crate::pipe::Pipe;
use crate::separator::Separator;
use crate::stream::Stream;
use crate::variables::{RealVarId, VariableStore};
use crate::well::Well;

/// A node of the production network.
#[derive(Debug)]
pub enum Component {
    Well(Well),
    Pipe(Pipe),
    Separator(Separator),
    Booster(PressureBooster),
}

/// How much of a node's outflow goes down one outlet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Share {
    /// Scaled by a routing fraction variable.
    Variable(RealVarId),
    /// The whole outflow (separators, boosters).
    Full,
}

impl Share {
    pub fn value(self, store: &VariableStore) -> f64 {
        match self {
            Share::Variable(id) => store.real_value(id),
            Share::Full => 1.0,
        }
    }
}

/// A declared downstream connection, still referring to its target by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Outlet<'a> {
    pub target: &'a str,
    pub share: Share,
}

impl Component {
    pub fn name(&self) -> &str {
        match self {
            Component::Well(w) => &w.name,
            Component::Pipe(p) => &p.name,
            Component::Separator(s) => &s.name,
            Component::Booster(b) => &b.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Component::Well(_) => NodeKind::Well,
            Component::Pipe(_) => NodeKind::Pipe,
            Component::Separator(_) => NodeKind::Separator,
            Component::Booster(_) => NodeKind::Booster,
        }
    }

    /// End pipes deliver out of the network.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Component::Pipe(p) if p.is_end_pipe())
    }

    /// Injection wells take no part in the surface network.
    pub fn in_network(&self) -> bool {
        !matches!(self, Component::Well(w) if !w.is_producer())
    }

    pub fn streams(&self) -> &[Stream] {
        match self {
            Component::Well(w) => w.streams(),
            Component::Pipe(p) => p.streams(),
            Component::Separator(s) => s.streams(),
            Component::Booster(b) => b.streams(),
        }
    }

    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        match self {
            Component::Well(w) => w.set_streams(streams),
            Component::Pipe(p) => p.set_streams(streams),
            Component::Separator(s) => s.set_streams(streams),
            Component::Booster(b) => b.set_streams(streams),
        }
    }

    /// Streams this node sends downstream, before outlet shares are applied.
    pub fn outflow(&self, store: &VariableStore) -> Vec<Stream> {
        match self {
            Component::Separator(s) => s.outflow(store),
            other => other.streams().to_vec(),
        }
    }

    pub fn outlets(&self) -> Vec<Outlet<'_>> {
        match self {
            Component::Well(w) => w
                .connections
                .iter()
                .map(|c| Outlet {
                    target: &c.target,
                    share: Share::Variable(c.fraction),
                })
                .collect(),
            Component::Pipe(p) => p
                .connections()
                .iter()
                .map(|c| Outlet {
                    target: &c.target,
                    share: Share::Variable(c.fraction),
                })
                .collect(),
            Component::Separator(s) => vec![Outlet {
                target: &s.outlet,
                share: Share::Full,
            }],
            Component::Booster(b) => vec![Outlet {
                target: &b.outlet,
                share: Share::Full,
            }],
        }
    }

    pub fn as_well(&self) -> Option<&Well> {
        match self {
            Component::Well(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_well_mut(&mut self) -> Option<&mut Well> {
        match self {
            Component::Well(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_pipe(&self) -> Option<&Pipe> {
        match self {
            Component::Pipe(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_pipe_mut(&mut self) -> Option<&mut Pipe> {
        match self {
            Component::Pipe(p) => Some(p),
            _ => None,
        }
    }
}
