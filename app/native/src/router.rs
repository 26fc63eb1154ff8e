//! Routing of newly seen windows to workspaces.
//!
//! Routes are consulted in registration order; the first one returning a target
//! wins. When none does, [`RouterOptions`] picks the fallback.

use std::fmt;

use tracing::debug;

use crate::config::{RouteRule, RouterOptions};
use crate::model::{Window, WorkspaceId};
use crate::rules::matches_window;

/// A workspace named by a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkspaceTarget {
    Id(WorkspaceId),
    Name(String),
}

impl fmt::Display for WorkspaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

type Route = Box<dyn Fn(&Window) -> Option<WorkspaceTarget>>;

pub struct Router {
    routes: Vec<Route>,
    options: RouterOptions,
}

impl Default for Router {
    fn default() -> Self { Self::new(RouterOptions::default()) }
}

impl Router {
    #[must_use]
    pub fn new(options: RouterOptions) -> Self { Self { routes: Vec::new(), options } }

    #[must_use]
    pub const fn options(&self) -> RouterOptions { self.options }

    pub fn add(&mut self, route: impl Fn(&Window) -> Option<WorkspaceTarget> + 'static) {
        self.routes.push(Box::new(route));
    }

    /// Adds a configured rule. The rule must be prepared.
    pub fn add_rule(&mut self, route: RouteRule) {
        let RouteRule { rule, workspace } = route;
        self.add(move |window| matches_window(&rule, window).then(|| WorkspaceTarget::Name(workspace.clone())));
    }

    /// Removes every route. The fallback option is kept.
    pub fn clear(&mut self) { self.routes.clear(); }

    #[must_use]
    pub fn route(&self, window: &Window) -> Option<WorkspaceTarget> {
        let target = self.routes.iter().find_map(|route| route(window));
        if let Some(target) = &target {
            debug!(%window, %target, "window routed");
        }
        target
    }
}
