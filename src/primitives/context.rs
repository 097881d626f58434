//! Render context - what a render function can see and declare.
//!
//! The context is passed explicitly into every render call. It carries the
//! instance's props, the children handed to it, and its hook storage, so
//! `use_state` knows its owner without any ambient "current instance".

use std::rc::Weak;

use super::types::{Handler, MountCallback, Node, Props};
use crate::engine::{Key, UnmountCallback};
use crate::error::Result;
use crate::pipeline::{EventContext, MenuHandle};
use crate::state::{Hooks, Scheduler, State};
use crate::types::ActionMask;

/// Declarations collected from one render call.
#[derive(Default)]
pub(crate) struct Effects {
    pub mount: Vec<MountCallback>,
    pub unmount: Vec<UnmountCallback>,
    pub handler: Option<Handler>,
}

/// Context of one render call of one instance.
pub struct RenderContext<'a> {
    props: &'a Props,
    children: &'a [Node],
    hooks: &'a Hooks,
    scheduler: &'a Weak<Scheduler>,
    handle: &'a MenuHandle,
    cursor: usize,
    effects: Effects,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        props: &'a Props,
        children: &'a [Node],
        hooks: &'a Hooks,
        scheduler: &'a Weak<Scheduler>,
        handle: &'a MenuHandle,
    ) -> Self {
        Self {
            props,
            children,
            hooks,
            scheduler,
            handle,
            cursor: 0,
            effects: Effects::default(),
        }
    }

    pub fn props(&self) -> &'a Props {
        self.props
    }

    /// Nodes the parent passed to this component.
    pub fn children(&self) -> &'a [Node] {
        self.children
    }

    /// Handle to the menu being rendered.
    pub fn handle(&self) -> &MenuHandle {
        self.handle
    }

    /// Declare the next state cell; `init` runs only on first render.
    ///
    /// Cells are matched by declaration order, so call `use_state` the same
    /// number of times and in the same order on every render.
    pub fn use_state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Result<State<T>> {
        let index = self.cursor;
        self.cursor += 1;
        self.hooks.ordered(index, self.scheduler, init)
    }

    /// Declare a state cell by key instead of by order.
    pub fn use_state_keyed<T: 'static>(
        &mut self,
        key: impl Into<Key>,
        init: impl FnOnce() -> T,
    ) -> Result<State<T>> {
        self.hooks.keyed(key.into(), self.scheduler, init)
    }

    /// Run `callback` once after this instance's first pass commits.
    ///
    /// Only the declarations of the mounting render are kept. State writes
    /// inside the callback queue one more pass.
    pub fn on_mount<F>(&mut self, callback: F)
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.effects.mount.push(Box::new(callback));
    }

    /// Run `callback` when this instance is unmounted.
    ///
    /// Each render replaces the previous render's declarations.
    pub fn on_unmount<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.effects.unmount.push(Box::new(callback));
    }

    /// Catch events that bubble up from leaves below this instance.
    pub fn on_event<F>(&mut self, mask: ActionMask, callback: F)
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.effects.handler = Some(Handler::new(mask, callback));
    }

    pub(crate) fn into_effects(self) -> Effects {
        self.effects
    }
}
