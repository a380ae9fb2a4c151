//! Scene attachment: the show/hide protocol shared by sprites and tile maps.
//!
//! An [`Attachment`] pairs a weak parent handle with the `visible` flag. `show` is
//! the only way to change the flag and the only way a node ever enters or leaves
//! a parent's render list, so the node is in the list iff `visible` is true.

use std::{cell::RefCell, rc::Rc, rc::Weak};

use cgmath::Vector2;

use crate::{
    context::{SharedSurface, Surface},
    data_structures::transform_node::NodeRef,
};

#[derive(Debug, Default)]
pub struct Attachment {
    parent: Option<Weak<RefCell<Surface>>>,
    visible: bool,
}

impl Attachment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parent if one is assigned and still alive.
    pub fn parent(&self) -> Option<SharedSurface> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// The parent's current position, looked up live.
    ///
    /// `None` if there is no parent, it was dropped, or it is mutably borrowed.
    pub fn parent_position(&self) -> Option<Vector2<f32>> {
        let parent = self.parent()?;
        let position = parent.try_borrow().ok().map(|surface| surface.position);
        if position.is_none() {
            log::warn!("Parent surface is borrowed, its position can't be read.");
        }
        position
    }

    /// Hides `node` and then replaces the parent.
    ///
    /// Keeps the old parent if `node` can't be detached from it.
    pub fn set_parent(&mut self, parent: Option<&SharedSurface>, node: &NodeRef, owner: &str) {
        if self.visible {
            self.show(false, node, owner);
            if self.visible {
                log::warn!("{}: Still attached, keeping the old parent.", owner);
                return;
            }
        }
        self.parent = parent.map(Rc::downgrade);
    }

    pub fn show(&mut self, do_show: bool, node: &NodeRef, owner: &str) {
        let parent = match &self.parent {
            None => {
                log::warn!("{}: No parent assigned to {}.", owner, owner.to_lowercase());
                return;
            }
            Some(weak) => weak.upgrade(),
        };

        if do_show && !self.visible {
            let Some(parent) = parent else {
                log::warn!("{}: Parent of {} no longer exists.", owner, owner.to_lowercase());
                return;
            };
            let Ok(mut surface) = parent.try_borrow_mut() else {
                log::warn!("{}: Parent is busy, can't attach.", owner);
                return;
            };
            surface.canvas_mut().add(Rc::clone(node));
        } else if !do_show && self.visible && !self.detach(parent, node, owner) {
            return;
        }

        self.visible = do_show;
    }

    /// Forced detach used on destruction.
    ///
    /// Never fails, but if the parent is borrowed at this point the node stays in
    /// its render list until the parent drops it. A warning is logged then.
    pub fn release(&mut self, node: &NodeRef, owner: &str) {
        if !self.visible {
            return;
        }
        let parent = self.parent.as_ref().and_then(Weak::upgrade);
        self.detach(parent, node, owner);
        self.visible = false;
    }

    /// Removes `node` from the parent's render list.
    ///
    /// `false` only if the node is still in the list afterwards.
    fn detach(&self, parent: Option<SharedSurface>, node: &NodeRef, owner: &str) -> bool {
        // A dropped parent took its render list with it.
        let Some(parent) = parent else {
            return true;
        };
        let Ok(id) = node.try_borrow().map(|n| n.id()) else {
            log::warn!("{}: Node is busy, can't detach.", owner);
            return false;
        };
        match parent.try_borrow_mut() {
            Ok(mut surface) => {
                if !surface.canvas_mut().remove(id) {
                    log::debug!("{}: Node {:?} was not attached.", owner, id);
                }
                true
            }
            Err(_) => {
                log::warn!("{}: Parent is busy, can't detach node {:?}.", owner, id);
                false
            }
        }
    }
}
