//! Transform nodes: ordered instruction groups forming one renderable unit.
//!
//! A node is created and exclusively owned by one entity (a sprite or a tile
//! strategy). The render list of a parent only ever holds a shared reference to it
//! while the owner is visible.

use std::{
    cell::RefCell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use cgmath::{Deg, Vector2, Zero};

use crate::data_structures::instruction::{Instruction, Rectangle, Rgba};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a transform node inside a render list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Shared handle to a node. Owners keep one, render lists keep another while attached.
pub type NodeRef = Rc<RefCell<TransformNode>>;

#[derive(Debug)]
pub struct TransformNode {
    id: NodeId,
    instructions: Vec<Instruction>,
}

impl TransformNode {
    pub fn new() -> Self {
        Self {
            id: NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)),
            instructions: Vec::new(),
        }
    }

    pub fn shared(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Appends an instruction and returns its index for later mutation.
    pub fn add(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub fn clear(&mut self) {
        self.instructions.clear();
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, idx: usize) -> Option<&Instruction> {
        self.instructions.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Instruction> {
        self.instructions.get_mut(idx)
    }

    pub fn translation(&self, idx: usize) -> Vector2<f32> {
        match self.get(idx) {
            Some(Instruction::Translate(v)) => *v,
            _ => Vector2::zero(),
        }
    }

    pub fn set_translation(&mut self, idx: usize, value: Vector2<f32>) {
        match self.get_mut(idx) {
            Some(Instruction::Translate(v)) => *v = value,
            other => log::warn!("Instruction {} is not a translate: {:?}", idx, other),
        }
    }

    pub fn rotation(&self, idx: usize) -> Deg<f32> {
        match self.get(idx) {
            Some(Instruction::Rotate(angle)) => *angle,
            _ => Deg(0.0),
        }
    }

    pub fn set_rotation(&mut self, idx: usize, value: Deg<f32>) {
        match self.get_mut(idx) {
            Some(Instruction::Rotate(angle)) => *angle = value,
            other => log::warn!("Instruction {} is not a rotate: {:?}", idx, other),
        }
    }

    pub fn color(&self, idx: usize) -> Rgba {
        match self.get(idx) {
            Some(Instruction::Color(c)) => *c,
            _ => Rgba::WHITE,
        }
    }

    pub fn set_color(&mut self, idx: usize, value: Rgba) {
        match self.get_mut(idx) {
            Some(Instruction::Color(c)) => *c = value,
            other => log::warn!("Instruction {} is not a color: {:?}", idx, other),
        }
    }

    pub fn rectangle(&self, idx: usize) -> Option<&Rectangle> {
        match self.get(idx) {
            Some(Instruction::Rectangle(rect)) => Some(rect),
            _ => None,
        }
    }

    pub fn rectangle_mut(&mut self, idx: usize) -> Option<&mut Rectangle> {
        match self.get_mut(idx) {
            Some(Instruction::Rectangle(rect)) => Some(rect),
            _ => None,
        }
    }

    /// Iterates over all rectangles in instruction order.
    pub fn rectangles(&self) -> impl Iterator<Item = &Rectangle> {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::Rectangle(rect) => Some(rect),
            _ => None,
        })
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}
