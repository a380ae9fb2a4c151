//! Render lists and the seams towards the external renderer.
//!
//! This module defines the [`Canvas`], the render list of a parent surface, and
//! flattens the transform nodes attached to it into [`DrawCall`]s. Drawing itself is
//! delegated to a [`Renderer`]; tile maps that composite into an offscreen buffer do
//! so through an [`OffscreenTarget`].
//!
//! # Key types
//!
//! - [`Canvas`] is the ordered render list of attached transform nodes
//! - [`DrawCall`] is one textured, tinted rectangle with its world transform
//! - [`DrawCallRaw`] is the GPU-ready representation of a draw call
//! - [`Renderer`] and [`OffscreenTarget`] are implemented by the host renderer
//!

use cgmath::{Matrix3, Point2, SquareMatrix, Vector2, Vector3};

use crate::data_structures::{
    instruction::{ImageSource, Instruction, Rgba, TextureHandle},
    transform_node::{NodeId, NodeRef},
};

/// One rectangle to draw: local rectangle, world transform, tint and image.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub node: NodeId,
    pub transform: Matrix3<f32>,
    pub position: Vector2<f32>,
    pub size: Vector2<f32>,
    pub color: Rgba,
    pub image: Option<ImageSource>,
}

impl DrawCall {
    /// Corners of the rectangle in parent space, counter-clockwise from the local origin corner.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        let (x, y) = (self.position.x, self.position.y);
        let (w, h) = (self.size.x, self.size.y);
        let apply = |px: f32, py: f32| {
            let v = self.transform * Vector3::new(px, py, 1.0);
            Point2::new(v.x, v.y)
        };
        [
            apply(x, y),
            apply(x + w, y),
            apply(x + w, y + h),
            apply(x, y + h),
        ]
    }

    pub fn to_raw(&self) -> DrawCallRaw {
        DrawCallRaw {
            transform: self.transform.into(),
            rect: [self.position.x, self.position.y, self.size.x, self.size.y],
            color: self.color.to_array(),
        }
    }
}

/**
 * The raw draw call is the data a GPU renderer uploads per rectangle.
 *
 * transform: the 2D homogeneous world matrix (column major)
 * rect: local x, y, width and height
 * color: the tint
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawCallRaw {
    transform: [[f32; 3]; 3],
    rect: [f32; 4],
    color: [f32; 4],
}

/// The external renderer that turns draw calls into pixels.
pub trait Renderer {
    fn draw(&mut self, call: &DrawCall);
}

/// An offscreen render target used to composite many rectangles into one texture.
///
/// Implementors own the backing storage. `release` frees it and must tolerate
/// being called on an already released target.
pub trait OffscreenTarget {
    fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()>;

    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    fn draw_rectangle(
        &mut self,
        position: Vector2<f32>,
        size: Vector2<f32>,
        image: &ImageSource,
    ) -> anyhow::Result<()>;

    /// The target's content as a texture usable by a rectangle.
    fn texture(&self) -> TextureHandle;

    fn release(&mut self);
}

/// The render list of a surface.
///
/// Nodes can only be added or removed by the scene attachment protocol; everybody
/// else gets read access.
#[derive(Debug, Default)]
pub struct Canvas {
    nodes: Vec<NodeRef>,
}

impl Canvas {
    pub(crate) fn add(&mut self, node: NodeRef) {
        self.nodes.push(node);
    }

    /// Removes the node with the given id, returns whether it was present.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.borrow().id() != id);
        before != self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.count(id) > 0
    }

    pub fn count(&self, id: NodeId) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.borrow().id() == id)
            .count()
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /**
     * Walks all attached nodes in order and resolves the matrix stack.
     *
     * Every node starts with an identity transform and a white tint, so nodes
     * can't leak state into each other. Unbalanced pops are ignored.
     */
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        let mut calls = Vec::new();
        for node in &self.nodes {
            let node = node.borrow();
            let mut current = Matrix3::identity();
            let mut stack: Vec<Matrix3<f32>> = Vec::new();
            let mut color = Rgba::WHITE;
            for instruction in node.instructions() {
                match instruction {
                    Instruction::PushMatrix => stack.push(current),
                    Instruction::PopMatrix => match stack.pop() {
                        Some(matrix) => current = matrix,
                        None => log::warn!("Unbalanced PopMatrix in node {:?}", node.id()),
                    },
                    Instruction::Translate(_) | Instruction::Rotate(_) => {
                        if let Some(matrix) = instruction.to_matrix() {
                            current = current * matrix;
                        }
                    }
                    Instruction::Color(c) => color = *c,
                    Instruction::Rectangle(rect) => calls.push(DrawCall {
                        node: node.id(),
                        transform: current,
                        position: rect.position,
                        size: rect.size,
                        color,
                        image: rect.image.clone(),
                    }),
                }
            }
        }
        calls
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        for call in self.draw_calls() {
            renderer.draw(&call);
        }
    }
}
