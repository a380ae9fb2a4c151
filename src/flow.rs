//! Frame and input adapter between a host application and the core.
//!
//! The core itself never schedules anything. This module is the thin layer a host
//! uses to drive it: a [`Stage`] owns the root [`Surface`] and a list of [`Flow`]s,
//! advances them once per frame, forwards touch input and hands the surface's render
//! list to a [`Renderer`].
//!
//! # Lifecycle
//!
//! Per frame the host should
//! 1. deliver pending input with [`Stage::dispatch`]
//! 2. call [`Stage::frame`], which calls `on_update` on every flow in order
//! 3. call [`Stage::render`] to draw the attached nodes
//!
//! Flows decide themselves whether collision queries run before or after their
//! entities move; nothing is snapshotted between frames.

use std::fmt::Debug;

use cgmath::Vector2;

use crate::{
    context::{SharedSurface, Surface},
    render::Renderer,
};

/// A pointer or finger position in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Touch {
    pub position: Vector2<f32>,
}

impl Touch {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchEvent {
    Down(Touch),
    Move(Touch),
    Up(Touch),
}

/// A self-contained part of a game: owns entities, reacts to input and updates them.
pub trait Flow {
    /// Called once when the flow is added to a stage.
    fn on_init(&mut self, _surface: &SharedSurface) {}

    /// Called once per frame.
    fn on_update(&mut self, surface: &SharedSurface);

    fn on_touch_down(&mut self, _surface: &SharedSurface, _touch: &Touch) {}

    fn on_touch_move(&mut self, _surface: &SharedSurface, _touch: &Touch) {}

    fn on_touch_up(&mut self, _surface: &SharedSurface, _touch: &Touch) {}
}

impl Debug for dyn Flow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Flow")
    }
}

#[derive(Debug)]
pub struct Stage {
    surface: SharedSurface,
    flows: Vec<Box<dyn Flow>>,
    frame: u64,
}

impl Stage {
    pub fn new(position: impl Into<Vector2<f32>>, size: impl Into<Vector2<f32>>) -> Self {
        Self {
            surface: Surface::shared(position, size),
            flows: Vec::new(),
            frame: 0,
        }
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn add_flow(&mut self, mut flow: Box<dyn Flow>) {
        flow.on_init(&self.surface);
        self.flows.push(flow);
    }

    /// Drops all flows, and with them their entities, in reverse order.
    pub fn clear_flows(&mut self) {
        while self.flows.pop().is_some() {}
    }

    pub fn frame(&mut self) {
        self.frame += 1;
        for flow in self.flows.iter_mut() {
            flow.on_update(&self.surface);
        }
    }

    pub fn dispatch(&mut self, event: TouchEvent) {
        for flow in self.flows.iter_mut() {
            match &event {
                TouchEvent::Down(touch) => flow.on_touch_down(&self.surface, touch),
                TouchEvent::Move(touch) => flow.on_touch_move(&self.surface, touch),
                TouchEvent::Up(touch) => flow.on_touch_up(&self.surface, touch),
            }
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        match self.surface.try_borrow() {
            Ok(surface) => surface.canvas().render(renderer),
            Err(_) => log::error!("Unable to render, the surface is borrowed"),
        }
    }
}

/// Installs `env_logger` unless a logger is already set.
pub fn init_logging() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
