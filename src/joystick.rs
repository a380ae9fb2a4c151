//! On-screen virtual joystick for touch devices.
//!
//! The joystick is drawn as two sprites: a translucent background covering its
//! bounds and a thumb half that size. Dragging moves the thumb towards the touch,
//! capped at the joystick radius, and exposes the deflection as [`joy_pos`] with
//! both axes in `[-1, 1]`. Releasing recenters it.
//!
//! Touch positions are expected in the same parent-relative space as the
//! joystick's own position.
//!
//! [`joy_pos`]: VirtualJoystick::joy_pos

use cgmath::{InnerSpace, Vector2, Zero};

use crate::{
    context::SharedSurface,
    data_structures::{instruction::Rgba, sprite::Sprite},
    flow::{Flow, Touch},
};

#[derive(Debug)]
pub struct VirtualJoystick {
    position: Vector2<f32>,
    size: Vector2<f32>,
    joy_pos: Vector2<f32>,
    background: Sprite,
    thumb: Sprite,
}

impl VirtualJoystick {
    pub fn new(
        parent: &SharedSurface,
        position: impl Into<Vector2<f32>>,
        size: impl Into<Vector2<f32>>,
    ) -> Self {
        let background = Sprite::builder()
            .parent(parent)
            .color(Rgba::new(0.5, 0.5, 0.5, 0.5))
            .build();
        let thumb = Sprite::builder()
            .parent(parent)
            .color(Rgba::new(0.75, 0.75, 0.75, 1.0))
            .build();
        let mut joystick = Self {
            position: position.into(),
            size: size.into(),
            joy_pos: Vector2::zero(),
            background,
            thumb,
        };
        joystick.layout();
        joystick
    }

    /// Current deflection, each axis in `[-1, 1]`.
    pub fn joy_pos(&self) -> Vector2<f32> {
        self.joy_pos
    }

    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Vector2<f32>>) {
        self.position = position.into();
        self.layout();
    }

    pub fn size(&self) -> Vector2<f32> {
        self.size
    }

    pub fn set_size(&mut self, size: impl Into<Vector2<f32>>) {
        self.size = size.into();
        self.layout();
    }

    pub fn center(&self) -> Vector2<f32> {
        self.position + self.size / 2.0
    }

    pub fn background(&self) -> &Sprite {
        &self.background
    }

    pub fn thumb(&self) -> &Sprite {
        &self.thumb
    }

    pub fn visible(&self) -> bool {
        self.background.visible()
    }

    pub fn show(&mut self, do_show: bool) {
        self.background.show(do_show);
        self.thumb.show(do_show);
    }

    pub fn on_touch_move(&mut self, touch: &Touch) {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            log::warn!("VirtualJoystick: Can't track touches without a size.");
            return;
        }
        let center = self.center();
        let delta = touch.position - center;
        let angle = delta.y.atan2(delta.x);
        let radius = self.size.x / 2.0;
        let distance = delta.magnitude().min(radius);

        let deflection = Vector2::new(distance * angle.cos(), distance * angle.sin());
        self.thumb
            .set_position(center + deflection - self.size / 4.0);
        self.joy_pos = Vector2::new(
            deflection.x / (self.size.x / 2.0),
            deflection.y / (self.size.y / 2.0),
        );
    }

    pub fn on_touch_up(&mut self, _touch: &Touch) {
        self.thumb.set_position(self.position + self.size / 4.0);
        self.joy_pos = Vector2::zero();
    }

    fn layout(&mut self) {
        self.background.set_position(self.position);
        self.background.set_size(self.size);
        self.thumb.set_position(self.position + self.size / 4.0);
        self.thumb.set_size(self.size / 2.0);
    }
}

impl Flow for VirtualJoystick {
    fn on_init(&mut self, _surface: &SharedSurface) {
        self.show(true);
    }

    fn on_update(&mut self, _surface: &SharedSurface) {}

    fn on_touch_move(&mut self, _surface: &SharedSurface, touch: &Touch) {
        VirtualJoystick::on_touch_move(self, touch);
    }

    fn on_touch_up(&mut self, _surface: &SharedSurface, touch: &Touch) {
        VirtualJoystick::on_touch_up(self, touch);
    }
}
