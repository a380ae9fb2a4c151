use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Once,
};

use sprite_ngin::{
    CollisionMode, Sprite, Vector2,
    audio::{SharedSound, SoundEffect, play_from_start},
    context::{SharedSurface, Surface},
    data_structures::{
        instruction::{ImageSource, TextureHandle},
        transform_node::NodeId,
    },
    flow::{Flow, Touch, init_logging},
    render::{DrawCall, OffscreenTarget, Renderer},
};

static LOGGER: Once = Once::new();

pub(crate) fn init_logger() {
    LOGGER.call_once(init_logging);
}

pub(crate) fn surface(x: f32, y: f32, w: f32, h: f32) -> SharedSurface {
    Surface::shared((x, y), (w, h))
}

pub(crate) fn assert_vec_eq(actual: Vector2<f32>, expected: Vector2<f32>) {
    let close = (actual.x - expected.x).abs() < 1e-4 && (actual.y - expected.y).abs() < 1e-4;
    assert!(close, "expected {:?}, got {:?}", expected, actual);
}

#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, call: &DrawCall) {
        self.calls.push(call.clone());
    }
}

/// Counters shared between a [`MockTarget`] and the test that created it.
#[derive(Clone, Default)]
pub(crate) struct TargetStats {
    pub releases: Rc<Cell<u32>>,
    pub resizes: Rc<Cell<u32>>,
    pub clears: Rc<Cell<u32>>,
    pub drawn: Rc<RefCell<Vec<(Vector2<f32>, ImageSource)>>>,
}

impl TargetStats {
    pub fn drawn_at(&self, position: (f32, f32)) -> Option<ImageSource> {
        self.drawn
            .borrow()
            .iter()
            .find(|(p, _)| *p == Vector2::new(position.0, position.1))
            .map(|(_, image)| image.clone())
    }
}

pub(crate) struct MockTarget {
    stats: TargetStats,
    size: (u32, u32),
}

impl MockTarget {
    pub fn new() -> (Self, TargetStats) {
        let stats = TargetStats::default();
        (
            Self {
                stats: stats.clone(),
                size: (0, 0),
            },
            stats,
        )
    }
}

impl OffscreenTarget for MockTarget {
    fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        self.stats.resizes.set(self.stats.resizes.get() + 1);
        self.size = (width, height);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self) {
        self.stats.clears.set(self.stats.clears.get() + 1);
        self.stats.drawn.borrow_mut().clear();
    }

    fn draw_rectangle(
        &mut self,
        position: Vector2<f32>,
        _size: Vector2<f32>,
        image: &ImageSource,
    ) -> anyhow::Result<()> {
        self.stats.drawn.borrow_mut().push((position, image.clone()));
        Ok(())
    }

    fn texture(&self) -> TextureHandle {
        TextureHandle(7)
    }

    fn release(&mut self) {
        self.stats.releases.set(self.stats.releases.get() + 1);
    }
}

#[derive(Default)]
pub(crate) struct MockSound {
    pub seeks: u32,
    pub plays: u32,
    pub fail: bool,
}

impl SoundEffect for MockSound {
    fn seek(&mut self, _seconds: f32) -> anyhow::Result<()> {
        self.seeks += 1;
        if self.fail {
            anyhow::bail!("device unplugged");
        }
        Ok(())
    }

    fn play(&mut self) -> anyhow::Result<()> {
        self.plays += 1;
        Ok(())
    }
}

/// Frames between a bubble popping and its destroy callback.
pub(crate) const POP_FRAMES: u32 = 30;

pub(crate) type DestroyCallback = Box<dyn FnMut(NodeId) -> anyhow::Result<()>>;

/// A bouncing bubble that pops when its hit points run out.
pub(crate) struct Bubble {
    pub sprite: Sprite,
    hp: i32,
    sound: SharedSound,
    destroy_cb: Option<DestroyCallback>,
    popped: bool,
    pop_timer: Option<u32>,
}

impl Bubble {
    pub fn new(
        parent: &SharedSurface,
        position: (f32, f32),
        velocity: (f32, f32),
        sound: SharedSound,
    ) -> Self {
        let sprite = Sprite::builder()
            .parent(parent)
            .position(position)
            .size((64.0, 64.0))
            .origin((32.0, 32.0))
            .source("bubble")
            .velocity(velocity)
            .build();
        Self {
            sprite,
            hp: 10,
            sound,
            destroy_cb: None,
            popped: false,
            pop_timer: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.sprite.node().borrow().id()
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp;
        if hp <= 0 && !self.popped {
            self.popped = true;
            play_from_start(&self.sound);
            self.sprite.set_source("bubble-pop");
            self.sprite.set_velocity((0.0, 0.0));
            self.pop_timer = Some(POP_FRAMES);
        }
    }

    pub fn set_destroy_cb(&mut self, cb: DestroyCallback) {
        self.destroy_cb = Some(cb);
    }

    pub fn invert_velocity(&mut self) {
        let velocity = self.sprite.velocity();
        self.sprite.set_velocity(-velocity);
    }

    pub fn update(&mut self) {
        self.sprite.update();

        let Some(parent) = self.sprite.parent() else {
            return;
        };
        let bounds = parent.borrow().size;
        let position = self.sprite.position();
        let mut velocity = self.sprite.velocity();
        if position.x < 32.0 || position.x > bounds.x - 33.0 {
            velocity.x = -velocity.x;
        }
        if position.y < 32.0 || position.y > bounds.y - 33.0 {
            velocity.y = -velocity.y;
        }
        self.sprite.set_velocity(velocity);

        match self.pop_timer {
            Some(0) => {
                self.pop_timer = None;
                self.destroy();
            }
            Some(frames) => self.pop_timer = Some(frames - 1),
            None => {}
        }
    }

    fn destroy(&mut self) {
        let id = self.id();
        if let Some(cb) = self.destroy_cb.as_mut() {
            if let Err(e) = cb(id) {
                log::debug!("Bubble: Destroy callback failed: {}", e);
            }
        }
    }
}

pub(crate) fn pin(parent: &SharedSurface) -> Sprite {
    Sprite::builder()
        .parent(parent)
        .size((10.0, 64.0))
        .origin((5.0, 64.0))
        .source("pin")
        .build()
}

/// Bubbles spawn at these positions and velocities in turn.
const SPAWNS: [((f32, f32), (f32, f32)); 4] = [
    ((100.0, 100.0), (2.0, 1.0)),
    ((300.0, 200.0), (-1.0, 2.0)),
    ((200.0, 80.0), (1.5, -1.5)),
    ((60.0, 220.0), (-2.0, -0.5)),
];

/// The bubble popping game: bubbles spawn, bounce off walls and each other and
/// pop when touched by the pin.
pub(crate) struct BubbleDemo {
    pub pin: Option<Sprite>,
    pub bubbles: Vec<Bubble>,
    pub sound: SharedSound,
    pub max_bubbles: usize,
    spawn_timer: u32,
    spawned: usize,
    graveyard: Rc<RefCell<Vec<NodeId>>>,
}

impl BubbleDemo {
    pub fn new(sound: SharedSound) -> Self {
        Self {
            pin: None,
            bubbles: Vec::new(),
            sound,
            max_bubbles: 10,
            spawn_timer: 0,
            spawned: 0,
            graveyard: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn spawn_bubble(&mut self, surface: &SharedSurface) {
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        if self.spawn_timer > 0 || self.bubbles.len() >= self.max_bubbles {
            return;
        }
        let (position, velocity) = SPAWNS[self.spawned % SPAWNS.len()];
        let mut bubble = Bubble::new(surface, position, velocity, self.sound.clone());
        let graveyard = self.graveyard.clone();
        bubble.set_destroy_cb(Box::new(move |id: NodeId| -> anyhow::Result<()> {
            graveyard
                .try_borrow_mut()
                .map_err(|e| anyhow::anyhow!("graveyard busy: {}", e))?
                .push(id);
            Ok(())
        }));
        bubble.sprite.show(true);
        self.bubbles.push(bubble);
        self.spawned += 1;
        self.spawn_timer = 100;
    }
}

impl Flow for BubbleDemo {
    fn on_init(&mut self, surface: &SharedSurface) {
        self.pin = Some(pin(surface));
    }

    fn on_update(&mut self, surface: &SharedSurface) {
        self.spawn_bubble(surface);

        for i in 0..self.bubbles.len() {
            self.bubbles[i].update();

            let pinned = self.pin.as_ref().is_some_and(|pin| {
                pin.visible() && self.bubbles[i].sprite.hit(pin, CollisionMode::Box)
            });
            if pinned {
                self.bubbles[i].set_hp(0);
                continue;
            }

            let bounces = (0..self.bubbles.len())
                .filter(|&j| {
                    self.bubbles[j].hp() > 0
                        && self.bubbles[i]
                            .sprite
                            .hit(&self.bubbles[j].sprite, CollisionMode::Circle)
                })
                .count();
            for _ in 0..bounces {
                let bubble = &mut self.bubbles[i];
                bubble.invert_velocity();
                let hp = bubble.hp() - 1;
                bubble.set_hp(hp);
            }
        }

        let dead: Vec<NodeId> = self.graveyard.borrow_mut().drain(..).collect();
        self.bubbles.retain(|bubble| !dead.contains(&bubble.id()));
    }

    fn on_touch_down(&mut self, _surface: &SharedSurface, touch: &Touch) {
        if let Some(pin) = self.pin.as_mut() {
            pin.set_position(touch.position);
            pin.show(true);
        }
    }

    fn on_touch_move(&mut self, _surface: &SharedSurface, touch: &Touch) {
        if let Some(pin) = self.pin.as_mut() {
            pin.set_position(touch.position);
        }
    }

    fn on_touch_up(&mut self, _surface: &SharedSurface, _touch: &Touch) {
        if let Some(pin) = self.pin.as_mut() {
            pin.show(false);
        }
    }
}
