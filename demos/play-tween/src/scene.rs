use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use gtween::*;

/// A positioned, rotated, tinted thing on screen.
#[derive(Debug)]
pub struct Node2D {
    pub name: &'static str,
    pub position: Vec2,
    pub rotation: f32,
    pub tint: Color,
}

impl Node2D {
    pub fn new(name: &'static str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name,
            position: Vec2::ZERO,
            rotation: 0.0,
            tint: Color::WHITE,
        }))
    }
}

/// Two nodes and the animations that drive them.
pub struct Scene {
    pub player: Rc<RefCell<Node2D>>,
    pub marker: Rc<RefCell<Node2D>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            player: Node2D::new("player"),
            marker: Node2D::new("marker"),
        }
    }

    /// Register the demo animations on `scheduler`.
    pub fn animate(&self, scheduler: &mut Scheduler) -> Result<(), TweenError> {
        // The player slides to (100, 0) over 3 s.
        tween_field(&self.player, |n: &mut Node2D| &mut n.position, Vec2::new(100.0, 0.0), 3.0)
            .easing(Easing::InOutCubic)
            .on_complete(|| log::info!("player arrived"))
            .play_on(scheduler)?;

        // The marker pops up, spins while fading, then waits and bounces back.
        let rise = tween_field(&self.marker, |n: &mut Node2D| &mut n.position, Vec2::new(0.0, -40.0), 0.5)
            .easing(Easing::OutBack)
            .build()?;
        let spin = tween_field(&self.marker, |n: &mut Node2D| &mut n.rotation, std::f32::consts::TAU, 1.0)
            .easing(Easing::InOutSine)
            .build()?;
        let fade = tween_field(&self.marker, |n: &mut Node2D| &mut n.tint, Color::WHITE.with_alpha(0.2), 1.0)
            .build()?;
        create_sequence()
            .append(rise)
            .append(spin)
            .join(fade)
            .append_interval(0.25)
            .append_callback(|| log::info!("marker turning around"))
            .loops(2, LoopMode::Yoyo)
            .on_complete(|| log::info!("marker sequence done"))
            .play_on(scheduler)?;
        Ok(())
    }

    pub fn log_state(&self, time: f32) {
        for node in [&self.player, &self.marker] {
            let n = node.borrow();
            log::info!(
                "t={:>5.2}s {:<6} pos=({:>7.2}, {:>7.2}) rot={:>5.2} alpha={:.2}",
                time,
                n.name,
                n.position.x,
                n.position.y,
                n.rotation,
                n.tint.a
            );
        }
    }
}
