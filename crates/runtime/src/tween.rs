use scenelab_common::{ObjectId, Transform};
use scenelab_scene::Scene;

/// Transform channel a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    Scale,
}

impl Property {
    pub fn get(self, t: &Transform) -> f32 {
        match self {
            Property::PositionX => t.position.x,
            Property::PositionY => t.position.y,
            Property::PositionZ => t.position.z,
            Property::RotationX => t.rotation.x,
            Property::RotationY => t.rotation.y,
            Property::RotationZ => t.rotation.z,
            Property::Scale => t.scale.x,
        }
    }

    pub fn set(self, t: &mut Transform, v: f32) {
        match self {
            Property::PositionX => t.position.x = v,
            Property::PositionY => t.position.y = v,
            Property::PositionZ => t.position.z = v,
            Property::RotationX => t.rotation.x = v,
            Property::RotationY => t.rotation.y = v,
            Property::RotationZ => t.rotation.z = v,
            Property::Scale => t.scale = glam::Vec3::splat(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out, the default.
    #[default]
    Power1Out,
    Power1In,
    Power1InOut,
}

impl Ease {
    pub fn apply(self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Ease::Linear => p,
            Ease::Power1Out => 1.0 - (1.0 - p) * (1.0 - p),
            Ease::Power1In => p * p,
            Ease::Power1InOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - 2.0 * (1.0 - p) * (1.0 - p)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    /// Play `n` extra times after the first.
    Times(u32),
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenOptions {
    pub duration: f32,
    pub delay: f32,
    pub repeat: Repeat,
    pub ease: Ease,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            duration: 0.5,
            delay: 0.0,
            repeat: Repeat::Once,
            ease: Ease::Power1Out,
        }
    }
}

impl TweenOptions {
    pub fn over(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn delayed(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Identifies a running tween so it can be killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenHandle(u64);

/// Animates one property from its value when the delay ends to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: ObjectId,
    pub property: Property,
    pub to: f32,
    pub options: TweenOptions,
    start: f32,
    from: Option<f32>,
}

impl Tween {
    /// Eased progress at `local` seconds after the delay, and whether playback ended.
    fn progress(&self, local: f32) -> (f32, bool) {
        let d = self.options.duration;
        if d <= 0.0 {
            return (1.0, !matches!(self.options.repeat, Repeat::Forever));
        }
        let cycles = local / d;
        let (p, done) = match self.options.repeat {
            Repeat::Forever => (cycles.fract(), false),
            Repeat::Once if cycles >= 1.0 => (1.0, true),
            Repeat::Times(n) if cycles >= (n + 1) as f32 => (1.0, true),
            _ => (cycles.fract(), false),
        };
        (self.options.ease.apply(p), done)
    }
}

/// Tweens keyed by handle, evaluated against absolute frame time.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    tweens: Vec<(TweenHandle, Tween)>,
    next: u64,
    now: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the latest update; new tweens start counting from here.
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn to(
        &mut self,
        target: ObjectId,
        property: Property,
        to: f32,
        options: TweenOptions,
    ) -> TweenHandle {
        self.next += 1;
        let handle = TweenHandle(self.next);
        self.tweens.push((
            handle,
            Tween {
                target,
                property,
                to,
                options,
                start: self.now,
                from: None,
            },
        ));
        tracing::debug!(?property, to, duration = options.duration, "tween started");
        handle
    }

    /// Stop a tween where it is. Returns false when it already finished or was killed.
    pub fn kill(&mut self, handle: TweenHandle) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|(h, _)| *h != handle);
        before != self.tweens.len()
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.tweens.iter().any(|(h, _)| *h == handle)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Write every started tween's value for time `now` into `scene`.
    pub fn update(&mut self, now: f32, scene: &mut Scene) {
        self.now = now;
        let mut finished = Vec::new();
        for (handle, tween) in &mut self.tweens {
            let local = now - tween.start - tween.options.delay;
            if local < 0.0 {
                continue;
            }
            let Some(transform) = scene.transform_mut(tween.target) else {
                finished.push(*handle);
                continue;
            };
            let from = *tween.from.get_or_insert(tween.property.get(transform));
            let (p, done) = tween.progress(local);
            tween.property.set(transform, from + (tween.to - from) * p);
            if done {
                finished.push(*handle);
            }
        }
        if !finished.is_empty() {
            self.tweens.retain(|(h, _)| !finished.contains(h));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_common::Color;
    use scenelab_scene::Material;
    use scenelab_scene::geometry::box_geometry;
    use std::f32::consts::TAU;

    fn scene_with_cube() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let id = scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 1, 1, 1),
            Material::basic(Color::from_hex(0xff0000)),
        );
        (scene, id)
    }

    fn x(scene: &Scene, id: ObjectId) -> f32 {
        scene.get(id).unwrap().transform.position.x
    }

    #[test]
    fn ease_endpoints() {
        for e in [Ease::Linear, Ease::Power1Out, Ease::Power1In, Ease::Power1InOut] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
        }
        assert_eq!(Ease::Power1Out.apply(0.5), 0.75);
    }

    #[test]
    fn delayed_tweens_chain_from_captured_values() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        tl.to(id, Property::PositionX, 2.0, TweenOptions::over(1.0).delayed(1.0));
        tl.to(id, Property::PositionX, 0.0, TweenOptions::over(1.0).delayed(2.0));

        tl.update(0.5, &mut scene);
        assert_eq!(x(&scene, id), 0.0);
        tl.update(1.5, &mut scene);
        assert_eq!(x(&scene, id), 1.5);
        tl.update(2.0, &mut scene);
        assert_eq!(x(&scene, id), 2.0);
        tl.update(3.5, &mut scene);
        assert_eq!(x(&scene, id), 0.0);
        assert!(tl.is_empty());
    }

    #[test]
    fn same_time_gives_same_value() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        tl.to(id, Property::PositionX, 2.0, TweenOptions::over(1.0));
        tl.update(0.3, &mut scene);
        let a = x(&scene, id);
        tl.update(0.3, &mut scene);
        assert_eq!(a, x(&scene, id));
    }

    #[test]
    fn forever_repeats_and_kill_stops() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        let spin = tl.to(
            id,
            Property::RotationY,
            TAU,
            TweenOptions::over(5.0).repeat(Repeat::Forever),
        );
        tl.update(7.5, &mut scene);
        let y = scene.get(id).unwrap().transform.rotation.y;
        assert!((y - TAU * Ease::Power1Out.apply(0.5)).abs() < 1e-4);
        tl.update(1000.0, &mut scene);
        assert!(tl.is_active(spin));
        assert!(tl.kill(spin));
        assert!(!tl.kill(spin));
        let frozen = scene.get(id).unwrap().transform.rotation.y;
        tl.update(1001.0, &mut scene);
        assert_eq!(scene.get(id).unwrap().transform.rotation.y, frozen);
    }

    #[test]
    fn finite_repeat_ends_at_target() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        tl.to(
            id,
            Property::PositionX,
            1.0,
            TweenOptions::over(1.0).repeat(Repeat::Times(2)).ease(Ease::Linear),
        );
        tl.update(1.25, &mut scene);
        assert_eq!(x(&scene, id), 0.25);
        tl.update(3.0, &mut scene);
        assert_eq!(x(&scene, id), 1.0);
        assert!(tl.is_empty());
    }

    #[test]
    fn tween_on_removed_object_is_dropped() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        tl.to(id, Property::Scale, 2.0, TweenOptions::over(1.0));
        scene.remove(id).unwrap();
        tl.update(0.5, &mut scene);
        assert!(tl.is_empty());
    }

    #[test]
    fn start_is_relative_to_creation_time() {
        let (mut scene, id) = scene_with_cube();
        let mut tl = Timeline::new();
        tl.update(10.0, &mut scene);
        tl.to(id, Property::PositionX, 1.0, TweenOptions::over(2.0).ease(Ease::Linear));
        tl.update(11.0, &mut scene);
        assert_eq!(x(&scene, id), 0.5);
    }
}
