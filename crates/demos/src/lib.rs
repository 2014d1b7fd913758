//! The demo collection.
//!
//! Each module builds one scene from literal parameters in [`Demo::setup`] and drives
//! it from elapsed time in [`Demo::update`]. Demos that tune values live do it through
//! the context's debug panel; the ones that load assets pick them up as completions.
//!
//! # Invariants
//! - `update` with the same elapsed time and panel values yields the same transforms,
//!   except for explicit smoothing accumulators.
//! - Random placement comes from the context rng, so a seed reproduces a scene.

mod animations;
mod cameras;
mod debug_ui;
mod first_project;
mod haunted_house;
mod lights;
mod materials;
mod particles;
mod physics;
mod scroll_animation;
mod shadows;
mod support;
mod text;
mod textures;

pub use animations::Animations;
pub use cameras::{CameraMode, Cameras};
pub use debug_ui::DebugUi;
pub use first_project::FirstProject;
pub use haunted_house::HauntedHouse;
pub use lights::Lights;
pub use materials::Materials;
pub use particles::Particles;
pub use physics::Physics;
pub use scroll_animation::ScrollAnimation;
pub use shadows::Shadows;
pub use text::Text3d;
pub use textures::Textures;

use scenelab_runtime::{Demo, RuntimeError};

const NAMES: [&str; 13] = [
    "first-project",
    "animations",
    "cameras",
    "debug-ui",
    "3d-text",
    "haunted-house",
    "lights",
    "materials",
    "particles",
    "physics",
    "scroll-based-animation",
    "shadows",
    "textures",
];

/// Registered demo names, in menu order.
pub fn all_names() -> &'static [&'static str] {
    &NAMES
}

/// Fresh instance of the demo called `name`.
pub fn create(name: &str) -> Result<Box<dyn Demo>, RuntimeError> {
    let demo: Box<dyn Demo> = match name {
        "first-project" => Box::new(FirstProject::default()),
        "animations" => Box::new(Animations::default()),
        "cameras" => Box::new(Cameras::default()),
        "debug-ui" => Box::new(DebugUi::default()),
        "3d-text" => Box::new(Text3d::default()),
        "haunted-house" => Box::new(HauntedHouse::default()),
        "lights" => Box::new(Lights::default()),
        "materials" => Box::new(Materials::default()),
        "particles" => Box::new(Particles::default()),
        "physics" => Box::new(Physics::default()),
        "scroll-based-animation" => Box::new(ScrollAnimation::default()),
        "shadows" => Box::new(Shadows::default()),
        "textures" => Box::new(Textures::default()),
        other => return Err(RuntimeError::UnknownDemo(other.to_string())),
    };
    Ok(demo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_render::DebugTextRenderer;
    use scenelab_runtime::{Driver, DriverOptions, ManualTime};

    #[test]
    fn every_name_creates_its_demo() {
        for name in all_names() {
            let demo = create(name).unwrap();
            assert_eq!(demo.name(), *name);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            create("nope"),
            Err(RuntimeError::UnknownDemo(n)) if n == "nope"
        ));
    }

    #[test]
    fn every_demo_starts_and_renders_without_assets() {
        for name in all_names() {
            let time = ManualTime::new();
            let mut driver = Driver::new(
                create(name).unwrap(),
                DebugTextRenderer::new(),
                DriverOptions {
                    assets_root: "/nonexistent-scenelab-assets".into(),
                    time: Box::new(time.clone()),
                    ..DriverOptions::default()
                },
            );
            driver.start().unwrap();
            for _ in 0..3 {
                let frame = driver.tick().unwrap();
                if driver.frame_count() == 0 {
                    panic!("{name} rendered nothing");
                }
                if let Some(frame) = frame {
                    assert!(frame.contains("Objects:"), "{name}");
                }
                time.advance(0.016);
            }
        }
    }
}
