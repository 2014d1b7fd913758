use crate::HostEvent;
use glam::Vec3;
use scenelab_render::CameraRig;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Orbit a camera around a target: drag rotates, wheel dollies.
///
/// With damping enabled, pending rotation decays by `damping_factor` per update so the
/// camera keeps drifting after the drag ends.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    last_eye: Option<Vec3>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            last_eye: None,
        }
    }
}

impl OrbitControls {
    pub fn damped() -> Self {
        Self {
            enable_damping: true,
            ..Self::default()
        }
    }

    /// Queue a rotation from a pointer drag of `dx`, `dy` logical pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, view_height: f32) {
        let h = view_height.max(1.0);
        self.delta_theta -= TAU * dx / h * self.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Queue a dolly; negative `delta` moves toward the target.
    pub fn dolly(&mut self, delta: f32) {
        let zoom = 0.95f32.powf(self.zoom_speed);
        if delta < 0.0 {
            self.scale *= zoom;
        } else if delta > 0.0 {
            self.scale /= zoom;
        }
    }

    /// Feed a host event; returns true when the controls consumed it.
    pub fn handle(&mut self, event: &HostEvent, view_height: f32) -> bool {
        if !self.enabled {
            tracing::trace!(?event, "orbit controls disabled, event ignored");
            return false;
        }
        match *event {
            HostEvent::Drag { dx, dy } => {
                self.rotate(dx, dy, view_height);
                true
            }
            HostEvent::Wheel { delta } => {
                self.dolly(delta);
                true
            }
            _ => false,
        }
    }

    /// Apply pending motion to `rig` and point it at the target. Returns true when the
    /// eye moved.
    pub fn update(&mut self, rig: &mut CameraRig) -> bool {
        let offset = rig.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > EPS {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        if self.enable_damping {
            theta += self.delta_theta * self.damping_factor;
            phi += self.delta_phi * self.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        rig.position = self.target + offset;
        rig.target = Some(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        let zoomed = (self.scale - 1.0).abs() > EPS;
        self.scale = 1.0;

        let eye = rig.eye();
        let moved = zoomed
            || self
                .last_eye
                .is_none_or(|last| last.distance_squared(eye) > EPS);
        self.last_eye = Some(eye);
        moved
    }

    /// True while damped rotation is still pending.
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > EPS || self.delta_phi.abs() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::perspective(75.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, 0.0, 3.0))
    }

    #[test]
    fn update_without_input_keeps_distance_and_looks_at_target() {
        let mut controls = OrbitControls::damped();
        let mut r = rig();
        controls.update(&mut r);
        assert!((r.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
        assert_eq!(r.target, Some(Vec3::ZERO));
        assert!(!controls.update(&mut r));
    }

    #[test]
    fn drag_rotates_around_target() {
        let mut controls = OrbitControls::default();
        let mut r = rig();
        controls.handle(&HostEvent::Drag { dx: 150.0, dy: 0.0 }, 600.0);
        assert!(controls.update(&mut r));
        assert!((r.position.length() - 3.0).abs() < 1e-4);
        assert!(r.position.x.abs() > 0.5);
    }

    #[test]
    fn damping_decays_and_settles() {
        let mut controls = OrbitControls::damped();
        let mut r = rig();
        controls.rotate(100.0, 0.0, 600.0);
        let mut steps = Vec::new();
        for _ in 0..400 {
            let before = r.position;
            controls.update(&mut r);
            steps.push((r.position - before).length());
        }
        assert!(steps[1] < steps[0] || steps[0] == 0.0);
        assert!(steps[399] < steps[1]);
        assert!(!controls.is_settling() || steps[399] < 1e-4);
    }

    #[test]
    fn wheel_dollies_within_limits() {
        let mut controls = OrbitControls {
            min_distance: 2.0,
            ..OrbitControls::default()
        };
        let mut r = rig();
        for _ in 0..50 {
            controls.dolly(-1.0);
            controls.update(&mut r);
        }
        assert!((r.position.length() - 2.0).abs() < 1e-4);
        controls.dolly(1.0);
        controls.update(&mut r);
        assert!(r.position.length() > 2.0);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut controls = OrbitControls::default();
        let mut r = rig();
        controls.rotate(0.0, 10_000.0, 600.0);
        controls.update(&mut r);
        assert!((r.position.y - 3.0).abs() < 1e-3);
        assert!(r.position.is_finite());
    }

    #[test]
    fn disabled_controls_ignore_events() {
        let mut controls = OrbitControls {
            enabled: false,
            ..OrbitControls::default()
        };
        assert!(!controls.handle(&HostEvent::Wheel { delta: 1.0 }, 600.0));
    }
}
