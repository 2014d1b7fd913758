use scenelab_render::ResizeSignal;

/// Keys the demos react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Space,
    Other,
}

/// A host signal dispatched into the running demo.
///
/// Sizes and positions are logical pixels; `scale_factor` is the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resized {
        width: u32,
        height: u32,
        scale_factor: f32,
    },
    CursorMoved {
        x: f32,
        y: f32,
    },
    /// Absolute vertical scroll offset of the page.
    Scrolled {
        y: f32,
    },
    /// Mouse wheel; positive values move away from the target.
    Wheel {
        delta: f32,
    },
    /// Pointer drag with the primary button held.
    Drag {
        dx: f32,
        dy: f32,
    },
    KeyDown(Key),
}

impl HostEvent {
    pub fn resize_signal(&self) -> Option<ResizeSignal> {
        match *self {
            HostEvent::Resized {
                width,
                height,
                scale_factor,
            } => Some(ResizeSignal {
                width,
                height,
                scale_factor,
            }),
            _ => None,
        }
    }

    pub fn is_key(&self, c: char) -> bool {
        matches!(self, HostEvent::KeyDown(Key::Char(k)) if k.eq_ignore_ascii_case(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_converts_to_signal() {
        let e = HostEvent::Resized {
            width: 640,
            height: 480,
            scale_factor: 2.0,
        };
        let s = e.resize_signal().unwrap();
        assert_eq!((s.width, s.height), (640, 480));
        assert_eq!(s.scale_factor, 2.0);
        assert!(HostEvent::Wheel { delta: 1.0 }.resize_signal().is_none());
    }

    #[test]
    fn key_match_ignores_case() {
        assert!(HostEvent::KeyDown(Key::Char('H')).is_key('h'));
        assert!(!HostEvent::KeyDown(Key::Escape).is_key('h'));
    }
}
