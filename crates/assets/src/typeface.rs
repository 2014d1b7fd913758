use crate::AssetError;
use glam::Vec2;
use scenelab_scene::MeshData;
use scenelab_scene::geometry::extrude_outline;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
struct Glyph {
    /// Horizontal advance in font units.
    ha: f32,
    /// Outline commands; absent for whitespace.
    #[serde(default)]
    o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct BoundingBox {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

/// A typeface font: glyph outlines in font units plus vertical metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    glyphs: HashMap<String, Glyph>,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
}

/// Text mesh parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    /// Line segments per curve command.
    pub curve_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            depth: 50.0,
            curve_segments: 12,
        }
    }
}

fn quadratic(p0: Vec2, c: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + c * (2.0 * k * t) + p1 * (t * t)
}

fn cubic(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + c0 * (3.0 * k * k * t) + c1 * (3.0 * k * t * t) + p1 * (t * t * t)
}

fn close(contour: &mut Vec<Vec2>, out: &mut Vec<Vec<Vec2>>) {
    if let (Some(first), Some(last)) = (contour.first(), contour.last()) {
        if contour.len() > 1 && first.distance_squared(*last) <= f32::EPSILON {
            contour.pop();
        }
    }
    if contour.len() >= 3 {
        out.push(std::mem::take(contour));
    } else {
        contour.clear();
    }
}

impl Typeface {
    pub fn parse(json: &str) -> Result<Self, AssetError> {
        let face: Typeface = serde_json::from_str(json)?;
        tracing::debug!(family = %face.family_name, glyphs = face.glyphs.len(), "typeface parsed");
        Ok(face)
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs.contains_key(&c.to_string())
    }

    fn line_height(&self, scale: f32) -> f32 {
        (self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness) * scale
    }

    /// Lay `text` out as closed contours; `\n` starts a new line. Characters without a
    /// glyph fall back to `?` and are skipped when that is missing too.
    pub fn contours(&self, text: &str, size: f32, curve_segments: u32) -> Vec<Vec<Vec2>> {
        let scale = size / self.resolution.max(f32::EPSILON);
        let segments = curve_segments.max(1);
        let mut out = Vec::new();
        let mut offset = Vec2::ZERO;
        for c in text.chars() {
            if c == '\n' {
                offset.x = 0.0;
                offset.y -= self.line_height(scale);
                continue;
            }
            let key = c.to_string();
            let Some(glyph) = self.glyphs.get(&key).or_else(|| self.glyphs.get("?")) else {
                tracing::error!(
                    glyph = %c,
                    family = %self.family_name,
                    "character missing from typeface"
                );
                continue;
            };
            if let Some(outline) = &glyph.o {
                self.glyph_contours(outline, scale, offset, segments, &mut out);
            }
            offset.x += glyph.ha * scale;
        }
        out
    }

    fn glyph_contours(
        &self,
        outline: &str,
        scale: f32,
        offset: Vec2,
        segments: u32,
        out: &mut Vec<Vec<Vec2>>,
    ) {
        let tokens: Vec<&str> = outline.split_whitespace().collect();
        let mut i = 0;
        let next = |i: &mut usize| -> Option<Vec2> {
            let x: f32 = tokens.get(*i)?.parse().ok()?;
            let y: f32 = tokens.get(*i + 1)?.parse().ok()?;
            *i += 2;
            Some(Vec2::new(x, y) * scale + offset)
        };
        let mut contour: Vec<Vec2> = Vec::new();
        let mut pen = Vec2::ZERO;
        while i < tokens.len() {
            let action = tokens[i];
            i += 1;
            match action {
                "m" => {
                    close(&mut contour, out);
                    let Some(p) = next(&mut i) else { break };
                    contour.push(p);
                    pen = p;
                }
                "l" => {
                    let Some(p) = next(&mut i) else { break };
                    contour.push(p);
                    pen = p;
                }
                "q" => {
                    // end point first, then the control point
                    let (Some(end), Some(ctrl)) = (next(&mut i), next(&mut i)) else {
                        break;
                    };
                    for s in 1..=segments {
                        contour.push(quadratic(pen, ctrl, end, s as f32 / segments as f32));
                    }
                    pen = end;
                }
                "b" => {
                    let (Some(end), Some(c0), Some(c1)) = (next(&mut i), next(&mut i), next(&mut i))
                    else {
                        break;
                    };
                    for s in 1..=segments {
                        contour.push(cubic(pen, c0, c1, end, s as f32 / segments as f32));
                    }
                    pen = end;
                }
                "z" => close(&mut contour, out),
                other => {
                    tracing::warn!(command = other, "unknown glyph outline command");
                    break;
                }
            }
        }
        close(&mut contour, out);
    }

    /// Extruded, centered text mesh.
    pub fn text_geometry(&self, text: &str, options: TextOptions) -> MeshData {
        let contours = self.contours(text, options.size, options.curve_segments);
        let mut mesh = extrude_outline(&contours, options.depth);
        mesh.center();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Test Sans",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "yMin": -200, "yMax": 800, "xMin": 0, "xMax": 1000 },
        "glyphs": {
            "I": { "ha": 400, "x_min": 0, "x_max": 300, "o": "m 0 0 l 300 0 l 300 700 l 0 700 z" },
            "O": { "ha": 800, "x_min": 0, "x_max": 700,
                   "o": "m 0 0 l 700 0 l 700 700 l 0 700 l 0 0 m 200 200 l 200 500 l 500 500 l 500 200 z" },
            "D": { "ha": 700, "o": "m 0 0 l 300 0 q 300 700 600 350 l 0 700" },
            "?": { "ha": 500, "o": "m 0 0 l 100 0 l 100 100 z" },
            " ": { "ha": 250 }
        }
    }"#;

    fn font() -> Typeface {
        Typeface::parse(FONT).unwrap()
    }

    #[test]
    fn parses_metrics_and_glyphs() {
        let f = font();
        assert_eq!(f.family_name, "Test Sans");
        assert!(f.has_glyph('I'));
        assert!(!f.has_glyph('x'));
    }

    #[test]
    fn advance_moves_following_glyphs() {
        let f = font();
        let contours = f.contours("I I", 1.0, 4);
        assert_eq!(contours.len(), 2);
        // second I starts after 400 + 250 font units
        assert!((contours[1][0].x - 0.65).abs() < 1e-5);
    }

    #[test]
    fn quadratic_curve_is_flattened() {
        let f = font();
        let contours = f.contours("D", 1.0, 5);
        assert_eq!(contours.len(), 1);
        // two line points, five curve samples, one closing line
        assert_eq!(contours[0].len(), 2 + 5 + 1);
        let last_curve = contours[0][6];
        assert!((last_curve - Vec2::new(0.3, 0.7)).length() < 1e-5);
    }

    #[test]
    fn newline_drops_by_line_height() {
        let f = font();
        let contours = f.contours("I\nI", 1.0, 1);
        let dy = contours[0][0].y - contours[1][0].y;
        assert!((dy - 1.05).abs() < 1e-5);
        assert_eq!(contours[1][0].x, 0.0);
    }

    #[test]
    fn missing_glyph_falls_back_to_question_mark() {
        let f = font();
        assert_eq!(f.contours("x", 1.0, 1).len(), 1);
    }

    #[test]
    fn text_geometry_is_centered_and_has_hole() {
        let f = font();
        let mesh = f.text_geometry(
            "O",
            TextOptions {
                size: 1.0,
                depth: 0.2,
                curve_segments: 4,
            },
        );
        assert!(mesh.validate().is_ok());
        let (min, max) = mesh.bounding_box().unwrap();
        assert!(((min + max) * 0.5).length() < 1e-5);
        assert!((max.z - min.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(matches!(
            Typeface::parse("{ not json"),
            Err(AssetError::Typeface(_))
        ));
    }
}
