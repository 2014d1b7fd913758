use scenelab_common::Color;
use std::collections::BTreeSet;

/// Shape and limits of a tunable.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Number { min: f32, max: f32, step: f32 },
    Bool,
    Color,
    /// A button; its value is always [`ParamValue::Action`].
    Action,
    Choice(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Bool(bool),
    Color(Color),
    Action,
    /// Index into the choice list.
    Choice(usize),
}

impl ParamValue {
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            ParamValue::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            ParamValue::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match *self {
            ParamValue::Choice(i) => Some(i),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Bool(_) => "bool",
            ParamValue::Color(_) => "color",
            ParamValue::Action => "action",
            ParamValue::Choice(_) => "choice",
        }
    }
}

/// An edit made through the panel.
///
/// `Changed` fires on every intermediate value (slider drag); `Committed` fires once
/// when the edit finishes. Buttons only commit.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Changed { key: String, value: ParamValue },
    Committed { key: String, value: ParamValue },
}

impl PanelEvent {
    pub fn key(&self) -> &str {
        match self {
            PanelEvent::Changed { key, .. } | PanelEvent::Committed { key, .. } => key,
        }
    }

    pub fn value(&self) -> ParamValue {
        match self {
            PanelEvent::Changed { value, .. } | PanelEvent::Committed { value, .. } => *value,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, PanelEvent::Committed { .. })
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PanelError {
    #[error("unknown param: {0}")]
    UnknownParam(String),
    #[error("param {key} expects a {expected} value, got {got}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("param already registered: {0}")]
    DuplicateParam(String),
    #[error("choice index {index} out of range for {key}")]
    ChoiceOutOfRange { key: String, index: usize },
    #[error("param {key} has an invalid range {min}..={max} (step {step})")]
    InvalidRange {
        key: String,
        min: f32,
        max: f32,
        step: f32,
    },
    #[error("param {key} rejects non-finite value {value}")]
    NotFinite { key: String, value: f32 },
}

#[derive(Debug, Clone)]
struct Param {
    key: String,
    label: String,
    folder: Option<usize>,
    kind: ParamKind,
    value: ParamValue,
}

#[derive(Debug, Clone)]
struct Folder {
    name: String,
    open: bool,
}

fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let v = if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    };
    v.clamp(min, max)
}

/// Named tunables grouped into folders, drawn with egui.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    title: String,
    width: f32,
    visible: bool,
    open: bool,
    folders: Vec<Folder>,
    current_folder: Option<usize>,
    params: Vec<Param>,
    events: Vec<PanelEvent>,
    dirty: BTreeSet<usize>,
    status: String,
}

impl DebugPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 245.0,
            visible: true,
            open: true,
            folders: Vec::new(),
            current_folder: None,
            params: Vec::new(),
            events: Vec::new(),
            dirty: BTreeSet::new(),
            status: String::new(),
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Start collapsed.
    pub fn closed(mut self) -> Self {
        self.open = false;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, title = %self.title, "debug panel toggled");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Line shown above the params.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Params added after this call go into folder `name`.
    pub fn folder(&mut self, name: &str, open: bool) -> &mut Self {
        let index = match self.folders.iter().position(|f| f.name == name) {
            Some(i) => i,
            None => {
                self.folders.push(Folder {
                    name: name.to_string(),
                    open,
                });
                self.folders.len() - 1
            }
        };
        self.current_folder = Some(index);
        self
    }

    /// Params added after this call go to the top level.
    pub fn root(&mut self) -> &mut Self {
        self.current_folder = None;
        self
    }

    pub fn folder_names(&self) -> Vec<&str> {
        self.folders.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn add(
        &mut self,
        key: &str,
        label: &str,
        kind: ParamKind,
        value: ParamValue,
    ) -> Result<&mut Self, PanelError> {
        if self.params.iter().any(|p| p.key == key) {
            return Err(PanelError::DuplicateParam(key.to_string()));
        }
        let value = match (&kind, value) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(v)) => {
                let (min, max, step) = (*min, *max, *step);
                if !(min.is_finite() && max.is_finite() && min <= max && step.is_finite()) {
                    return Err(PanelError::InvalidRange {
                        key: key.to_string(),
                        min,
                        max,
                        step,
                    });
                }
                if !v.is_finite() {
                    return Err(PanelError::NotFinite {
                        key: key.to_string(),
                        value: v,
                    });
                }
                ParamValue::Number(snap(v, min, max, step))
            }
            (ParamKind::Choice(options), ParamValue::Choice(i)) if i >= options.len() => {
                return Err(PanelError::ChoiceOutOfRange {
                    key: key.to_string(),
                    index: i,
                });
            }
            (_, v) => v,
        };
        self.params.push(Param {
            key: key.to_string(),
            label: label.to_string(),
            folder: self.current_folder,
            kind,
            value,
        });
        Ok(self)
    }

    pub fn add_number(
        &mut self,
        key: &str,
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> Result<&mut Self, PanelError> {
        self.add(key, key, ParamKind::Number { min, max, step }, ParamValue::Number(value))
    }

    pub fn add_bool(&mut self, key: &str, value: bool) -> Result<&mut Self, PanelError> {
        self.add(key, key, ParamKind::Bool, ParamValue::Bool(value))
    }

    pub fn add_color(&mut self, key: &str, value: Color) -> Result<&mut Self, PanelError> {
        self.add(key, key, ParamKind::Color, ParamValue::Color(value))
    }

    pub fn add_button(&mut self, key: &str) -> Result<&mut Self, PanelError> {
        self.add(key, key, ParamKind::Action, ParamValue::Action)
    }

    pub fn add_choice(
        &mut self,
        key: &str,
        options: &[&str],
        selected: usize,
    ) -> Result<&mut Self, PanelError> {
        let options = options.iter().map(|s| s.to_string()).collect();
        self.add(key, key, ParamKind::Choice(options), ParamValue::Choice(selected))
    }

    /// Display name of the most recently added param.
    pub fn name(&mut self, label: &str) -> &mut Self {
        if let Some(p) = self.params.last_mut() {
            p.label = label.to_string();
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<ParamValue> {
        self.params.iter().find(|p| p.key == key).map(|p| p.value)
    }

    pub fn kind(&self, key: &str) -> Option<&ParamKind> {
        self.params.iter().find(|p| p.key == key).map(|p| &p.kind)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.label.as_str())
    }

    fn index(&self, key: &str) -> Result<usize, PanelError> {
        self.params
            .iter()
            .position(|p| p.key == key)
            .ok_or_else(|| PanelError::UnknownParam(key.to_string()))
    }

    fn coerce(&self, index: usize, value: ParamValue) -> Result<ParamValue, PanelError> {
        let param = &self.params[index];
        let mismatch = || PanelError::TypeMismatch {
            key: param.key.clone(),
            expected: param.value.kind_name(),
            got: value.kind_name(),
        };
        match (&param.kind, value) {
            (ParamKind::Number { .. }, ParamValue::Number(v)) if !v.is_finite() => {
                Err(PanelError::NotFinite {
                    key: param.key.clone(),
                    value: v,
                })
            }
            (ParamKind::Number { min, max, step }, ParamValue::Number(v)) => {
                Ok(ParamValue::Number(snap(v, *min, *max, *step)))
            }
            (ParamKind::Bool, ParamValue::Bool(_))
            | (ParamKind::Color, ParamValue::Color(_))
            | (ParamKind::Action, ParamValue::Action) => Ok(value),
            (ParamKind::Choice(options), ParamValue::Choice(i)) => {
                if i < options.len() {
                    Ok(value)
                } else {
                    Err(PanelError::ChoiceOutOfRange {
                        key: param.key.clone(),
                        index: i,
                    })
                }
            }
            _ => Err(mismatch()),
        }
    }

    /// Intermediate edit: store the value and emit `Changed`.
    pub fn change(&mut self, key: &str, value: ParamValue) -> Result<ParamValue, PanelError> {
        let index = self.index(key)?;
        let value = self.coerce(index, value)?;
        if matches!(value, ParamValue::Action) {
            return Ok(value);
        }
        self.params[index].value = value;
        self.events.push(PanelEvent::Changed {
            key: key.to_string(),
            value,
        });
        Ok(value)
    }

    /// Finished edit: store the value and emit `Committed`.
    pub fn commit(&mut self, key: &str, value: ParamValue) -> Result<ParamValue, PanelError> {
        let index = self.index(key)?;
        let value = self.coerce(index, value)?;
        self.params[index].value = value;
        self.dirty.remove(&index);
        self.events.push(PanelEvent::Committed {
            key: key.to_string(),
            value,
        });
        Ok(value)
    }

    /// A complete edit as a user would make it: `Changed` then `Committed`, or only
    /// `Committed` for buttons.
    pub fn set(&mut self, key: &str, value: ParamValue) -> Result<ParamValue, PanelError> {
        let value = self.change(key, value)?;
        self.commit(key, value)
    }

    /// Press a button param.
    pub fn press(&mut self, key: &str) -> Result<(), PanelError> {
        self.commit(key, ParamValue::Action).map(|_| ())
    }

    /// Update a value from code without emitting events.
    pub fn sync(&mut self, key: &str, value: ParamValue) -> Result<(), PanelError> {
        let index = self.index(key)?;
        let value = self.coerce(index, value)?;
        self.params[index].value = value;
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<PanelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draw the panel and turn widget interaction into events.
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.visible {
            return;
        }
        let mut edits: Vec<(usize, ParamValue, bool)> = Vec::new();
        let title = self.title.clone();
        egui::Window::new(title)
            .default_width(self.width)
            .default_open(self.open)
            .resizable(false)
            .show(ctx, |ui| {
                if !self.status.is_empty() {
                    ui.small(&self.status);
                    ui.separator();
                }
                for index in 0..self.params.len() {
                    if self.params[index].folder.is_none() {
                        Self::param_ui(ui, &self.params[index], index, &mut edits);
                    }
                }
                for (fi, folder) in self.folders.iter().enumerate() {
                    egui::CollapsingHeader::new(&folder.name)
                        .default_open(folder.open)
                        .show(ui, |ui| {
                            for (index, param) in self.params.iter().enumerate() {
                                if param.folder == Some(fi) {
                                    Self::param_ui(ui, param, index, &mut edits);
                                }
                            }
                        });
                }
            });

        for (index, value, finished) in edits {
            let key = self.params[index].key.clone();
            let result = if finished {
                self.set(&key, value)
            } else {
                self.dirty.insert(index);
                self.change(&key, value)
            };
            if let Err(e) = result {
                tracing::warn!(%key, error = %e, "panel edit rejected");
            }
        }

        // Drags and color pickers finish when the pointer is released.
        if !self.dirty.is_empty() && !ctx.input(|i| i.pointer.any_down()) {
            let pending: Vec<usize> = std::mem::take(&mut self.dirty).into_iter().collect();
            for index in pending {
                let (key, value) = (self.params[index].key.clone(), self.params[index].value);
                if let Err(e) = self.commit(&key, value) {
                    tracing::warn!(%key, error = %e, "panel commit rejected");
                }
            }
        }
    }

    fn param_ui(
        ui: &mut egui::Ui,
        param: &Param,
        index: usize,
        edits: &mut Vec<(usize, ParamValue, bool)>,
    ) {
        match (&param.kind, param.value) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(mut v)) => {
                let mut slider = egui::Slider::new(&mut v, *min..=*max).text(&param.label);
                if *step > 0.0 {
                    slider = slider.step_by(*step as f64);
                }
                let response = ui.add(slider);
                if response.changed() {
                    // keyboard and text edits finish immediately
                    let finished = !response.dragged() && !response.drag_stopped();
                    edits.push((index, ParamValue::Number(v), finished));
                }
            }
            (ParamKind::Bool, ParamValue::Bool(mut b)) => {
                if ui.checkbox(&mut b, &param.label).changed() {
                    edits.push((index, ParamValue::Bool(b), true));
                }
            }
            (ParamKind::Color, ParamValue::Color(c)) => {
                ui.horizontal(|ui| {
                    let hex = c.to_hex();
                    let mut rgb = [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8];
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        let hex = ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32;
                        edits.push((index, ParamValue::Color(Color::from_hex(hex)), false));
                    }
                    ui.label(&param.label);
                });
            }
            (ParamKind::Action, _) => {
                if ui.button(&param.label).clicked() {
                    edits.push((index, ParamValue::Action, true));
                }
            }
            (ParamKind::Choice(options), ParamValue::Choice(selected)) => {
                let mut choice = selected;
                egui::ComboBox::from_label(&param.label)
                    .selected_text(options.get(selected).map(String::as_str).unwrap_or(""))
                    .show_ui(ui, |ui| {
                        for (i, option) in options.iter().enumerate() {
                            ui.selectable_value(&mut choice, i, option);
                        }
                    });
                if choice != selected {
                    edits.push((index, ParamValue::Choice(choice), true));
                }
            }
            _ => {
                ui.label(format!("{}: ?", param.label));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> DebugPanel {
        let mut panel = DebugPanel::new("Debug UI").with_width(300.0).closed();
        panel.folder("Cube tweaks", true);
        panel.add_bool("wireframe", false).unwrap().name("Wireframe");
        panel.add_number("elevation", 0.0, -2.0, 2.0, 0.01).unwrap();
        panel.add_number("subdivisions", 2.0, 1.0, 10.0, 1.0).unwrap();
        panel.add_color("color", Color::from_hex(0x3a6ea6)).unwrap();
        panel.add_button("spin").unwrap();
        panel
    }

    #[test]
    fn builder_records_folders_and_labels() {
        let p = panel();
        assert_eq!(p.folder_names(), vec!["Cube tweaks"]);
        assert_eq!(p.label("wireframe"), Some("Wireframe"));
        assert_eq!(p.width(), 300.0);
        assert!(!p.is_open());
        assert_eq!(p.len(), 5);
    }

    #[test]
    fn numbers_clamp_and_snap() {
        let mut p = panel();
        assert_eq!(p.set("elevation", ParamValue::Number(5.0)), Ok(ParamValue::Number(2.0)));
        let v = p.set("subdivisions", ParamValue::Number(3.4)).unwrap();
        assert_eq!(v, ParamValue::Number(3.0));
        assert_eq!(p.get("subdivisions"), Some(ParamValue::Number(3.0)));
    }

    #[test]
    fn change_then_commit_events() {
        let mut p = panel();
        p.change("subdivisions", ParamValue::Number(4.0)).unwrap();
        p.change("subdivisions", ParamValue::Number(5.0)).unwrap();
        p.commit("subdivisions", ParamValue::Number(5.0)).unwrap();
        let events = p.drain_events();
        assert_eq!(events.len(), 3);
        assert!(!events[0].is_commit());
        assert!(events[2].is_commit());
        assert_eq!(events[2].value().as_f32(), Some(5.0));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn buttons_only_commit() {
        let mut p = panel();
        p.press("spin").unwrap();
        let events = p.drain_events();
        assert_eq!(events, vec![PanelEvent::Committed {
            key: "spin".into(),
            value: ParamValue::Action
        }]);
    }

    #[test]
    fn errors_for_unknown_and_mismatched() {
        let mut p = panel();
        assert_eq!(
            p.set("nope", ParamValue::Bool(true)),
            Err(PanelError::UnknownParam("nope".into()))
        );
        assert!(matches!(
            p.set("wireframe", ParamValue::Number(1.0)),
            Err(PanelError::TypeMismatch { expected: "bool", .. })
        ));
        assert!(matches!(
            p.add_bool("wireframe", true),
            Err(PanelError::DuplicateParam(_))
        ));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn choice_range_checked() {
        let mut p = DebugPanel::new("cams");
        p.add_choice("camera", &["perspective", "orthographic", "array"], 0)
            .unwrap();
        assert!(p.set("camera", ParamValue::Choice(2)).is_ok());
        assert!(matches!(
            p.set("camera", ParamValue::Choice(3)),
            Err(PanelError::ChoiceOutOfRange { .. })
        ));
        assert!(matches!(
            p.add_choice("other", &["a"], 1),
            Err(PanelError::ChoiceOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_or_non_finite_ranges_are_rejected() {
        let mut p = DebugPanel::new("ranges");
        assert!(matches!(
            p.add_number("x", 0.5, 1.0, 0.0, 0.1),
            Err(PanelError::InvalidRange { .. })
        ));
        assert!(matches!(
            p.add_number("y", 0.5, f32::NAN, 1.0, 0.1),
            Err(PanelError::InvalidRange { .. })
        ));
        assert!(matches!(
            p.add_number("z", f32::NAN, 0.0, 1.0, 0.1),
            Err(PanelError::NotFinite { .. })
        ));
        assert!(p.is_empty());
        assert!(p.add_number("x", 1.0, 1.0, 1.0, 0.0).is_ok());
    }

    #[test]
    fn non_finite_edits_leave_the_value_alone() {
        let mut p = panel();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                p.set("subdivisions", ParamValue::Number(bad)),
                Err(PanelError::NotFinite { .. })
            ));
            assert!(matches!(
                p.sync("subdivisions", ParamValue::Number(bad)),
                Err(PanelError::NotFinite { .. })
            ));
        }
        assert_eq!(p.get("subdivisions"), Some(ParamValue::Number(2.0)));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn sync_is_silent_and_toggle_flips_visibility() {
        let mut p = panel();
        p.sync("wireframe", ParamValue::Bool(true)).unwrap();
        assert_eq!(p.get("wireframe"), Some(ParamValue::Bool(true)));
        assert!(p.drain_events().is_empty());
        assert!(p.is_visible());
        p.toggle_visible();
        assert!(!p.is_visible());
    }

    #[test]
    fn show_runs_headless() {
        let ctx = egui::Context::default();
        let mut p = panel();
        let _ = ctx.run(egui::RawInput::default(), |ctx| p.show(ctx));
        assert!(p.drain_events().is_empty());
    }
}
