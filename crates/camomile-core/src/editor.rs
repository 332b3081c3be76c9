//! Headless editor model.
//!
//! [`EditorView`] is the toolkit-independent half of a plugin editor: it
//! listens for patch changes and lays out one widget per bound parameter on
//! the grid described by a [`LookAndFeel`]. A GUI front end draws
//! [`EditorView::widgets`] and forwards user edits through
//! [`EditorView::set_value`].

use std::sync::Arc;

use camomile_config::LookAndFeel;
use parking_lot::Mutex;

use crate::host::HostParameters;
use crate::listener::PatchListener;
use crate::param::truncate_chars;
use crate::processor::Processor;

/// Shown in place of the grid when no patch is loaded.
pub const NO_PATCH_MESSAGE: &str = "No patch loaded";

/// Pixel rectangle of a widget within the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// One parameter control.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamWidget {
    /// Table slot the widget edits.
    pub index: usize,
    /// Parameter name.
    pub label: String,
    /// Display text, truncated to the configured width.
    pub text: String,
    /// Normalized value.
    pub value: f32,
    /// Step count; 0 draws a continuous slider.
    pub steps: u32,
    /// Cell on the editor grid.
    pub bounds: Bounds,
}

#[derive(Debug, Default)]
struct Layout {
    title: String,
    widgets: Vec<ParamWidget>,
    width: u32,
    height: u32,
}

/// Editor bound to one processor.
pub struct EditorView {
    processor: Arc<Processor>,
    look: LookAndFeel,
    layout: Mutex<Layout>,
}

impl EditorView {
    /// Build the editor, register it as a patch listener, and lay out the current patch.
    pub fn open(processor: Arc<Processor>, look: LookAndFeel) -> Arc<Self> {
        let view = Arc::new(Self {
            processor,
            look,
            layout: Mutex::new(Layout::default()),
        });
        view.processor.add_listener(&view);
        view.rebuild();
        view
    }

    /// The look-and-feel this editor was built with.
    pub fn look_and_feel(&self) -> &LookAndFeel {
        &self.look
    }

    /// Window title: the patch name, or [`NO_PATCH_MESSAGE`].
    pub fn title(&self) -> String {
        self.layout.lock().title.clone()
    }

    /// Current widgets in slot order.
    pub fn widgets(&self) -> Vec<ParamWidget> {
        self.layout.lock().widgets.clone()
    }

    /// Editor size in pixels for the current layout.
    pub fn size(&self) -> (u32, u32) {
        let layout = self.layout.lock();
        (layout.width, layout.height)
    }

    /// Apply a user edit from the widget at `index` and refresh its text.
    pub fn set_value(&self, index: usize, value: f32) {
        self.processor.set_parameter(index, value);
        let value = self.processor.parameter(index);
        let text = self.display_text(index);
        let mut layout = self.layout.lock();
        if let Some(widget) = layout.widgets.iter_mut().find(|w| w.index == index) {
            widget.value = value;
            widget.text = text;
        }
    }

    fn display_text(&self, index: usize) -> String {
        let max_chars = self.processor.config().text_max_chars;
        self.processor.parameter_text_truncated(index, max_chars)
    }

    fn rebuild(&self) {
        let max_chars = self.processor.config().text_max_chars;
        let widgets: Vec<ParamWidget> = self.processor.with_table(|table| {
            table
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_bound())
                .enumerate()
                .map(|(cell, (index, slot))| {
                    let (x, y, width, height) = self.look.cell_bounds(cell);
                    ParamWidget {
                        index,
                        label: slot.display_name(index).into_owned(),
                        text: truncate_chars(slot.text(), max_chars),
                        value: slot.normalized_value(),
                        steps: slot.step_count(),
                        bounds: Bounds {
                            x,
                            y,
                            width,
                            height,
                        },
                    }
                })
                .collect()
        });

        let name = self.processor.patch_name();
        let title = if name.is_empty() {
            NO_PATCH_MESSAGE.to_string()
        } else {
            name
        };
        let (width, height) = self.look.editor_size(widgets.len());
        tracing::debug!(title, widgets = widgets.len(), "editor layout rebuilt");

        *self.layout.lock() = Layout {
            title,
            widgets,
            width,
            height,
        };
    }
}

impl PatchListener for EditorView {
    fn patch_changed(&self) {
        self.rebuild();
    }
}

impl Drop for EditorView {
    fn drop(&mut self) {
        self.processor.listeners().prune();
    }
}

impl std::fmt::Debug for EditorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layout = self.layout.lock();
        f.debug_struct("EditorView")
            .field("title", &layout.title)
            .field("widgets", &layout.widgets.len())
            .finish()
    }
}
