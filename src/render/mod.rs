mod format;
mod label;
mod renderer;
mod resizer;

pub use format::{encode_png, write_atomic};
pub use label::{LabelFont, draw_label, label_box};
pub use renderer::{RenderedThumbnail, Renderer};
pub use resizer::{fit_within, resize_to_tier};

#[cfg(test)]
pub(crate) use label::tests::system_font;
