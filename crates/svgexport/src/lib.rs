/*!
This crate converts SVG documents held in memory into image files. An SVG can
be written verbatim, rasterized into a transparent PNG at a chosen resolution,
or vectorized into a single-page PDF. The output format is picked from the
extension of the destination path.
*/

mod common;
mod image;
mod pdf;
mod png;

pub use common::{prepare_svg_tree, CSS_DPI};
pub use image::{write as write_image, FileType};
