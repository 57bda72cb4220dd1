//! Configuration section definitions.
//!
//! Each module corresponds to a section in `svgweave.toml`:
//!
//! | Module   | TOML Section | Purpose                                |
//! |----------|--------------|----------------------------------------|
//! | `filter` | `[filter]`   | Output formats, image search paths     |
//! | `minify` | `[minify]`   | External minifier                      |
//! | `text`   | `[text]`     | Text to HTML conversion                |

mod filter;
mod minify;
mod text;

pub use filter::FilterSection;
pub use minify::MinifySection;
pub use text::TextSection;
