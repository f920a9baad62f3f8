//! Configuration section definitions.
//!
//! Each module corresponds to a section in `publish.toml`:
//!
//! | Module    | TOML Section | Purpose                                |
//! |-----------|--------------|----------------------------------------|
//! | `publish` | `[publish]`  | Resolution, output directory, postfix  |
//! | `input`   | `[input]`    | Documents to process, HTML output      |
//! | `stages`  | `[stages]`   | Per-type transformation stages         |

mod input;
mod publish;
mod stages;

pub use input::InputSection;
pub use publish::PublishSection;
pub use stages::StagesSection;
