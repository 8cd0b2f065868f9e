//! Named value carriers ("plugins") for Raider flows: the expression/
//! dataflow half of the engine.

pub mod attr_match;
pub mod flags;
pub mod plugin;
pub mod registry;

pub use attr_match::AttrMatch;
pub use flags::PluginFlags;
pub use plugin::{AlterOp, HeaderMode, HtmlExtract, Plugin, PluginKind, UrlComponent};
pub use registry::{CustomExtractor, CustomPluginRegistry};
