mod legacy;
mod literal;
mod normalize;
mod render;

pub use legacy::{decode_document, strip_marker};
pub use literal::{LiteralError, parse_reference, to_literal};
pub use normalize::{normalize, normalize_object};
pub use render::{OutputStyle, document_to_json, serialize, to_json};
