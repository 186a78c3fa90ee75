pub mod model;
pub mod normalize;
pub mod parser;

pub use model::ScriptTurn;
pub use parser::SegmentParser;
