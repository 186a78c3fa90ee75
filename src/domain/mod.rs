pub mod audio;
pub mod bumper;
pub mod concat;
pub mod duration;
pub mod pipeline;
pub mod script;
pub mod shared;
pub mod synthesis;
pub mod voice;
