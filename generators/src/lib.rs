mod draw;
mod identicon;
mod monster;
mod mystery_man;
mod pagan;
mod registry;
mod retro;
mod robot;

pub use mystery_man::MysteryMan;
pub use registry::{Generator, GeneratorRegistry, encode_png};
