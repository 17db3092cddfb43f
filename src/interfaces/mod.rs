pub mod subconverter;

pub use subconverter::{merge_and_convert, render, subconvert};
