pub mod gate;

pub use gate::{PreviewGate, PreviewState, PreviewWindow};
