mod consumption;

pub use consumption::*;
