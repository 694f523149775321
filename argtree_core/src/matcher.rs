mod classifier;
mod names;

pub(crate) use classifier::*;
pub(crate) use names::*;
