pub(crate) mod detect;
pub(crate) mod fallback;
pub(crate) mod geometry;
