pub(crate) mod arena;
pub(crate) mod attr;
pub(crate) mod draw;
pub(crate) mod eval;
pub(crate) mod node;
