pub(crate) mod charts;
pub(crate) mod theme;
pub(crate) mod util;
