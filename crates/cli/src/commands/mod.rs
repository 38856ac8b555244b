pub(crate) mod sanitize;
pub(crate) mod simulate;
pub(crate) mod window;
