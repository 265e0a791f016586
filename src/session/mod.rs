pub(crate) mod background;
pub(crate) mod editor;
pub(crate) mod loader;
pub(crate) mod placeholder;
