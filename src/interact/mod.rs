pub(crate) mod controller;
pub(crate) mod event;
pub(crate) mod overlay;
