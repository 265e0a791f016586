pub(crate) mod tool;
