pub(crate) mod doc;
pub(crate) mod geometry;
pub(crate) mod layer;
pub(crate) mod measure;
pub(crate) mod model;
