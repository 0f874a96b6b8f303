pub mod canvas;
pub mod contour;
pub mod geometry;
pub mod layout;
pub mod palette;
pub mod raster;
pub mod rng;
pub mod session;
pub mod svg;
pub mod utils;
