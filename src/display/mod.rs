pub mod headless;
pub mod image;
pub mod surface;

pub use headless::HeadlessSurface;
pub use image::DisplayImage;
pub use surface::DisplaySurface;
