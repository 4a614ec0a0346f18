use std::future::Future;

use crate::display::image::DisplayImage;
use crate::error::DisplayError;

/// Something that can show a display image, e.g. a window's backing texture.
///
/// `present` may suspend while the upload completes. The render loop never
/// calls it concurrently and releases the image once it resolves.
pub trait DisplaySurface: Send + Sync + 'static {
    fn present(&self, image: &DisplayImage)
        -> impl Future<Output = Result<(), DisplayError>> + Send;
}
