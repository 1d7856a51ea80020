//! Surface - the pixel buffer owned by one generation call

use tiny_skia::Pixmap;

use crate::generator::ArtworkError;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "test-hooks")]
static LIVE_SURFACES: AtomicUsize = AtomicUsize::new(0);

/// Surfaces acquired and not yet dropped, across all threads.
#[cfg(feature = "test-hooks")]
pub fn live_surface_count() -> usize {
    LIVE_SURFACES.load(Ordering::SeqCst)
}

/// Premultiplied RGBA raster, released when dropped.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface.
    ///
    /// Returns `None` when either side exceeds `max_dimension` or the
    /// rasterizer refuses the size; callers treat that as "no backend".
    pub fn acquire(width: u32, height: u32, max_dimension: u32) -> Option<Self> {
        if width > max_dimension || height > max_dimension {
            return None;
        }
        let pixmap = Pixmap::new(width, height)?;

        #[cfg(feature = "test-hooks")]
        LIVE_SURFACES.fetch_add(1, Ordering::SeqCst);

        Some(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Raw premultiplied RGBA bytes, row major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Encode as PNG, consuming the surface.
    pub fn into_png(self) -> Result<Vec<u8>, ArtworkError> {
        self.pixmap
            .encode_png()
            .map_err(|e| ArtworkError::Encode(e.to_string()))
    }
}

#[cfg(feature = "test-hooks")]
impl Drop for Surface {
    fn drop(&mut self) {
        LIVE_SURFACES.fetch_sub(1, Ordering::SeqCst);
    }
}
