//! Tray icon image, tinted to the desktop theme.

use image::RgbaImage;

static ICON_BYTES: &[u8] = include_bytes!("assets/icon.png");

/// Detects if the system is using light mode.
pub fn is_light_mode() -> bool {
    // Unspecified and detection errors fall back to dark mode (white icon)
    matches!(dark_light::detect(), Ok(dark_light::Mode::Light))
}

/// Creates an inverted (dark) version of the icon for light mode.
/// Preserves alpha channel while inverting RGB values.
pub fn create_dark_icon(image: &RgbaImage) -> RgbaImage {
    let mut dark = image.clone();
    for pixel in dark.pixels_mut() {
        pixel[0] = 255 - pixel[0];
        pixel[1] = 255 - pixel[1];
        pixel[2] = 255 - pixel[2];
    }
    dark
}

/// Decodes the embedded icon, using the dark variant on light themes.
pub fn themed_icon() -> Result<RgbaImage, image::ImageError> {
    let rgba = image::load_from_memory(ICON_BYTES)?.to_rgba8();

    if is_light_mode() {
        tracing::debug!("Light mode detected, using dark tray icon");
        Ok(create_dark_icon(&rgba))
    } else {
        tracing::debug!("Dark mode detected, using light tray icon");
        Ok(rgba)
    }
}

/// Converts RGBA pixels to the ARGB32 layout StatusNotifierItem expects.
pub fn to_argb(image: &RgbaImage) -> Vec<u8> {
    let mut argb = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        argb.extend_from_slice(&[pixel[3], pixel[0], pixel[1], pixel[2]]);
    }
    argb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_embedded_icon_decodes() {
        let image = image::load_from_memory(ICON_BYTES).unwrap().to_rgba8();
        assert!(image.width() > 0 && image.height() > 0);
    }

    #[test]
    fn test_create_dark_icon_keeps_alpha() {
        let mut image = RgbaImage::new(1, 1);
        image.put_pixel(0, 0, Rgba([255, 200, 0, 128]));

        let dark = create_dark_icon(&image);
        assert_eq!(dark.get_pixel(0, 0), &Rgba([0, 55, 255, 128]));
    }

    #[test]
    fn test_to_argb() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        image.put_pixel(1, 0, Rgba([5, 6, 7, 8]));

        assert_eq!(to_argb(&image), vec![4, 1, 2, 3, 8, 5, 6, 7]);
    }
}
