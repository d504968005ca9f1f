// File: ticketbot-core/src/services/ticket_render.rs
//
// Turns a redemption link into a ticket picture: a QR code painted into a
// fixed square of the event's template image.

use std::path::{Path, PathBuf};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};
use url::Url;
use crate::Error;

/// The square of the template the code is painted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBox {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

pub const CODE_BOX: CodeBox = CodeBox { x: 259, y: 559, size: 220 };

/// Module colour. Painted through the mask.
pub const CODE_FOREGROUND: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
/// Background colour of the rendered code. Masked out when compositing.
pub const CODE_BACKGROUND: Rgba<u8> = Rgba([0x00, 0x07, 0xBA, 0xFF]);

const MODULE_PIXELS: u32 = 5;
const MASK_THRESHOLD: u8 = 127;

/// The username without its `@`. Empty means the links would open no bot.
pub fn bot_handle(bot_username: &str) -> Result<&str, Error> {
    let handle = bot_username.trim().trim_start_matches('@');
    if handle.is_empty() {
        return Err(Error::Config("BOT_USERNAME is not set, ticket links need it".into()));
    }
    Ok(handle)
}

/// `https://t.me/<bot>?start=ticket_<id>`
pub fn ticket_deep_link(bot_username: &str, ticket_id: i64) -> Result<Url, Error> {
    let mut url = Url::parse("https://t.me/")?;
    url.set_path(bot_handle(bot_username)?);
    url.query_pairs_mut()
        .append_pair("start", &format!("ticket_{}", ticket_id));
    Ok(url)
}

/// Renders `data` as a borderless QR code scaled to `size` x `size`.
pub fn render_code(data: &str, size: u32) -> Result<RgbaImage, Error> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)?;
    let raw = code
        .render::<Rgba<u8>>()
        .dark_color(CODE_FOREGROUND)
        .light_color(CODE_BACKGROUND)
        .quiet_zone(false)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();
    Ok(imageops::resize(&raw, size, size, FilterType::Nearest))
}

/// Paints the bright pixels of `code` onto `template` at `(x, y)`; pixels
/// outside the template are dropped.
pub fn composite(template: &mut RgbaImage, code: &RgbaImage, x: u32, y: u32) {
    let (width, height) = template.dimensions();
    for (cx, cy, pixel) in code.enumerate_pixels() {
        if pixel.to_luma()[0] <= MASK_THRESHOLD {
            continue;
        }
        let (tx, ty) = (x + cx, y + cy);
        if tx < width && ty < height {
            template.put_pixel(tx, ty, *pixel);
        }
    }
}

pub fn load_template(path: &Path) -> Result<RgbaImage, Error> {
    let img = image::open(path)
        .map_err(|e| Error::Precondition(format!("ticket template {} cannot be used: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Builds the finished ticket in memory.
pub fn render_ticket(template: &RgbaImage, link: &str) -> Result<RgbaImage, Error> {
    let mut ticket = template.clone();
    let code = render_code(link, CODE_BOX.size)?;
    composite(&mut ticket, &code, CODE_BOX.x, CODE_BOX.y);
    Ok(ticket)
}

/// Decodes an uploaded picture and stores it as PNG, so later loads never
/// depend on what format the platform delivered.
pub fn save_template(bytes: &[u8], dir: &Path, file_name: &str) -> Result<PathBuf, Error> {
    let img = image::load_from_memory(bytes)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    img.to_rgba8().save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

pub fn ticket_file_name(user_id: i64, event_id: i64) -> String {
    format!("ticket_{}_{}.png", user_id, event_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_template(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([10, 10, 10, 255]))
    }

    #[test]
    fn test_deep_link_shape() {
        let url = ticket_deep_link("@rout_bot", 42).unwrap();
        assert_eq!(url.as_str(), "https://t.me/rout_bot?start=ticket_42");
    }

    #[test]
    fn test_deep_link_needs_username() {
        for username in ["", "  ", "@"] {
            assert!(matches!(ticket_deep_link(username, 1), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_render_code_has_requested_size() {
        let code = render_code("https://t.me/rout_bot?start=ticket_1", 220).unwrap();
        assert_eq!(code.dimensions(), (220, 220));
        // zero border: the top-left finder pattern starts at the very corner
        assert_eq!(*code.get_pixel(0, 0), CODE_FOREGROUND);
    }

    #[test]
    fn test_composite_paints_only_modules_inside_box() {
        let mut template = blank_template(738, 1000);
        let link = "https://t.me/rout_bot?start=ticket_7";
        let code = render_code(link, CODE_BOX.size).unwrap();
        composite(&mut template, &code, CODE_BOX.x, CODE_BOX.y);

        let background = Rgba([10, 10, 10, 255]);
        let mut painted = 0;
        for (x, y, pixel) in template.enumerate_pixels() {
            let inside = x >= CODE_BOX.x
                && x < CODE_BOX.x + CODE_BOX.size
                && y >= CODE_BOX.y
                && y < CODE_BOX.y + CODE_BOX.size;
            if !inside {
                assert_eq!(*pixel, background, "pixel ({x}, {y}) outside the box changed");
            } else {
                // the masked-out background colour never reaches the template
                assert_ne!(*pixel, CODE_BACKGROUND);
                if *pixel == CODE_FOREGROUND {
                    painted += 1;
                }
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn test_composite_clips_small_template() {
        let mut template = blank_template(300, 600);
        let code = render_code("x", CODE_BOX.size).unwrap();
        composite(&mut template, &code, CODE_BOX.x, CODE_BOX.y);
        assert_eq!(template.dimensions(), (300, 600));
    }

    #[test]
    fn test_save_template_reencodes_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = Vec::new();
        blank_template(20, 20)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let path = save_template(&bytes, &dir.path().join("qr_templates"), "template_5.png").unwrap();
        assert!(path.exists());
        assert_eq!(load_template(&path).unwrap().dimensions(), (20, 20));
    }

    #[test]
    fn test_save_template_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_template(b"not an image", dir.path(), "t.png").is_err());
    }

    #[test]
    fn test_missing_template_is_a_precondition() {
        let err = load_template(Path::new("/nonexistent/template.png")).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }
}
