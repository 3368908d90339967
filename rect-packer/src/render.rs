use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::{grid::EMPTY, Error, PackResult};

const EMPTY_COLOR: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Plain text layout: the grid as rows of ids, then one line per placement
/// and the waste figure.
pub fn text(result: &PackResult) -> String {
    let rows = result
        .grid
        .rows()
        .map(|row| {
            row.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>();
    let placements = result
        .placements
        .iter()
        .map(|p| {
            format!(
                "Rectangle {}x{} (ID: {}) placed at ({}, {})\n",
                p.item.width(),
                p.item.height(),
                p.id,
                p.origin.x,
                p.origin.y
            )
        })
        .collect::<String>();
    format!(
        "Grid Layout:\n{}\n\nRectangle Placements:\n{}\nTotal Waste: {}",
        rows.join("\n"),
        placements,
        result.waste
    )
}

pub fn json(result: &PackResult) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Draws each cell as a `scale`x`scale` block coloured by its owner.
pub fn image(result: &PackResult, scale: u32) -> Result<RgbaImage, Error> {
    if scale == 0 {
        return Err(Error::InvalidScale);
    }
    let grid = &result.grid;
    let (width, height) = match (
        grid.width().checked_mul(scale),
        grid.height().checked_mul(scale),
    ) {
        (Some(width), Some(height)) => (width, height),
        _ => return Err(Error::ImageTooLarge { scale }),
    };
    Ok(RgbaImage::from_fn(
        width,
        height,
        |x, y| match grid.get(x / scale, y / scale) {
            Some(EMPTY) | None => EMPTY_COLOR,
            Some(id) => color(id),
        },
    ))
}

pub fn save_png<P: AsRef<Path>>(result: &PackResult, scale: u32, path: P) -> Result<(), Error> {
    image(result, scale)?.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Distinct, stable colour per id. Hues step by the golden angle so
/// neighbouring ids never look alike.
fn color(id: u32) -> Rgba<u8> {
    let hue = (id as f32 * 0.618_034).fract();
    let rgb = hsv_to_rgb(hue, 0.6, 0.95) * 255.0;
    Rgba([rgb.x as u8, rgb.y as u8, rgb.z as u8, 255])
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> glam::Vec3 {
    let k = glam::vec3(5.0, 3.0, 1.0) + glam::Vec3::splat(h * 6.0);
    let k = glam::vec3(k.x % 6.0, k.y % 6.0, k.z % 6.0);
    let t = (glam::Vec3::splat(4.0) - k).min(k).clamp(glam::Vec3::ZERO, glam::Vec3::ONE);
    glam::Vec3::splat(v) - t * (v * s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pack, Bin, Item};

    fn small() -> PackResult {
        let items = [Item::new(2, 1).unwrap(), Item::new(1, 1).unwrap()];
        pack(Bin::new(3, 2).unwrap(), &items)
    }

    #[test]
    fn text_layout() {
        let expected = "\
Grid Layout:
1 1 2
0 0 0

Rectangle Placements:
Rectangle 2x1 (ID: 1) placed at (0, 0)
Rectangle 1x1 (ID: 2) placed at (2, 0)

Total Waste: 3";
        assert_eq!(text(&small()), expected);
    }

    #[test]
    fn json_carries_grid_and_placements() {
        let value: serde_json::Value = serde_json::from_str(&json(&small()).unwrap()).unwrap();
        assert_eq!(value["grid"], serde_json::json!([[1, 1, 2], [0, 0, 0]]));
        assert_eq!(value["waste"], 3);
        assert_eq!(value["placements"][1]["id"], 2);
        assert_eq!(value["placements"][1]["origin"], serde_json::json!([2, 0]));
        assert_eq!(value["unplaced"], serde_json::json!([]));
    }

    #[test]
    fn image_blocks() {
        let img = image(&small(), 4).unwrap();
        assert_eq!(img.dimensions(), (12, 8));
        assert_eq!(*img.get_pixel(0, 0), *img.get_pixel(7, 3));
        assert_eq!(*img.get_pixel(0, 4), EMPTY_COLOR);
        assert_ne!(*img.get_pixel(0, 0), *img.get_pixel(8, 0));
        assert_ne!(*img.get_pixel(8, 0), EMPTY_COLOR);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(matches!(image(&small(), 0), Err(Error::InvalidScale)));
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let result = pack(Bin::new(10, 10).unwrap(), &[Item::new(1, 1).unwrap()]);
        assert!(matches!(
            image(&result, 1 << 29),
            Err(Error::ImageTooLarge { scale }) if scale == 1 << 29
        ));
        assert!(matches!(
            save_png(&result, u32::MAX, "unused.png"),
            Err(Error::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn text_lists_nothing_when_all_dropped() {
        let result = pack(Bin::new(2, 2).unwrap(), &[Item::new(3, 3).unwrap()]);
        assert_eq!(
            text(&result),
            "Grid Layout:\n0 0\n0 0\n\nRectangle Placements:\n\nTotal Waste: 4"
        );
    }

    #[test]
    fn palette_is_distinct() {
        let colors = (1..=16).map(color).collect::<Vec<_>>();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
