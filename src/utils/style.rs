use crate::models::style::ColourTable;
use crate::reader::raster::RasterGrid;
use image::{ColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder, imageops};
use std::io::Cursor;

/// Colourises every cell of `grid` into a canvas of the same size.
pub fn paint_canvas(grid: &RasterGrid, table: &ColourTable) -> RgbaImage {
    let width = grid.width as u32;
    RgbaImage::from_fn(width, grid.height as u32, |x, y| {
        let raw = grid.values[(y * width + x) as usize];
        table.colour_for(raw, grid.nodata)
    })
}

/// A `tile_size` window of the canvas, clipped at the right and bottom edges.
pub struct CanvasTile {
    pub col: u32,
    pub row: u32,
    /// Pixel window as `(x0, y0)`, `(x1, y1)`.
    pub origin: (u32, u32),
    pub end: (u32, u32),
    pub image: RgbaImage,
}

pub fn cut_tiles(canvas: &RgbaImage, tile_size: u32) -> Vec<CanvasTile> {
    let tile_size = tile_size.max(1);
    let (width, height) = canvas.dimensions();
    let mut tiles = Vec::new();
    for row in 0..height.div_ceil(tile_size) {
        for col in 0..width.div_ceil(tile_size) {
            let x0 = col * tile_size;
            let y0 = row * tile_size;
            let x1 = (x0 + tile_size).min(width);
            let y1 = (y0 + tile_size).min(height);
            let image = imageops::crop_imm(canvas, x0, y0, x1 - x0, y1 - y0).to_image();
            tiles.push(CanvasTile {
                col,
                row,
                origin: (x0, y0),
                end: (x1, y1),
                image,
            });
        }
    }
    tiles
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut png_data = Vec::new();
    PngEncoder::new(Cursor::new(&mut png_data))
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ColorType::Rgba8.into(),
        )
        .map_err(|e| e.to_string())?;
    Ok(png_data)
}

/// Truecolour swatch of each colour stop, for terminal tables.
pub fn colour_bar(table: &ColourTable) -> String {
    table
        .stops()
        .iter()
        .filter(|stop| stop.alpha > 0)
        .map(|stop| {
            format!(
                "\x1b[38;2;{};{};{}m█\x1b[0m",
                stop.red, stop.green, stop.blue
            )
        })
        .collect()
}
