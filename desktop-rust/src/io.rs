use std::path::PathBuf;

use calorie_ai_rust::workflow::LoadedImage;
use eframe::egui;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select a food photo")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

pub fn preview_texture(ctx: &egui::Context, image: &LoadedImage) -> egui::TextureHandle {
    let size = [image.preview.width() as usize, image.preview.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.preview.as_raw());
    ctx.load_texture(
        image.path.to_string_lossy(),
        color_image,
        egui::TextureOptions::default(),
    )
}
