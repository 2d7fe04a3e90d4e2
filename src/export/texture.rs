//! Lightmap textures and the image exporter writing them.

use super::{ExportStatus, Exportable, Exporter};
use crate::filesystem::FileSystem;
use image::{ColorType, DynamicImage, ImageFormat};
use log::debug;
use std::borrow::Cow;
use std::io;
use std::path::Path;

/// A baked lightmap or shadowmap texture.
#[derive(Debug, Clone, PartialEq)]
pub struct LightmapTexture {
    pub name: String,
    pub image: DynamicImage,
}

impl LightmapTexture {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

impl Exportable for LightmapTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn preferred_exporter(&self) -> Option<&str> {
        Some(TextureExporter::NAME)
    }

    fn texture(&self) -> Option<&DynamicImage> {
        Some(&self.image)
    }
}

/// Encodes texture pixel data as PNG, BMP or TGA depending on the
/// destination extension.
pub struct TextureExporter;

impl TextureExporter {
    pub const NAME: &'static str = "TextureExporter";
    const EXTENSIONS: [&'static str; 3] = ["png", "bmp", "tga"];
}

/// Converts to a pixel layout the target encoder accepts.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    match format {
        ImageFormat::Png if matches!(color, ColorType::Rgb32F | ColorType::Rgba32F) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        ImageFormat::Png => Cow::Borrowed(image),
        _ if matches!(
            color,
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
        ) =>
        {
            Cow::Borrowed(image)
        }
        _ => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
    }
}

impl Exporter for TextureExporter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn format_extensions(&self) -> &[&str] {
        &Self::EXTENSIONS
    }

    fn supports(&self, object: &dyn Exportable) -> bool {
        object.texture().is_some()
    }

    fn export(
        &self,
        object: &dyn Exportable,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> io::Result<ExportStatus> {
        let image = object.texture().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a texture", object.name()),
            )
        })?;
        let format = ImageFormat::from_path(path).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Unsupported image format for {}: {}", path.display(), e),
            )
        })?;
        debug!(
            "Encoding {} ({}x{}) as {:?}",
            object.name(),
            image.width(),
            image.height(),
            format
        );
        let mut buffer = io::Cursor::new(Vec::new());
        encodable(image, format)
            .write_to(&mut buffer, format)
            .map_err(|image_error| {
                io::Error::other(format!(
                    "Failed to encode image {}: {}",
                    path.display(),
                    image_error
                ))
            })?;
        fs.write_file(path, buffer.get_ref())?;
        Ok(ExportStatus::Exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFileSystem;
    use image::{Rgb32FImage, RgbaImage};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn lightmap() -> LightmapTexture {
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        LightmapTexture::new("Lightmap_0", DynamicImage::ImageRgba8(image))
    }

    #[test]
    fn test_writes_decodable_png() -> TestResult {
        let fs = MemoryFileSystem::new();
        let texture = lightmap();
        let path = Path::new("Lightmap_0.png");

        let status = TextureExporter.export(&texture, path, &fs)?;

        assert_eq!(status, ExportStatus::Exported);
        let data = fs.read_file(path)?;
        assert_eq!(image::guess_format(&data)?, ImageFormat::Png);
        let decoded = image::load_from_memory(&data)?.to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30, 255]);
        Ok(())
    }

    #[test]
    fn test_format_follows_extension() -> TestResult {
        let fs = MemoryFileSystem::new();
        TextureExporter.export(&lightmap(), Path::new("Lightmap_0.BMP"), &fs)?;
        let data = fs.read_file(Path::new("Lightmap_0.BMP"))?;
        assert_eq!(image::guess_format(&data)?, ImageFormat::Bmp);
        Ok(())
    }

    #[test]
    fn test_float_textures_are_converted() -> TestResult {
        let fs = MemoryFileSystem::new();
        let hdr = LightmapTexture::new("Hdr", DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2)));
        TextureExporter.export(&hdr, Path::new("Hdr.png"), &fs)?;
        TextureExporter.export(&hdr, Path::new("Hdr.tga"), &fs)?;
        assert_eq!(fs.list_files(), vec!["Hdr.png", "Hdr.tga"]);
        Ok(())
    }

    #[test]
    fn test_supports_only_textures() {
        struct NotATexture;
        impl Exportable for NotATexture {
            fn name(&self) -> &str {
                "not a texture"
            }
        }
        assert!(TextureExporter.supports(&lightmap()));
        assert!(!TextureExporter.supports(&NotATexture));
        assert!(TextureExporter.handles_extension("PNG"));
        assert!(!TextureExporter.handles_extension("json"));
    }
}
