//! Offscreen frame capture and PNG encoding

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::gfx::resources::TextureResource;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("readback channel closed before the buffer was mapped")]
    Canceled,
    #[error("cannot capture surface format {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),
    #[error("readback size does not match a {width}x{height} image")]
    Size { width: u32, height: u32 },
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Channel order of a capturable 8-bit color format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    Rgba,
    Bgra,
}

impl PixelOrder {
    pub fn of(format: wgpu::TextureFormat) -> Result<Self, ScreenshotError> {
        use wgpu::TextureFormat::*;
        match format {
            Rgba8Unorm | Rgba8UnormSrgb => Ok(PixelOrder::Rgba),
            Bgra8Unorm | Bgra8UnormSrgb => Ok(PixelOrder::Bgra),
            other => Err(ScreenshotError::UnsupportedFormat(other)),
        }
    }
}

/// Row pitch of a 4-byte-per-pixel copy, rounded up to wgpu's alignment
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strips row padding and reorders channels to RGBA
pub fn unpad_rows(
    data: &[u8],
    width: u32,
    height: u32,
    padded_row: u32,
    order: PixelOrder,
) -> Result<Vec<u8>, ScreenshotError> {
    let row = (width * 4) as usize;
    let padded_row = padded_row as usize;
    if padded_row < row || data.len() < padded_row * height as usize {
        return Err(ScreenshotError::Size { width, height });
    }

    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }

    if order == PixelOrder::Bgra {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    Ok(pixels)
}

/// Renders one frame offscreen through `encode` and reads it back
///
/// `encode` receives the encoder and the color view to draw into; the
/// caller provides a depth buffer of the same size.
pub fn capture_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    encode: impl FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
) -> Result<RgbaImage, ScreenshotError> {
    let order = PixelOrder::of(format)?;
    let target =
        TextureResource::create_readback_target(device, width, height, format, "Screenshot Target");

    let padded_row = padded_bytes_per_row(width);
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Screenshot Readback"),
        size: (padded_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Screenshot Encoder"),
    });
    encode(&mut encoder, &target.view);
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::Wait)?;

    futures::executor::block_on(rx).map_err(|_| ScreenshotError::Canceled)??;

    let pixels = {
        let mapped = slice.get_mapped_range();
        unpad_rows(&mapped, width, height, padded_row, order)?
    };
    buffer.unmap();

    RgbaImage::from_raw(width, height, pixels).ok_or(ScreenshotError::Size { width, height })
}

/// Writes the image as PNG regardless of the file extension
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), ScreenshotError> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
