#![allow(dead_code)]

use std::sync::Arc;

use lumen_ngin::{
    Camera, MeshRenderer, Scene, SceneNode,
    data_structures::mesh::Mesh,
    math::Vec3,
};

pub const SHADER: &str = include_str!("../../assets/shaders/basic.wgsl");

/// One triangle in the z = 0 plane facing +Z, large enough to cover the
/// centre of the default camera's view.
pub fn triangle_mesh() -> Arc<Mesh> {
    #[rustfmt::skip]
    let data = [
        -1.0, -1.0, 0.0,   0.0, 0.0, 1.0,   0.0, 1.0,
         1.0, -1.0, 0.0,   0.0, 0.0, 1.0,   1.0, 1.0,
         0.0,  1.0, 0.0,   0.0, 0.0, 1.0,   0.5, 0.0,
    ];
    Arc::new(Mesh::from_interleaved(&data).unwrap())
}

/// Default camera plus a single red triangle named "triangle".
pub fn triangle_scene(aspect: f32) -> Scene {
    let mut scene = Scene::new(Camera::new(aspect));
    scene.add(
        SceneNode::with_position("triangle", Vec3::new(0.0, 0.0, 0.0))
            .with_behavior(MeshRenderer::with_color(triangle_mesh(), [1.0, 0.0, 0.0, 1.0])),
    );
    scene
}

#[cfg(feature = "integration-tests")]
pub mod gpu {
    use std::{iter, time::Duration};

    use lumen_ngin::{context::Context, render::Renderer};

    pub fn headless_renderer(width: u32, height: u32, clear: wgpu::Color) -> Renderer {
        let ctx = futures::executor::block_on(Context::headless(width, height))
            .expect("integration tests need a GPU adapter");
        Renderer::new(ctx, super::SHADER, clear)
    }

    fn map_to_vec(ctx: &Context, buffer: &wgpu::Buffer) -> Vec<u8> {
        let slice = buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        ctx.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .unwrap();
        futures::executor::block_on(rx.receive()).unwrap().unwrap();
        let data = slice.get_mapped_range().to_vec();
        buffer.unmap();
        data
    }

    /// Copies `source` into a mappable buffer and returns its bytes.
    pub fn read_buffer(ctx: &Context, source: &wgpu::Buffer) -> Vec<u8> {
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: source.size(),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, source.size());
        ctx.queue.submit(iter::once(encoder.finish()));
        map_to_vec(ctx, &staging)
    }

    /// Reads the offscreen colour target. The width must be a multiple of 64
    /// so rows need no padding.
    pub fn read_frame(ctx: &Context) -> image::RgbaImage {
        let texture = ctx.offscreen_texture().expect("headless context");
        let (width, height) = ctx.size();
        assert_eq!(width % 64, 0, "row padding is not handled");
        let output = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame readback buffer"),
            size: (width * height * 4) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );
        ctx.queue.submit(iter::once(encoder.finish()));
        let data = map_to_vec(ctx, &output);
        image::RgbaImage::from_raw(width, height, data).unwrap()
    }
}
