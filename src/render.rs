//! The renderer: pipeline, depth buffer and per-frame command encoding.
//!
//! Resource lifecycle:
//!
//! - the shader module, placeholder texture and its bind group are created once
//! - [`Renderer::resize`] reconfigures the output, replaces the depth buffer and
//!   rebuilds the pipeline under a new [`PipelineGeneration`]
//! - [`Renderer::prepare_scene`] allocates buffers for new resources and rebinds
//!   stale ones against the current pipeline
//! - [`Renderer::render`] draws every node whose resources are current and skips
//!   the rest with a warning

use std::iter;

use log::{debug, info, warn};

use crate::{
    context::Context,
    data_structures::{
        camera::Camera,
        mesh_renderer::MeshRenderer,
        scene_graph::{Scene, SceneNode},
        texture::{Texture, create_nearest_sampler},
    },
    error::{EngineError, Result},
    pipelines::{GpuResource, Pipeline, PipelineGeneration, basic},
};

/// Placeholder texture bound at group 2. Independent of the output format.
#[derive(Debug)]
struct TextureBinding {
    #[allow(unused)]
    texture: Texture,
    #[allow(unused)]
    sampler: wgpu::Sampler,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl TextureBinding {
    fn placeholder(ctx: &Context) -> Self {
        let texture = Texture::create_placeholder(&ctx.device, &ctx.queue);
        let layout = basic::texture_layout(&ctx.device);
        let sampler = create_nearest_sampler(&ctx.device);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("placeholder_texture_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        Self {
            texture,
            sampler,
            layout,
            bind_group,
        }
    }
}

/// What happened during one [`Renderer::render`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct Renderer {
    ctx: Context,
    shader: wgpu::ShaderModule,
    texture: TextureBinding,
    pipeline: Pipeline,
    depth_texture: Texture,
    clear_colour: wgpu::Color,
}

impl Renderer {
    /// Compiles `shader_source` and performs the initial configuration at the
    /// context's current size.
    pub fn new(mut ctx: Context, shader_source: &str, clear_colour: wgpu::Color) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Basic Shader"),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });
        let texture = TextureBinding::placeholder(&ctx);

        let (width, height) = ctx.size();
        ctx.reconfigure(width, height);
        let depth_texture =
            Texture::create_depth_texture(&ctx.device, [width, height], "depth_texture");
        let pipeline = basic::mk_basic_pipeline(
            &ctx.device,
            &shader,
            ctx.format(),
            &texture.layout,
            PipelineGeneration::default().next(),
        );
        info!("Renderer ready at {width}x{height} ({:?})", ctx.format());

        Self {
            ctx,
            shader,
            texture,
            pipeline,
            depth_texture,
            clear_colour,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn generation(&self) -> PipelineGeneration {
        self.pipeline.generation()
    }

    pub fn depth_size(&self) -> (u32, u32) {
        self.depth_texture.size()
    }

    pub fn set_clear_colour(&mut self, colour: wgpu::Color) {
        self.clear_colour = colour;
    }

    /// Rebuilds everything that depends on the output size or format.
    ///
    /// Every camera and mesh renderer bind group becomes stale; call
    /// [`Renderer::prepare_scene`] afterwards.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to {width}x{height}");
            return;
        }
        self.ctx.reconfigure(width, height);

        self.depth_texture.texture.destroy();
        self.depth_texture =
            Texture::create_depth_texture(&self.ctx.device, [width, height], "depth_texture");

        let generation = self.pipeline.generation().next();
        self.pipeline = basic::mk_basic_pipeline(
            &self.ctx.device,
            &self.shader,
            self.ctx.format(),
            &self.texture.layout,
            generation,
        );
        info!("Resized to {width}x{height}, pipeline now at {generation:?}");
    }

    /// Creates missing GPU resources and rebinds stale ones.
    pub fn prepare<R: GpuResource>(&self, resource: &mut R) {
        if let Err(e) = resource.prepare(&self.ctx, &self.pipeline) {
            warn!("Could not prepare {}: {e}", R::LABEL);
        }
    }

    pub fn prepare_nodes(&self, nodes: &mut [SceneNode]) {
        for node in nodes {
            node.visit_mut(&mut |node: &mut SceneNode| {
                if let Some(camera) = node.get_mut::<Camera>() {
                    self.prepare(camera);
                }
                if let Some(renderer) = node.get_mut::<MeshRenderer>() {
                    self.prepare(renderer);
                }
            });
        }
    }

    pub fn prepare_scene(&self, scene: &mut Scene) {
        self.prepare_nodes(std::slice::from_mut(&mut scene.camera));
        self.prepare_nodes(&mut scene.nodes);
    }

    pub fn render_scene(&self, scene: &Scene) -> Result<FrameStats> {
        self.render(scene.camera(), &scene.nodes)
    }

    /// Encodes and submits one frame.
    ///
    /// Matrices are drawn as they are; run the scene update first.
    pub fn render(&self, camera: Option<&Camera>, nodes: &[SceneNode]) -> Result<FrameStats> {
        if let Some(reason) = self.ctx.lost_reason() {
            return Err(EngineError::DeviceLost(reason.to_string()));
        }
        let Some(camera) = camera else {
            warn!("No camera to render with");
            return Ok(FrameStats::default());
        };
        if nodes.is_empty() {
            warn!("Nothing to render: the scene is empty");
            return Ok(FrameStats::default());
        }
        let generation = self.pipeline.generation();
        let camera_bind_group = match camera.bind_group() {
            Some(bind_group) if camera.resource_state(generation).is_drawable() => bind_group,
            _ => {
                warn!(
                    "Skipping frame: {} ({:?})",
                    EngineError::ResourceMissing(Camera::LABEL),
                    camera.resource_state(generation)
                );
                return Ok(FrameStats::default());
            }
        };
        camera.write_uniform(&self.ctx)?;

        let frame = self.ctx.acquire_frame()?;
        let view = frame.view();
        let mut stats = FrameStats::default();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline.render_pipeline);
            render_pass.set_bind_group(0, camera_bind_group, &[]);
            render_pass.set_bind_group(2, &self.texture.bind_group, &[]);

            for node in nodes {
                node.visit(&mut |node: &SceneNode| {
                    draw_node(&self.ctx, &mut render_pass, node, generation, &mut stats)
                });
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        frame.present();
        Ok(stats)
    }
}

fn draw_node(
    ctx: &Context,
    render_pass: &mut wgpu::RenderPass<'_>,
    node: &SceneNode,
    generation: PipelineGeneration,
    stats: &mut FrameStats,
) {
    let Some(renderer) = node.get::<MeshRenderer>() else {
        return;
    };
    let Some((vertex_buffer, bind_group)) = renderer.drawable(generation) else {
        warn!(
            "Skipping node '{}': {} ({:?})",
            node.name(),
            EngineError::ResourceMissing(MeshRenderer::LABEL),
            renderer.resource_state(generation)
        );
        stats.skipped += 1;
        return;
    };
    let vertex_count = renderer.mesh().vertex_count();
    if vertex_count == 0 {
        warn!("Skipping node '{}': mesh has no vertices", node.name());
        stats.skipped += 1;
        return;
    }
    if let Err(e) = renderer.update_uniform_buffer(ctx, node.transform().matrix()) {
        warn!("Skipping node '{}': {e}", node.name());
        stats.skipped += 1;
        return;
    }
    render_pass.set_bind_group(1, bind_group, &[]);
    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    render_pass.draw(0..vertex_count, 0..1);
    stats.drawn += 1;
}
