//! WebGPU reel render pipeline
//!
//! Draws every reel in one fullscreen pass. The fragment shader samples the
//! reel atlas; per-frame input is just the camera and one angle per reel.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::strip::ReelAtlas;
use super::ReelRenderer;
use crate::consts::MAX_REELS;
use crate::error::{AssetError, ReelError};
use crate::layout::{ReelLayout, Viewport};
use crate::settings::ReelConfig;
use crate::sim::ReelState;
use crate::wrap_angle;

// ============================================================================
// GPU DATA STRUCTURES (must match reel_shader.wgsl)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2], // offset 0
    reel_count: u32,      // offset 8
    strip_count: u32,     // offset 12
    camera: [f32; 4],     // offset 16 - left, right, bottom, top
    reel_radius: f32,     // offset 32
    reel_length: f32,     // offset 36
    _pad: [f32; 2],       // pad to 48 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ReelData {
    center: [f32; 2],
    scale: f32,
    angle: f32, // wrapped to [0, 2π) before narrowing
    strip: u32,
    _pad: [u32; 3], // 32-byte stride for the uniform array
}

// ============================================================================
// REEL RENDER STATE
// ============================================================================

pub struct ReelRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    reels_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    strip_count: usize,
    reel_radius: f32,
    reel_length: f32,
}

/// Acquire an adapter for `surface` and build the reel renderer on it
pub async fn init(
    instance: &wgpu::Instance,
    surface: wgpu::Surface<'static>,
    viewport: Viewport,
    atlas: &ReelAtlas,
    reel_config: &ReelConfig,
) -> Result<ReelRenderState, ReelError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| ReelError::SurfaceUnavailable(format!("no adapter: {e}")))?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    ReelRenderState::new(surface, &adapter, viewport, atlas, reel_config).await
}

impl ReelRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        viewport: Viewport,
        atlas: &ReelAtlas,
        reel_config: &ReelConfig,
    ) -> Result<Self, ReelError> {
        let (width, height) = (viewport.width.max(1), viewport.height.max(1));

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("reel-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| ReelError::SurfaceUnavailable(format!("no device: {e}")))?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| {
                ReelError::SurfaceUnavailable("surface reports no formats".to_string())
            })?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Atlas texture
        let image = atlas.image();
        let max = device.limits().max_texture_dimension_2d;
        if image.width() > max || image.height() > max {
            return Err(AssetError::TooLarge {
                width: image.width(),
                height: image.height(),
                max,
            }
            .into());
        }

        let atlas_size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("reel_atlas"),
            size: atlas_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            atlas_size,
        );
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("reel_atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            // Strips wrap vertically around the cylinder
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reel_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("reel_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                reel_count: 0,
                strip_count: atlas.strip_count() as u32,
                camera: [-1.0, 1.0, -1.0, 1.0],
                reel_radius: reel_config.reel_radius,
                reel_length: reel_config.reel_length,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let reels_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reels"),
            size: (std::mem::size_of::<ReelData>() * MAX_REELS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reel_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reel_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: reels_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&atlas_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reel_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("reel_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            reels_buffer,
            bind_group,
            size: (width, height),
            strip_count: atlas.strip_count(),
            reel_radius: reel_config.reel_radius,
            reel_length: reel_config.reel_length,
        })
    }

    /// Reconfigure the surface after it was lost or outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl ReelRenderer for ReelRenderState {
    type Error = wgpu::SurfaceError;

    fn resize(&mut self, viewport: Viewport) {
        if viewport.width > 0 && viewport.height > 0 {
            self.size = (viewport.width, viewport.height);
            self.config.width = viewport.width;
            self.config.height = viewport.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Update GPU buffers from reel state and render
    fn draw(&mut self, reels: &[ReelState], layout: &ReelLayout) -> Result<(), wgpu::SurfaceError> {
        let camera = layout.camera();
        let reel_count = reels.len().min(layout.placements().len()).min(MAX_REELS);

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            reel_count: reel_count as u32,
            strip_count: self.strip_count as u32,
            camera: [camera.left, camera.right, camera.bottom, camera.top],
            reel_radius: self.reel_radius,
            reel_length: self.reel_length,
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let mut reel_data = [ReelData::zeroed(); MAX_REELS];
        for (i, (reel, placement)) in reels
            .iter()
            .zip(layout.placements())
            .take(reel_count)
            .enumerate()
        {
            reel_data[i] = ReelData {
                center: placement.center.to_array(),
                scale: placement.scale,
                angle: wrap_angle(reel.angle()) as f32,
                strip: (i % self.strip_count.max(1)) as u32,
                _pad: [0; 3],
            };
        }
        self.queue
            .write_buffer(&self.reels_buffer, 0, bytemuck::cast_slice(&reel_data));

        // Render
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("reel_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("reel_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
