//! WGPU-based rendering engine for the viewer
//!
//! Owns the surface, device and pipelines. Each frame draws every opaque
//! object with Phong lighting, then every blended object on top, then hands
//! the encoder to the overlay.

use std::sync::Arc;

use log::{error, info, warn};
use wgpu::{Device, TextureFormat};

use crate::{
    error::Result,
    frame::FrameSnapshot,
    gfx::{
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
            material::MaterialBindings,
            texture_resource::TextureResource,
        },
        scene::{
            object::DrawModel,
            scene::{ObjectBindings, RenderPassKind, Scene},
        },
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const OPAQUE_PIPELINE: &str = "Phong";
const BLENDED_PIPELINE: &str = "Blending";

/// `src * alpha + dst * (1 - alpha)` on every channel
const ALPHA_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_bindings: ObjectBindings,
    material_bindings: MaterialBindings,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Errors
    /// Fails if no surface, adapter or device can be obtained
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                // Scene textures may exceed the downlevel limit
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let object_bindings = ObjectBindings::new(&device);
        let material_bindings = MaterialBindings::new(&device);

        let layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_bindings.bind_group_layout().clone(),
            material_bindings.bind_group_layout().clone(),
        ];

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("phong", include_str!("phong.wgsl"));
        pipeline_manager.load_shader("blending", include_str!("blending.wgsl"));

        pipeline_manager.register_pipeline(
            OPAQUE_PIPELINE,
            PipelineConfig::default()
                .with_label("PHONG")
                .with_shader("phong")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(layouts.clone())
                .with_color_target(format, wgpu::BlendState::REPLACE),
        );

        pipeline_manager.register_pipeline(
            BLENDED_PIPELINE,
            PipelineConfig::default()
                .with_label("BLENDING")
                .with_shader("blending")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(layouts)
                .with_color_target(format, ALPHA_BLEND),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for e in errors {
                error!("{}", e);
            }
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_bindings,
            material_bindings,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Uploads the frame's uniforms and remembers its clear colour
    pub fn update(&mut self, frame: &FrameSnapshot) {
        let [r, g, b] = frame.clear_color;
        self.clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };
        update_global_ubo(&mut self.global_ubo, &self.queue, frame);
    }

    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                warn!("Skipping frame: {}", e);
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            // Blended objects must come after everything they can be seen through
            for (pipeline_name, pass) in [
                (OPAQUE_PIPELINE, RenderPassKind::Opaque),
                (BLENDED_PIPELINE, RenderPassKind::Blended),
            ] {
                let Some(pipeline) = self.pipeline_manager.pipeline(pipeline_name) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);

                for object in scene.objects_in(pass) {
                    render_pass.set_bind_group(1, object.transform_bind_group(), &[]);
                    render_pass.draw_model(&object.model);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    pub fn render_frame_with_ui<F>(&mut self, scene: &Scene, ui_callback: F)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.render_frame(scene, Some(ui_callback));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn object_bindings(&self) -> &ObjectBindings {
        &self.object_bindings
    }

    pub fn material_bindings(&self) -> &MaterialBindings {
        &self.material_bindings
    }
}
