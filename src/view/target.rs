use std::sync::Arc;

use winit::window::Window;

use super::gpu_init::GpuContext;
use crate::controller::DrawTarget;

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Window-backed render target: the surface, its configuration, and the
/// matching depth buffer. Resizing reconfigures all three together so the
/// backing buffer always equals what it was asked for, exactly.
pub struct ViewTarget {
    pub window: Arc<Window>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_view: wgpu::TextureView,
}

impl ViewTarget {
    pub fn new(window: Arc<Window>, gpu: GpuContext) -> Self {
        let (_, depth_view) = create_depth_texture(&gpu.device, gpu.config.width, gpu.config.height);
        Self {
            window,
            device: gpu.device,
            queue: gpu.queue,
            surface: gpu.surface,
            config: gpu.config,
            depth_view,
        }
    }

    /// Reapply the current configuration, used after a lost surface.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl DrawTarget for ViewTarget {
    fn drawable_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn buffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "resizing render target");
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        let (_, depth_view) = create_depth_texture(&self.device, width, height);
        self.depth_view = depth_view;
    }
}
