use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferBindingType, Device,
    RenderPipeline as WgpuRenderPipeline, TextureFormat, TextureView,
};

const CELLS_BINDING: u32 = 0;
const PARAMS_BINDING: u32 = 1;

/// Pipeline that paints every cell as a flat rectangle.
///
/// No vertex buffers: the shader expands three vertices into a triangle
/// covering the window and looks each pixel's cell up in the cell buffer.
pub struct RenderPipeline {
    pipeline: WgpuRenderPipeline,
    cells_layout: BindGroupLayout,
}

/// Fragment-stage buffer slot in the cell grid bind group
fn fragment_buffer(binding: u32, ty: BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl RenderPipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cell-grid-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/render.wgsl").into()),
        });

        let cells_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cell-grid-layout"),
            entries: &[
                fragment_buffer(CELLS_BINDING, BufferBindingType::Storage { read_only: true }),
                fragment_buffer(PARAMS_BINDING, BufferBindingType::Uniform),
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cell-grid-pipeline-layout"),
            bind_group_layouts: &[&cells_layout],
            push_constant_ranges: &[],
        });

        // Opaque cells overwrite the target; nothing to cull or depth-test
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cell-grid-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            cells_layout,
        }
    }

    /// Bind the grid's cell states and render params for one frame
    pub fn create_bind_group(
        &self,
        device: &Device,
        cells_buffer: &Buffer,
        render_params_buffer: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cell-grid-bind-group"),
            layout: &self.cells_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: CELLS_BINDING,
                    resource: cells_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: PARAMS_BINDING,
                    resource: render_params_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Record a pass that paints the whole grid into `target`
    pub fn draw_cells(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &TextureView,
        bind_group: &BindGroup,
    ) {
        // Every pixel is written by the shader, so the clear value is never seen
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cell-grid-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
