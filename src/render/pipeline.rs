//! wgpu realization of the draw target: one pipeline for native-width lines,
//! one for thick quads, both stippled in the fragment stage.
//!
//! Vertices arrive in NDC (see [`super::render_segment`]), so the vertex
//! stage is a passthrough. The fragment stage projects the fragment's
//! framebuffer position onto the line direction in screen pixels and discards
//! it outside the pattern's on-intervals.

use wgpu::util::DeviceExt;

use super::stipple::{cycle_length, on_intervals, MAX_INTERVALS};
use super::vertex::LineVertex;
use super::{DrawBatch, DrawTarget, Topology};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

const LINE_SHADER: &str = r#"
struct LineUniform {
    start_px: vec2<f32>,
    end_px: vec2<f32>,
    cycle: f32,
    interval_count: f32,
    intervals: array<vec4<f32>, 3>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> line: LineUniform;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 1.0);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (line.cycle > 0.0) {
        let span = line.end_px - line.start_px;
        let len = length(span);
        if (len > 1.0e-4) {
            let d = dot(in.position.xy - line.start_px, span / len);
            let m = d - line.cycle * floor(d / line.cycle);
            var on = false;
            for (var i = 0; i < 3; i = i + 1) {
                let iv = line.intervals[i];
                if (f32(i) < line.interval_count && m >= iv.x && m < iv.y) {
                    on = true;
                }
            }
            if (!on) {
                discard;
            }
        }
    }
    return line.color;
}
"#;

/// Uniform block mirrored by the WGSL `LineUniform` above. Intervals are
/// padded to vec4 for uniform-buffer alignment, and `_pad` keeps the
/// intervals array on the 16-byte offset WGSL gives it.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniform {
    pub start_px: [f32; 2],
    pub end_px: [f32; 2],
    pub cycle: f32,
    pub interval_count: f32,
    pub _pad: [f32; 2],
    pub intervals: [[f32; 4]; MAX_INTERVALS],
    pub color: [f32; 4],
}

impl LineUniform {
    pub fn from_batch(batch: &DrawBatch) -> Self {
        let table = on_intervals(batch.dash);
        let mut intervals = [[0.0; 4]; MAX_INTERVALS];
        for (slot, iv) in intervals.iter_mut().zip(table) {
            slot[0] = iv[0];
            slot[1] = iv[1];
        }
        Self {
            start_px: batch.start_px.to_array(),
            end_px: batch.end_px.to_array(),
            cycle: cycle_length(batch.dash),
            interval_count: table.len() as f32,
            _pad: [0.0; 2],
            intervals,
            color: batch.color.to_array(),
        }
    }
}

/// One uploaded batch, ready to record into a render pass.
#[derive(Debug)]
pub struct LineDraw {
    pub topology: Topology,
    pub vertices: wgpu::Buffer,
    pub vertex_count: u32,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct LinePipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    line_pipeline: wgpu::RenderPipeline,
    quad_pipeline: wgpu::RenderPipeline,
}

impl LinePipelines {
    pub fn create(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cadview_line_shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cadview_line_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cadview_line_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = create_pipeline(
            device,
            format,
            &pipeline_layout,
            &shader,
            wgpu::PrimitiveTopology::LineList,
            "cadview_thin_line_pipeline",
        );
        let quad_pipeline = create_pipeline(
            device,
            format,
            &pipeline_layout,
            &shader,
            wgpu::PrimitiveTopology::TriangleList,
            "cadview_thick_line_pipeline",
        );

        Self {
            bind_group_layout,
            line_pipeline,
            quad_pipeline,
        }
    }

    /// Upload one batch: vertex buffer plus the uniform bind group.
    pub fn prepare(&self, device: &wgpu::Device, batch: &DrawBatch) -> LineDraw {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cadview_line_vertices"),
            contents: bytemuck::cast_slice(&batch.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = LineUniform::from_batch(batch);
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cadview_line_uniforms"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cadview_line_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        LineDraw {
            topology: batch.topology,
            vertices,
            vertex_count: batch.vertices.len() as u32,
            bind_group,
        }
    }

    pub fn record(&self, pass: &mut wgpu::RenderPass<'_>, draws: &[LineDraw]) {
        for draw in draws {
            let pipeline = match draw.topology {
                Topology::Lines => &self.line_pipeline,
                Topology::Triangles => &self.quad_pipeline,
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &draw.bind_group, &[]);
            pass.set_vertex_buffer(0, draw.vertices.slice(..));
            pass.draw(0..draw.vertex_count, 0..1);
        }
    }
}

/// [`DrawTarget`] that uploads every submitted batch straight to the device.
#[derive(Debug)]
pub struct GpuTarget<'a> {
    device: &'a wgpu::Device,
    pipelines: &'a LinePipelines,
    pub draws: Vec<LineDraw>,
}

impl<'a> GpuTarget<'a> {
    pub fn new(device: &'a wgpu::Device, pipelines: &'a LinePipelines) -> Self {
        Self {
            device,
            pipelines,
            draws: Vec::new(),
        }
    }

    pub fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.pipelines.record(pass, &self.draws);
    }
}

impl DrawTarget for GpuTarget<'_> {
    fn submit(&mut self, batch: DrawBatch) {
        let draw = self.pipelines.prepare(self.device, &batch);
        self.draws.push(draw);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[LineVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{DashPattern, Rgba};
    use glam::Vec2;

    fn batch(dash: DashPattern) -> DrawBatch {
        DrawBatch {
            topology: Topology::Lines,
            vertices: vec![
                LineVertex {
                    position: [0.0, 0.0, 0.0],
                },
                LineVertex {
                    position: [1.0, 0.0, 0.0],
                },
            ],
            color: Rgba::new(0.2, 0.4, 0.6, 1.0),
            width_px: 1.0,
            dash,
            start_px: Vec2::new(0.0, 300.0),
            end_px: Vec2::new(1000.0, 300.0),
            viewport_px: Vec2::new(1000.0, 600.0),
        }
    }

    #[test]
    fn uniform_packs_dash_table() {
        let uniform = LineUniform::from_batch(&batch(DashPattern::DashDot));
        assert_eq!(uniform.cycle, 22.0);
        assert_eq!(uniform.interval_count, 2.0);
        assert_eq!(uniform.intervals[0][..2], [0.0, 12.0]);
        assert_eq!(uniform.intervals[1][..2], [16.0, 18.0]);
        assert_eq!(uniform.intervals[2], [0.0; 4]);
        assert_eq!(uniform.color, [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn uniform_for_continuous_disables_stipple() {
        let uniform = LineUniform::from_batch(&batch(DashPattern::Continuous));
        assert_eq!(uniform.cycle, 0.0);
        assert_eq!(uniform.interval_count, 0.0);
    }

    #[test]
    fn uniform_layout_matches_wgsl_block() {
        // vec2 x2 + f32 x2 + pad + 3 x vec4 + vec4 = 96 bytes; the intervals
        // array must sit at the 16-byte-aligned offset WGSL assigns it.
        assert_eq!(std::mem::size_of::<LineUniform>(), 96);
        assert_eq!(std::mem::offset_of!(LineUniform, intervals), 32);
        assert_eq!(std::mem::offset_of!(LineUniform, color), 80);
    }
}
