use std::cell::Cell;

use glam::{Vec2, Vec3, Vec4};

use crate::framebuffer::{ClearValue, Framebuffer};
use crate::image::Image;
use crate::pipeline::{CullMode, DrawCall, DrawInputs, FrontFace};
use crate::shader::{FragmentStage, VertexOutput, VertexStage};

use super::{EngineOptions, RasterEngine};

/// Counters accumulated across draws.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub draws: u64,
    /// Primitives assembled (per instance).
    pub primitives: u64,
    /// Primitives dropped because a vertex lies behind the eye or is not finite.
    pub rejected: u64,
    /// Primitives dropped by face culling or zero area.
    pub culled: u64,
    /// Fragments that passed the depth test and were written.
    pub fragments: u64,
}

/// Single-threaded reference rasterizer.
///
/// Triangles with any vertex at `w <= 0` are rejected rather than clipped.
/// Coverage is sampled at pixel centers with edge functions; depth is the
/// linearly interpolated NDC `z` in `[0, 1]`, tested with `less`.
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    options: EngineOptions,
    stats: Cell<RasterStats>,
}

/// A vertex after the perspective divide and viewport transform.
#[derive(Debug, Copy, Clone)]
struct ScreenVertex {
    ndc: Vec3,
    screen: Vec2,
}

impl SoftwareRasterizer {
    pub fn new(options: EngineOptions) -> Self {
        log::debug!("software rasterizer options: {options:?}");
        Self {
            options,
            stats: Cell::new(RasterStats::default()),
        }
    }

    #[inline]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn stats(&self) -> RasterStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(RasterStats::default());
    }

    fn bump(&self, f: impl FnOnce(&mut RasterStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn to_screen(&self, clip: Vec4, width: u32, height: u32) -> Option<ScreenVertex> {
        if !self.options.optimize && !clip.is_finite() {
            log::warn!("vertex stage produced a non-finite clip position {clip}");
            return None;
        }
        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip.truncate() / clip.w;
        let screen = Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        );
        Some(ScreenVertex { ndc, screen })
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_triangle<W, F>(
        &self,
        verts: [ScreenVertex; 3],
        working: &W,
        fragment: &F,
        depth_test: bool,
        depth_write: bool,
        color: &mut Image,
        mut depth: Option<&mut Image>,
    ) where
        F: FragmentStage<W>,
    {
        let [a, b, c] = verts.map(|v| v.screen);
        let area = edge(a, b, c);
        if area == 0.0 {
            return;
        }
        let inv_area = 1.0 / area;

        let (width, height) = color.size();
        let min = a.min(b).min(c).floor().max(Vec2::ZERO);
        let max = a.max(b).max(c).ceil().min(Vec2::new(width as f32, height as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let Some(colors) = color.colors_mut() else {
            return;
        };
        let depth_width = depth.as_ref().map_or(0, |d| d.width()) as usize;
        let mut depths = depth.as_mut().and_then(|d| d.depths_mut());

        let mut written = 0u64;
        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let l0 = edge(b, c, p) * inv_area;
                let l1 = edge(c, a, p) * inv_area;
                let l2 = edge(a, b, p) * inv_area;
                if l0 < 0.0 || l1 < 0.0 || l2 < 0.0 {
                    continue;
                }

                let z = l0 * verts[0].ndc.z + l1 * verts[1].ndc.z + l2 * verts[2].ndc.z;
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }

                if let Some(depths) = depths.as_deref_mut() {
                    let slot = y as usize * depth_width + x as usize;
                    if let Some(stored) = depths.get_mut(slot) {
                        if depth_test && z >= *stored {
                            continue;
                        }
                        if depth_write {
                            *stored = z;
                        }
                    }
                }

                colors[y as usize * width as usize + x as usize] = fragment.shade(working);
                written += 1;
            }
        }

        self.bump(|s| s.fragments += written);
    }
}

impl RasterEngine for SoftwareRasterizer {
    fn clear(&self, framebuffer: &mut Framebuffer<'_>, values: &[ClearValue]) {
        for (image, value) in framebuffer.attachments_mut().zip(values) {
            value.apply(image);
        }
    }

    fn render_indexed<V, F>(&self, call: DrawCall<'_, '_, V, F>)
    where
        V: VertexStage,
        F: FragmentStage<V::Working>,
    {
        let (inputs, framebuffer) = call.into_parts();
        let (width, height) = framebuffer.size();
        let (color, mut depth) = framebuffer.targets_mut();
        let Some(color) = color else {
            log::warn!("draw skipped: framebuffer has no color attachment");
            return;
        };

        let pipeline = inputs.pipeline();
        let depth_state = pipeline.depth();
        let depth_test = depth_state.test && depth.is_some();

        self.bump(|s| s.draws += 1);

        for instance in 0..inputs.instance_count() {
            for primitive in 0..inputs.primitive_count() {
                self.bump(|s| s.primitives += 1);

                let outputs = assemble(&inputs, primitive, instance);
                let working = pipeline.provoking_vertex().select(outputs.map(|o| o.working));

                let screen = outputs.map(|o| self.to_screen(o.clip, width, height));
                let [Some(v0), Some(v1), Some(v2)] = screen else {
                    self.bump(|s| s.rejected += 1);
                    continue;
                };
                let verts = [v0, v1, v2];

                if is_culled(&verts, pipeline.cull_mode(), pipeline.front_face()) {
                    self.bump(|s| s.culled += 1);
                    continue;
                }

                self.fill_triangle(
                    verts,
                    &working,
                    pipeline.fragment_stage(),
                    depth_test,
                    depth_state.write,
                    color,
                    depth.as_deref_mut(),
                );
            }
        }

        log::trace!("draw finished: {:?}", self.stats());
    }
}

/// Vertex stage outputs for the three corners of `primitive`.
fn assemble<V, F>(
    inputs: &DrawInputs<'_, V, F>,
    primitive: u32,
    instance: u32,
) -> [VertexOutput<V::Working>; 3]
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    inputs
        .primitive(primitive)
        .map(|vertex| inputs.invoke_vertex(vertex, instance))
}

/// Zero-area primitives are always culled.
fn is_culled(verts: &[ScreenVertex; 3], cull: CullMode, front_face: FrontFace) -> bool {
    let [a, b, c] = verts.map(|v| v.ndc.truncate());
    let area = edge(a, b, c);
    if area == 0.0 {
        return true;
    }

    let front = match front_face {
        FrontFace::CounterClockwise => area > 0.0,
        FrontFace::Clockwise => area < 0.0,
    };

    match cull {
        CullMode::None => false,
        CullMode::Front => front,
        CullMode::Back => !front,
    }
}

/// Twice the signed area of `(a, b, p)`; positive when counter-clockwise in a
/// +Y-up space.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageFormat, PackedColor};
    use crate::pipeline::{IndexBuffer, PipelineDescriptor, VertexBinding, VertexBuffer};
    use crate::scene::{Instance, Mesh, Uniforms, Vertex};
    use crate::shader::{FlatColorFragment, InstanceColorVertex};
    use glam::Mat4;

    const BG: PackedColor = PackedColor(0x787878FF);

    fn pipeline(cull: CullMode) -> PipelineDescriptor<InstanceColorVertex, FlatColorFragment> {
        PipelineDescriptor::builder(InstanceColorVertex, FlatColorFragment)
            .binding(VertexBinding::per_vertex::<Vertex>())
            .binding(VertexBinding::per_instance::<Instance>())
            .cull_mode(cull)
            .build()
            .unwrap()
    }

    fn render(
        engine: &SoftwareRasterizer,
        pipeline: &PipelineDescriptor<InstanceColorVertex, FlatColorFragment>,
        mesh: &Mesh,
        instances: &[Instance],
        size: u32,
    ) -> (Image, Image) {
        let mut color = Image::allocate(size, size, ImageFormat::Rgba8);
        let mut depth = Image::allocate(size, size, ImageFormat::Depth32);
        let uniforms = Uniforms::default();
        {
            let mut fb = Framebuffer::new(size, size, vec![&mut color, &mut depth]);
            engine.clear(&mut fb, &[ClearValue::Color(BG), ClearValue::Depth(1.0)]);

            let call = DrawCall::builder(pipeline, &mut fb, &uniforms)
                .vertex_buffer(VertexBuffer::new(&mesh.vertices))
                .vertex_buffer(VertexBuffer::new(instances))
                .indices(IndexBuffer::new(&mesh.indices))
                .instance_count(instances.len() as u32)
                .build()
                .unwrap();
            engine.render_indexed(call);
        }
        (color, depth)
    }

    #[test]
    fn triangle_is_filled_with_flat_instance_color() {
        let engine = SoftwareRasterizer::default();
        let mesh = Mesh::triangle();
        let instances = [Instance::new(Mat4::IDENTITY, PackedColor(0xFFCC9966))];

        let (color, depth) = render(&engine, &pipeline(CullMode::None), &mesh, &instances, 16);

        // Center is covered, corners are not.
        assert_eq!(color.color_at(8, 8), Some(PackedColor(0xFFCC9966)));
        assert_eq!(color.color_at(0, 15), Some(BG));
        assert_eq!(depth.depth_at(8, 8), Some(0.0));

        let stats = engine.stats();
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.primitives, 1);
        assert!(stats.fragments > 0);
    }

    #[test]
    fn every_written_fragment_has_the_instance_color() {
        let engine = SoftwareRasterizer::default();
        let mesh = Mesh::triangle();
        let instances = [Instance::new(Mat4::IDENTITY, PackedColor(0x11223344))];

        let (color, _) = render(&engine, &pipeline(CullMode::None), &mesh, &instances, 32);
        let texels = color.colors().unwrap();
        let painted = texels.iter().filter(|&&c| c != BG).count() as u64;

        assert_eq!(painted, engine.stats().fragments);
        assert!(texels.iter().all(|&c| c == BG || c == PackedColor(0x11223344)));
    }

    #[test]
    fn back_faces_are_culled() {
        // Apex-down triangle (0,-0.5) -> (0.5,0.5) -> (-0.5,0.5) winds CCW in NDC.
        let mesh = Mesh::triangle();
        let flipped = Mesh::new(mesh.vertices.clone(), vec![0, 2, 1]);
        let instances = [Instance::new(Mat4::IDENTITY, PackedColor::WHITE)];

        let engine = SoftwareRasterizer::default();
        render(&engine, &pipeline(CullMode::Back), &mesh, &instances, 8);
        assert_eq!(engine.stats().culled, 0);

        let engine = SoftwareRasterizer::default();
        let (color, _) = render(&engine, &pipeline(CullMode::Back), &flipped, &instances, 8);
        assert_eq!(engine.stats().culled, 1);
        assert!(color.colors().unwrap().iter().all(|&c| c == BG));
    }

    #[test]
    fn reset_stats_clears_counters() {
        let mesh = Mesh::triangle();
        let instances = [Instance::new(Mat4::IDENTITY, PackedColor::WHITE)];

        let engine = SoftwareRasterizer::default();
        render(&engine, &pipeline(CullMode::None), &mesh, &instances, 8);
        assert_eq!(engine.stats().draws, 1);

        engine.reset_stats();
        assert_eq!(engine.stats(), RasterStats::default());

        render(&engine, &pipeline(CullMode::None), &mesh, &instances, 8);
        assert_eq!(engine.stats().draws, 1);
        assert_eq!(engine.stats().primitives, 1);
    }

    #[test]
    fn nearer_instance_wins_depth_test() {
        let mesh = Mesh::triangle();
        let near = Instance::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 0.2)), PackedColor(0x00FF00FF));
        let far = Instance::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 0.6)), PackedColor(0xFF0000FF));

        for order in [[near, far], [far, near]] {
            let engine = SoftwareRasterizer::default();
            let (color, depth) = render(&engine, &pipeline(CullMode::None), &mesh, &order, 16);
            assert_eq!(color.color_at(8, 8), Some(PackedColor(0x00FF00FF)));
            approx::assert_abs_diff_eq!(depth.depth_at(8, 8).unwrap(), 0.2, epsilon = 1e-6);
        }
    }

    #[test]
    fn vertices_behind_the_eye_reject_the_primitive() {
        let mesh = Mesh::triangle();
        let behind = Mat4::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::new(0.0, 0.0, 0.0, -1.0));
        let instances = [Instance::new(behind, PackedColor::WHITE)];

        let engine = SoftwareRasterizer::default();
        let (color, _) = render(&engine, &pipeline(CullMode::None), &mesh, &instances, 8);

        assert_eq!(engine.stats().rejected, 1);
        assert!(color.colors().unwrap().iter().all(|&c| c == BG));
    }
}
