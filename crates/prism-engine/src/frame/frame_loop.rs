use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;

use crate::framebuffer::{ClearValue, DepthAttachment, Framebuffer};
use crate::image::HeapAllocator;
use crate::math::{projection, OrbitCamera};
use crate::overlay::Overlay;
use crate::pipeline::{
    CullMode, DrawCall, FrontFace, IndexBuffer, PipelineDescriptor, PipelineError, Topology,
    VertexBinding, VertexBuffer,
};
use crate::raster::{RasterEngine, Rasterizer};
use crate::scene::{Instance, Scene, Uniforms, Vertex};
use crate::shader::{FlatColorFragment, InstanceColorVertex};
use crate::time::FrameClock;
use crate::window::FrameSurface;

use super::EngineConfig;

pub type InstancedPipeline = PipelineDescriptor<InstanceColorVertex, FlatColorFragment>;

/// Pipeline for the orbiting instances: binding 0 per vertex, binding 1 per
/// instance, depth test + write, back faces culled, CCW front faces.
pub fn instanced_pipeline() -> Result<InstancedPipeline, PipelineError> {
    PipelineDescriptor::builder(InstanceColorVertex, FlatColorFragment)
        .binding(VertexBinding::per_vertex::<Vertex>())
        .binding(VertexBinding::per_instance::<Instance>())
        .depth_test(true)
        .depth_write(true)
        .cull_mode(CullMode::Back)
        .front_face(FrontFace::CounterClockwise)
        .topology(Topology::TriangleList)
        .build()
}

/// What one [`FrameLoop::step`] did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
    /// Seconds since the previous frame; zero on the first.
    pub dt: f32,
    /// Camera angle this frame rendered with.
    pub theta: f32,
    /// The depth attachment was (re)allocated this frame.
    pub depth_reallocated: bool,
}

/// Drives one surface, one rasterizer and one instanced draw per frame.
///
/// Fields drop in declaration order, which is also the teardown order:
/// overlay, surface, depth image, rasterizer.
pub struct FrameLoop<E, S, O>
where
    E: RasterEngine,
    S: FrameSurface,
    O: Overlay,
{
    overlay: O,
    surface: S,
    depth: DepthAttachment,
    allocator: HeapAllocator,
    rasterizer: Rc<Rasterizer<E>>,

    pipeline: InstancedPipeline,
    scene: Scene,
    camera: OrbitCamera,
    clock: FrameClock,
    uniforms: Uniforms,
    clear_values: Vec<ClearValue>,
    last_report: Option<FrameReport>,
}

impl<E, S, O> FrameLoop<E, S, O>
where
    E: RasterEngine,
    S: FrameSurface,
    O: Overlay,
{
    pub fn new(
        config: &EngineConfig,
        rasterizer: Rc<Rasterizer<E>>,
        surface: S,
        overlay: O,
        scene: Scene,
    ) -> Result<Self, PipelineError> {
        let pipeline = instanced_pipeline()?;
        log::debug!(
            "instanced pipeline ready: {} bindings, {} bytes of working data",
            pipeline.bindings().len(),
            pipeline.working_data_size()
        );

        Ok(Self {
            overlay,
            surface,
            depth: DepthAttachment::new(),
            allocator: HeapAllocator,
            rasterizer,
            pipeline,
            scene,
            camera: OrbitCamera::new(config.orbit_rate, config.radius_scale),
            clock: config.frame_clock(),
            uniforms: Uniforms::default(),
            clear_values: config.clear_values(),
            last_report: None,
        })
    }

    /// Replaces the per-attachment clear values.
    pub fn with_clear_values(mut self, values: Vec<ClearValue>) -> Self {
        self.clear_values = values;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn rasterizer(&self) -> &Rc<Rasterizer<E>> {
        &self.rasterizer
    }

    pub fn depth(&self) -> &DepthAttachment {
        &self.depth
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Uniforms of the last rendered frame.
    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Steps until the surface requests a close. Returns the frame count.
    pub fn run(&mut self) -> anyhow::Result<u64> {
        let mut frames = 0;
        while !self.surface.is_close_requested() {
            self.step()?;
            frames += 1;
        }
        log::info!("frame loop finished after {frames} frames");
        Ok(frames)
    }

    pub fn step(&mut self) -> anyhow::Result<FrameReport> {
        self.step_at(Instant::now())
    }

    /// Renders one frame as if it started at `now`.
    ///
    /// A failed clear aborts the frame before anything is drawn or presented.
    pub fn step_at(&mut self, now: Instant) -> anyhow::Result<FrameReport> {
        self.surface.poll();
        self.overlay.begin_frame(self.last_report.as_ref());

        let (width, height) = self.surface.framebuffer_size();

        let backbuffer = self.surface.backbuffer();
        let depth_reallocated = self.depth.ensure(width, height, &mut self.allocator);
        let depth = self
            .depth
            .image_mut()
            .context("depth attachment missing after validation")?;

        let time = self.clock.tick_at(now);
        let pose = self.camera.advance(time.dt());
        self.uniforms = Uniforms {
            projection: projection(width, height),
            view: pose.view,
        };

        let mut framebuffer = Framebuffer::new(width, height, vec![backbuffer, depth]);
        self.rasterizer
            .clear_framebuffer(&mut framebuffer, &self.clear_values)
            .with_context(|| format!("frame {}: clear failed", time.index))?;

        let instance_count = u32::try_from(self.scene.instances.len())
            .context("instance count exceeds u32")?;
        let call = DrawCall::builder(&self.pipeline, &mut framebuffer, &self.uniforms)
            .vertex_buffer(VertexBuffer::new(&self.scene.mesh.vertices))
            .vertex_buffer(VertexBuffer::new(&self.scene.instances))
            .indices(IndexBuffer::new(&self.scene.mesh.indices))
            .instance_count(instance_count)
            .build()?;
        self.rasterizer.render_indexed(call);

        self.overlay.render(&mut framebuffer);
        drop(framebuffer);

        self.surface.swap_buffers()?;

        let report = FrameReport {
            frame_index: time.index,
            width,
            height,
            dt: time.dt(),
            theta: pose.theta,
            depth_reallocated,
        };
        log::trace!("{report:?}");

        self.last_report = Some(report);
        Ok(report)
    }

    /// Tears down in order: overlay, surface, depth image, rasterizer.
    ///
    /// The rasterizer is destroyed here only if no other holder remains.
    pub fn shutdown(self) {
        let Self {
            overlay,
            surface,
            mut depth,
            mut allocator,
            rasterizer,
            ..
        } = self;

        drop(overlay);
        drop(surface);
        depth.release(&mut allocator);
        log::info!("depth attachment released");

        if Rc::strong_count(&rasterizer) > 1 {
            log::warn!("rasterizer still shared at shutdown");
        }
        drop(rasterizer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageFormat, PackedColor};
    use crate::overlay::NoOverlay;
    use crate::raster::{EngineOptions, RenderError, SoftwareRasterizer};
    use crate::scene::Mesh;
    use crate::window::HeadlessSurface;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn frame_loop(
        surface: HeadlessSurface,
    ) -> FrameLoop<SoftwareRasterizer, HeadlessSurface, NoOverlay> {
        let config = EngineConfig {
            color_seed: Some(1),
            ..EngineConfig::default()
        };
        let rasterizer = Rc::new(Rasterizer::new(SoftwareRasterizer::new(EngineOptions::default())));
        let scene = config.build_scene(Mesh::cube());
        FrameLoop::new(&config, rasterizer, surface, NoOverlay, scene).unwrap()
    }

    // ── pipeline ──

    #[test]
    fn instanced_pipeline_layout() {
        let pipeline = instanced_pipeline().unwrap();
        let bindings = pipeline.bindings();

        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].stride, size_of::<Vertex>());
        assert_eq!(bindings[1].stride, size_of::<Instance>());
        assert_eq!(pipeline.working_data_size(), size_of::<PackedColor>());
        assert_eq!(pipeline.cull_mode(), CullMode::Back);
        assert!(pipeline.depth().test && pipeline.depth().write);
    }

    // ── step ──

    #[test]
    fn first_frame_allocates_depth_and_presents() {
        let mut frames = frame_loop(HeadlessSurface::new(32, 18));

        let report = frames.step_at(Instant::now()).unwrap();

        assert_eq!(report.frame_index, 0);
        assert_eq!((report.width, report.height), (32, 18));
        assert_eq!(report.dt, 0.0);
        assert!(report.depth_reallocated);
        assert_eq!(frames.depth().size(), Some((32, 18)));
        assert_eq!(frames.surface().presented(), 1);
        assert_eq!(frames.surface().polls(), 1);
    }

    #[test]
    fn depth_follows_surface_size() {
        let mut frames = frame_loop(HeadlessSurface::new(16, 16));
        let t0 = Instant::now();

        assert!(frames.step_at(t0).unwrap().depth_reallocated);
        assert!(!frames.step_at(t0 + Duration::from_millis(16)).unwrap().depth_reallocated);

        frames.surface_mut().set_size(24, 12);
        let report = frames.step_at(t0 + Duration::from_millis(32)).unwrap();
        assert!(report.depth_reallocated);
        assert_eq!(frames.depth().size(), Some((24, 12)));
        assert_eq!(frames.surface().frame().size(), (24, 12));
    }

    #[test]
    fn camera_renders_with_angle_from_frame_start() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8));
        let t0 = Instant::now();

        let first = frames.step_at(t0).unwrap();
        let second = frames.step_at(t0 + Duration::from_millis(100)).unwrap();
        let third = frames.step_at(t0 + Duration::from_millis(200)).unwrap();

        assert_eq!(first.theta, 0.0);
        assert_eq!(second.theta, 0.0);
        assert_relative_eq!(third.theta, 0.1 * 0.1, epsilon = 1e-5);
        assert_relative_eq!(frames.camera().angle(), 0.02, epsilon = 1e-5);
    }

    #[test]
    fn camera_advances_by_full_stall() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8));
        let t0 = Instant::now();

        frames.step_at(t0).unwrap();
        let report = frames.step_at(t0 + Duration::from_secs(2)).unwrap();

        assert_relative_eq!(report.dt, 2.0, epsilon = 1e-5);
        assert_relative_eq!(frames.camera().angle(), 2.0 * 0.1, epsilon = 1e-5);
    }

    #[test]
    fn same_instant_frames_report_zero_delta() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8));
        let t0 = Instant::now();

        frames.step_at(t0).unwrap();
        let report = frames.step_at(t0).unwrap();

        assert_eq!(report.dt, 0.0);
        assert_eq!(frames.camera().angle(), 0.0);
    }

    #[test]
    fn configured_cap_limits_camera_step() {
        let config = EngineConfig {
            color_seed: Some(1),
            max_frame_delta: Some(Duration::from_millis(250)),
            ..EngineConfig::default()
        };
        let rasterizer = Rc::new(Rasterizer::new(SoftwareRasterizer::new(EngineOptions::default())));
        let scene = config.build_scene(Mesh::triangle());
        let mut frames =
            FrameLoop::new(&config, rasterizer, HeadlessSurface::new(8, 8), NoOverlay, scene).unwrap();
        let t0 = Instant::now();

        frames.step_at(t0).unwrap();
        frames.step_at(t0 + Duration::from_secs(2)).unwrap();

        assert_relative_eq!(frames.camera().angle(), 0.25 * 0.1, epsilon = 1e-5);
    }

    #[test]
    fn uniforms_track_aspect() {
        let mut frames = frame_loop(HeadlessSurface::new(200, 100));
        frames.step_at(Instant::now()).unwrap();

        assert_eq!(frames.uniforms().projection, projection(200, 100));
    }

    #[test]
    fn mismatched_clear_values_fail_before_present() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8))
            .with_clear_values(vec![ClearValue::Color(PackedColor::WHITE)]);

        let err = frames.step_at(Instant::now()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::AttachmentCountMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(frames.surface().presented(), 0);
        assert_eq!(frames.surface().frame().color_at(0, 0), Some(PackedColor(0)));
        assert_eq!(frames.rasterizer().engine().stats().draws, 0);
    }

    #[test]
    fn run_stops_at_close_request() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8).with_frame_limit(3));

        assert_eq!(frames.run().unwrap(), 3);
        assert_eq!(frames.surface().presented(), 3);
        assert_eq!(frames.last_report().map(|r| r.frame_index), Some(2));
    }

    #[test]
    fn shutdown_releases_depth() {
        let mut frames = frame_loop(HeadlessSurface::new(8, 8));
        frames.step_at(Instant::now()).unwrap();
        let rasterizer = Rc::clone(frames.rasterizer());

        frames.shutdown();
        assert_eq!(Rc::strong_count(&rasterizer), 1);
    }

    #[test]
    fn depth_attachment_is_depth32() {
        let mut frames = frame_loop(HeadlessSurface::new(4, 4));
        frames.step_at(Instant::now()).unwrap();
        assert_eq!(
            frames.depth().image().map(|image| image.format()),
            Some(ImageFormat::Depth32)
        );
    }
}
