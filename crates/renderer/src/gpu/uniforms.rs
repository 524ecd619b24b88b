use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

/// Per-frame uniform state pushed to the active program.
///
/// The layout must match the std140 `FrameParams` block injected by
/// `compile::HEADER`: `vec2 iResolution`, `float iTime`, one pad float, then
/// `vec4 iMouse`.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub i_resolution: [f32; 2],
    pub i_time: f32,
    pub _padding0: f32,
    pub i_mouse: [f32; 4],
}

impl FrameUniforms {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            i_resolution: [size.width as f32, size.height as f32],
            i_time: 0.0,
            _padding0: 0.0,
            i_mouse: [0.0; 4],
        }
    }

    /// Refreshes every slot for the frame about to be drawn.
    ///
    /// Resolution is taken from the drawable size queried this same frame,
    /// never from a cached value, so a resize between frames is reflected
    /// immediately.
    pub fn update(&mut self, size: PhysicalSize<u32>, seconds: f32, mouse: [f32; 4]) {
        self.i_resolution = [size.width.max(1) as f32, size.height.max(1) as f32];
        self.i_time = seconds;
        self.i_mouse = mouse;
    }
}
