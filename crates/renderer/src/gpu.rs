//! GPU orchestration for the shader preview.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` turns validated shader stages into a render pipeline with a
//!   single uniform bind group layout; failure leaves no GPU object behind.
//! - `uniforms` mirrors the injected GLSL uniform block and is written
//!   through the queue each frame.
//! - `state` glues everything together and owns the active-pipeline slot the
//!   hot-reload swap operates on.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
