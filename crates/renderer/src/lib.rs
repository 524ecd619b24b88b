//! Renderer crate for fragview, a live GLSL shader preview.
//!
//! The module glues a `winit` window, a `wgpu` rendering pipeline, and a
//! polling source watcher together. The overall flow is:
//!
//! ```text
//!   CLI / fragview
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ GpuState::render ─▶ GPU UBO + quad draw
//!          ▲                   ▲
//!          │                   └── crossbeam channel ◀── watcher thread (500 ms poll)
//! ```
//!
//! `GpuState` owns all GPU resources (surface, device, pipeline, uniforms) and
//! guards the one invariant the whole crate is built around: the pipeline used
//! for a frame always came from a compile + link that fully succeeded. A
//! rejected edit never tears down the pipeline that is currently on screen.
//!
//! The fragment shader on disk is ShaderToy-style (`mainImage(out vec4, in
//! vec2)`); it is wrapped at load time so it can be compiled as Vulkan GLSL
//! and fed the `iTime` / `iResolution` / `iMouse` uniforms.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

mod compile;
mod gpu;
mod runtime;
mod watch;
mod window;

pub use compile::ShaderError;
pub use watch::{SourceWatcher, DEFAULT_POLL_INTERVAL};

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer which shader
/// files to compile, how large the preview window should be, and how often
/// the fragment source is polled for edits.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Path to the vertex shader; read once at start-up.
    pub vertex_source: PathBuf,
    /// Path to the fragment shader; re-read on the poll interval.
    pub fragment_source: PathBuf,
    /// How often the fragment source is polled for changes.
    pub poll_interval: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (800, 600),
            vertex_source: PathBuf::new(),
            fragment_source: PathBuf::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside the `window` module; `Renderer` simply
/// forwards the request so callers never touch winit or wgpu types.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the preview window and runs the render loop until the window is
    /// closed.
    ///
    /// Surface or device creation failure and an initial shader compile/link
    /// failure are fatal and propagate out of this call; once the loop is
    /// running, rejected shader edits are logged and the last-good program
    /// keeps rendering.
    pub fn run(self) -> Result<()> {
        window::run(&self.config)
    }
}
