use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::FrameClock;
use crate::watch::{self, SourceWatcher};
use crate::RendererConfig;

/// Aggregates GPU and input state for the preview window.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    mouse: MouseState,
}

impl WindowState {
    fn new(window: Arc<Window>, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, vertex_source, fragment_source)?;
        Ok(Self {
            window,
            gpu,
            mouse: MouseState::default(),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }
}

/// Creates the window, seeds the watcher, and runs the event loop until the
/// window is closed.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let vertex_source = fs::read_to_string(&config.vertex_source).with_context(|| {
        format!(
            "failed to read vertex shader at {}",
            config.vertex_source.display()
        )
    })?;
    let fragment_source = fs::read_to_string(&config.fragment_source).with_context(|| {
        format!(
            "failed to read fragment shader at {}",
            config.fragment_source.display()
        )
    })?;

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("fragview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), &vertex_source, &fragment_source)
        .context("failed to initialise renderer")?;

    // The watcher thread owns polling; the loop below only drains its
    // channel, so frame pacing is never coupled to the poll interval.
    let watcher = SourceWatcher::new(
        &config.fragment_source,
        config.poll_interval,
        fragment_source,
    );
    let (watcher_handle, source_rx) = watch::spawn(watcher)?;

    let clock = FrameClock::new();

    info!(
        fragment = %config.fragment_source.display(),
        poll_ms = config.poll_interval.as_millis() as u64,
        "watching fragment shader for edits"
    );

    let run_result = event_loop.run(move |event, elwt| {
        // Keeps the watcher thread alive for as long as the loop runs.
        let _ = &watcher_handle;

        match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.mouse.handle_cursor_moved(position);
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button,
                        ..
                    } => {
                        if button == MouseButton::Left {
                            state.mouse.handle_button(button_state);
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        state.gpu.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.gpu.size());
                    }
                    WindowEvent::RedrawRequested => {
                        let mouse = state.mouse.as_uniform(state.gpu.size().height.max(1) as f32);
                        match state.gpu.render(clock.seconds(), mouse) {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                                state.gpu.resize(state.gpu.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting preview");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                warn!("surface error: {other:?}; retrying next frame");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                // Edits published by the watcher are applied between frames;
                // a rejected candidate leaves the active program in place.
                for source in source_rx.try_iter() {
                    match state.gpu.set_shader(&source) {
                        Ok(()) => info!("fragment shader reloaded"),
                        Err(err) => warn!("shader edit rejected; keeping active program\n{err}"),
                    }
                }
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Poll);
            }
            _ => {}
        }
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Latest pointer state, sampled once per frame.
///
/// Written only from the event loop thread, so reads never race; only the
/// most recent move and press matter.
#[derive(Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    press_anchor: Option<PhysicalPosition<f64>>,
}

impl MouseState {
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
    }

    /// A press snapshots the position at press time; releases and repeats of
    /// other buttons are ignored.
    fn handle_button(&mut self, state: ElementState) {
        if state == ElementState::Pressed {
            self.press_anchor = self.position;
        }
    }

    /// `(x, flippedY, clickX, flippedClickY)` with a bottom-left origin.
    fn as_uniform(&self, height: f32) -> [f32; 4] {
        let mut data = [0.0; 4];

        if let Some(pos) = self.position {
            data[0] = pos.x as f32;
            data[1] = height - pos.y as f32;
        }

        if let Some(anchor) = self.press_anchor {
            data[2] = anchor.x as f32;
            data[3] = height - anchor.y as f32;
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_records_the_position_at_press_time() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(10.0, 20.0));
        mouse.handle_button(ElementState::Pressed);
        mouse.handle_cursor_moved(PhysicalPosition::new(300.0, 400.0));

        let uniform = mouse.as_uniform(600.0);
        assert_eq!(uniform, [300.0, 200.0, 10.0, 580.0]);
    }

    #[test]
    fn release_is_ignored() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(5.0, 5.0));
        mouse.handle_button(ElementState::Pressed);
        mouse.handle_cursor_moved(PhysicalPosition::new(50.0, 50.0));
        mouse.handle_button(ElementState::Released);

        let uniform = mouse.as_uniform(100.0);
        assert_eq!(uniform[2], 5.0);
        assert_eq!(uniform[3], 95.0);
    }

    #[test]
    fn press_before_any_move_leaves_the_anchor_unset() {
        let mut mouse = MouseState::default();
        mouse.handle_button(ElementState::Pressed);
        assert_eq!(mouse.as_uniform(100.0), [0.0; 4]);
    }

    #[test]
    fn y_axis_is_flipped_to_bottom_left_origin() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(0.0, 0.0));
        let uniform = mouse.as_uniform(480.0);
        assert_eq!(uniform[1], 480.0);
    }
}
