use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use backdrop::animation::{AnimationHandle, FrameScheduler};
use backdrop::clock::Clock;
use backdrop::lifecycle::Backdrop;
use backdrop::render::WindowBinder;
use backdrop::viewport::Viewport;

const INITIAL_WINDOW_WIDTH: u32 = 1024;
const INITIAL_WINDOW_HEIGHT: u32 = 768;

/// Frame scheduling over winit redraw requests.
///
/// winit cannot retract a requested redraw, so `cancel` is bookkeeping
/// only; the driver's cleared pending slot is what keeps a late redraw
/// from ticking.
#[derive(Default)]
struct RedrawScheduler {
    window: Option<Arc<Window>>,
    next: u64,
}

impl FrameScheduler for RedrawScheduler {
    fn schedule(&mut self) -> AnimationHandle {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        let handle = AnimationHandle::from_raw(self.next);
        self.next += 1;
        handle
    }

    fn cancel(&mut self, _handle: AnimationHandle) {}
}

struct App {
    backdrop: Backdrop,
    binder: WindowBinder,
    scheduler: RedrawScheduler,
    clock: Clock,
}

impl App {
    fn new() -> Self {
        Self {
            backdrop: Backdrop::new(),
            binder: WindowBinder::new(),
            scheduler: RedrawScheduler::default(),
            clock: Clock::new(),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.backdrop.unmount(&mut self.scheduler);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scheduler.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Backdrop")
                .with_transparent(true)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.binder.set_window(window.clone());
        self.scheduler.window = Some(window);

        let viewport = Viewport::new(size.width, size.height);
        if let Err(e) = self
            .backdrop
            .mount(&mut self.binder, &mut self.scheduler, viewport)
        {
            error!("failed to mount backdrop: {e}");
            self.shutdown(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                self.backdrop
                    .handle_resize(Viewport::new(size.width, size.height));
            }
            WindowEvent::RedrawRequested => {
                let time = self.clock.elapsed();
                if let Err(e) = self.backdrop.tick(time, &mut self.scheduler) {
                    error!("draw failed, stopping: {e}");
                    self.shutdown(event_loop);
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    let mut app = App::new();

    info!("starting backdrop, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
