//! Slot Reel entry point
//!
//! Hosts the browser frame loop on wasm32 and a headless demo spin natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use slot_reel::renderer::{self, ProceduralSymbols, ReelAtlas, ReelRenderState};
    use slot_reel::sim::{OutcomeProvider, SeededOutcome};
    use slot_reel::symbols::DEFAULT_LAYOUT;
    use slot_reel::{ReelConfig, ReelError, SlotMachine, SpinEvent, SpinRequest, Viewport};

    const CONTAINER_ID: &str = "slot";
    const SPIN_BUTTON_ID: &str = "spin-btn";
    const GOING_CLASS: &str = "is-spinning-going";
    const STOPPED_CLASS: &str = "is-spinning-stopped";

    /// Browser-side state shared by the frame loop and input handlers
    struct Host {
        machine: SlotMachine<ReelRenderState>,
        outcomes: SeededOutcome,
        canvas: HtmlCanvasElement,
        last_time: f64,
    }

    impl Host {
        /// Spin at rest, quick-stop otherwise
        fn press(&mut self) {
            if !self.machine.engine().is_idle() {
                self.machine.force_stop();
                return;
            }

            let request = match self.outcomes.next_stops() {
                Ok(stops) => SpinRequest::new(stops),
                Err(e) => {
                    log::error!("No outcome available: {}", e);
                    return;
                }
            };
            if let Err(e) = self.machine.begin_spin(request) {
                log::error!("Spin rejected: {}", e);
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) / 1000.0
            } else {
                0.0
            };
            self.last_time = time;

            match self.machine.frame(dt) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    self.machine.renderer_mut().reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }

            for event in self.machine.drain_events() {
                apply_event(&event);
            }
        }

        /// Current canvas size in physical pixels
        fn measure(&self) -> Viewport {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            let width = (self.canvas.client_width().max(1) as f64 * dpr) as u32;
            let height = (self.canvas.client_height().max(1) as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            Viewport::new(width, height)
        }
    }

    /// Mirror spin lifecycle on the body element for page styling
    fn apply_event(event: &SpinEvent) {
        let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        else {
            return;
        };
        let classes = body.class_list();
        match event {
            SpinEvent::SpinStarted { .. } => {
                let _ = classes.remove_1(STOPPED_CLASS);
                let _ = classes.add_1(GOING_CLASS);
            }
            SpinEvent::SpinCompleted { stops } => {
                log::info!("Landed on {:?}", stops);
                let _ = classes.remove_1(GOING_CLASS);
                let _ = classes.add_1(STOPPED_CLASS);
            }
            _ => {}
        }
    }

    fn surface_error(what: &str) -> ReelError {
        ReelError::SurfaceUnavailable(what.to_string())
    }

    fn create_canvas(document: &Document) -> Result<HtmlCanvasElement, ReelError> {
        let container = document
            .get_element_by_id(CONTAINER_ID)
            .ok_or_else(|| surface_error("missing #slot container"))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| surface_error("cannot create canvas"))?
            .dyn_into()
            .map_err(|_| surface_error("not a canvas"))?;
        let _ = canvas.set_attribute("style", "display:block;width:100%;height:100%");
        container
            .append_child(&canvas)
            .map_err(|_| surface_error("cannot attach canvas"))?;
        Ok(canvas)
    }

    async fn start() -> Result<Rc<RefCell<Host>>, ReelError> {
        let window = web_sys::window().ok_or_else(|| surface_error("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| surface_error("no document"))?;
        let canvas = create_canvas(&document)?;

        let config = ReelConfig {
            symbols_per_reel: DEFAULT_LAYOUT.len() as u32,
            ..ReelConfig::default()
        };
        config.validate()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width().max(1) as f64 * dpr) as u32;
        let height = (canvas.client_height().max(1) as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let viewport = Viewport::new(width, height);

        let atlas = ReelAtlas::build(
            &DEFAULT_LAYOUT,
            config.reel_count,
            &ProceduralSymbols::default(),
        )?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| ReelError::SurfaceUnavailable(e.to_string()))?;
        let render_state = renderer::init(&instance, surface, viewport, &atlas, &config).await?;

        let seed = js_sys::Date::now() as u64;
        let outcomes = SeededOutcome::new(DEFAULT_LAYOUT.to_vec(), config.reel_count, seed);
        let machine = SlotMachine::new(config, viewport, render_state)?;

        log::info!("Slot machine ready with seed {}", seed);

        Ok(Rc::new(RefCell::new(Host {
            machine,
            outcomes,
            canvas,
            last_time: 0.0,
        })))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Slot Reel starting...");

        let host = match start().await {
            Ok(host) => host,
            Err(e) => {
                log::error!("Slot machine failed to start: {}", e);
                return;
            }
        };

        setup_input_handlers(host.clone());
        setup_resize_observer(host.clone());
        request_animation_frame(host);
    }

    fn setup_input_handlers(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if matches!(event.key().as_str(), " " | "Enter") && !event.repeat() {
                    event.prevent_default();
                    host.borrow_mut().press();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Spin button
        if let Some(btn) = window
            .document()
            .and_then(|d| d.get_element_by_id(SPIN_BUTTON_ID))
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                host.borrow_mut().press();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_observer(host: Rc<RefCell<Host>>) {
        let canvas = host.borrow().canvas.clone();
        let observed = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_entries: js_sys::Array| {
            let mut h = observed.borrow_mut();
            let viewport = h.measure();
            h.machine.on_resize(viewport);
        });

        match web_sys::ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&canvas);
                closure.forget();
            }
            Err(e) => log::warn!("ResizeObserver unavailable: {:?}", e),
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(host: Rc<RefCell<Host>>, time: f64) {
        host.borrow_mut().frame(time);
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_host::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Slot Reel (native) starting...");
    log::info!("Rendering requires a browser surface - running a headless spin");

    if let Err(e) = headless_spin() {
        log::error!("Headless spin failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn headless_spin() -> Result<(), slot_reel::ReelError> {
    use slot_reel::renderer::HeadlessRenderer;
    use slot_reel::sim::{OutcomeProvider, SeededOutcome};
    use slot_reel::symbols::DEFAULT_LAYOUT;
    use slot_reel::{ReelConfig, SlotMachine, SpinEvent, SpinRequest, Viewport};

    const FRAME_DT: f64 = 1.0 / 60.0;
    const MAX_FRAMES: usize = 60 * 30;

    let config = ReelConfig {
        symbols_per_reel: DEFAULT_LAYOUT.len() as u32,
        ..ReelConfig::default()
    };
    let mut outcomes = SeededOutcome::new(DEFAULT_LAYOUT.to_vec(), config.reel_count, 0x5107);
    let mut machine = SlotMachine::new(config, Viewport::new(1280, 720), HeadlessRenderer::new())?;

    let stops = outcomes.next_stops()?;
    log::info!("Spinning to {:?}", stops);
    machine.begin_spin(SpinRequest::new(stops))?;

    for frame in 0..MAX_FRAMES {
        let Ok(()) = machine.frame(FRAME_DT);
        for event in machine.drain_events() {
            match event {
                SpinEvent::ReelStopped { reel, segment } => {
                    log::info!(
                        "Reel {} stopped on {} ({})",
                        reel,
                        segment,
                        DEFAULT_LAYOUT[(segment - 1) as usize]
                    );
                }
                SpinEvent::SpinCompleted { stops } => {
                    log::info!(
                        "Spin complete after {} frames: {:?}",
                        frame + 1,
                        machine.engine().visible_segments()
                    );
                    debug_assert_eq!(stops, machine.engine().visible_segments());
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    log::warn!("Spin did not settle within {} frames", MAX_FRAMES);
    Ok(())
}
