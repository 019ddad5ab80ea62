use starfield_engine::{
    pack_frame, CommandBuffer, EventRecord, FrameHandle, FrameHeader, FrameOutcome, FrameRequest, InputEvent,
    PointerSubscription, ProtocolLayout, QueuedFrameHost, ResizeSubscription, StarfieldConfig, StarfieldHandle,
    Viewport,
};

type Handle = StarfieldHandle<CommandBuffer, QueuedFrameHost>;

/// Starfield runner behind the `#[wasm_bindgen]` exports.
///
/// The page owns one runner in a `thread_local!` and calls into it with free
/// functions, because wasm-bindgen cannot export generic structs directly.
/// Frame scheduling is inverted: after every call the page asks for the
/// pending frame request, schedules it with `requestAnimationFrame` or
/// `setTimeout`, and passes the request id back when it fires.
pub struct StarfieldRunner {
    handle: Handle,
    pointer: PointerSubscription,
    resize: ResizeSubscription,
    /// Header, draw commands, colour table and events of the last frame.
    frame_buffer: Vec<f32>,
    layout: ProtocolLayout,
    labels: Vec<String>,
    frame_counter: u64,
}

impl StarfieldRunner {
    pub fn new(config: StarfieldConfig, viewport: Viewport) -> Self {
        let mut handle = Handle::new(config, viewport, QueuedFrameHost::new());
        handle.attach_surface(CommandBuffer::with_capacity(4096));
        let pointer = handle.subscribe_pointer();
        let resize = handle.subscribe_resize();
        Self {
            handle,
            pointer,
            resize,
            frame_buffer: Vec::new(),
            layout: ProtocolLayout::new(0, 0, 0),
            labels: Vec::new(),
            frame_counter: 0,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut Handle {
        &mut self.handle
    }

    // ---- Scheduling ----

    pub fn start(&mut self) {
        self.handle.start();
    }

    pub fn cancel(&mut self) {
        self.handle.cancel();
    }

    pub fn restart(&mut self) {
        self.handle.restart();
    }

    /// A frame the page scheduled has fired. Stale or cancelled ids are
    /// ignored. Returns true when a new frame was published.
    pub fn on_frame(&mut self, id: u32, timestamp_ms: f64) -> bool {
        if !self.handle.host_mut().fire(FrameHandle(id)) {
            log::debug!("ignoring stale frame {}", id);
            return false;
        }
        match self.handle.on_frame(timestamp_ms) {
            FrameOutcome::Ticked(_) => {
                self.publish();
                true
            }
            _ => false,
        }
    }

    /// The frame the page should schedule next as `(id, delay_ms)`.
    /// A negative delay means "next animation frame".
    pub fn take_frame_request(&mut self) -> Option<(u32, f64)> {
        self.handle.host_mut().take_pending().map(|(FrameHandle(id), request)| match request {
            FrameRequest::NextFrame => (id, -1.0),
            FrameRequest::After(ms) => (id, ms),
        })
    }

    // ---- Input ----

    pub fn push_input(&self, event: InputEvent) {
        self.pointer.send(event);
    }

    pub fn request_resize(&self, width: f32, height: f32) {
        self.resize.resize(width, height);
    }

    // ---- Output ----

    /// Pack the surface, events and telemetry into the flat frame buffer.
    fn publish(&mut self) {
        self.frame_counter += 1;
        let events: Vec<EventRecord> = self.handle.drain_events().iter().map(|e| e.to_record()).collect();
        let header = FrameHeader {
            frame_counter: self.frame_counter,
            telemetry: self.handle.telemetry(),
            camera: self.handle.camera(),
            viewport: self.handle.engine().viewport(),
            label_count: self.handle.surface().map_or(0, |s| s.labels.len()),
        };
        let Some(surface) = self.handle.surface() else {
            return;
        };
        let colors = surface.color_floats();
        self.layout = pack_frame(&mut self.frame_buffer, &header, &surface.commands, &colors, &events);
        self.labels.clone_from(&surface.labels);
    }

    pub fn frame_buffer_ptr(&self) -> *const f32 {
        self.frame_buffer.as_ptr()
    }

    pub fn frame_buffer_len(&self) -> u32 {
        self.frame_buffer.len() as u32
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    /// Text for the TEXT commands of the last frame, in command order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn telemetry_json(&self) -> String {
        serde_json::to_string(&self.handle.telemetry()).unwrap_or_else(|e| {
            log::warn!("telemetry serialization failed: {}", e);
            String::from("{}")
        })
    }

    pub fn camera_json(&self) -> String {
        serde_json::to_string(&self.handle.camera()).unwrap_or_else(|e| {
            log::warn!("camera serialization failed: {}", e);
            String::from("{}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield_engine::bridge::protocol::{HEADER_COMMAND_COUNT, HEADER_FRAME_COUNTER};

    fn runner() -> StarfieldRunner {
        StarfieldRunner::new(StarfieldConfig::default(), Viewport::new(640.0, 480.0).unwrap())
    }

    #[test]
    fn start_hands_out_a_next_frame_request() {
        let mut r = runner();
        r.start();
        let (_, delay) = r.take_frame_request().unwrap();
        assert_eq!(delay, -1.0);
        assert!(r.take_frame_request().is_none());
    }

    #[test]
    fn fired_frame_publishes_buffer() {
        let mut r = runner();
        r.start();
        let (id, _) = r.take_frame_request().unwrap();
        assert!(r.on_frame(id, 16.0));
        assert_eq!(r.frame_buffer_len() as usize, r.layout().buffer_total_floats);
        let buf = &r.frame_buffer;
        assert_eq!(buf[HEADER_FRAME_COUNTER], 1.0);
        assert!(buf[HEADER_COMMAND_COUNT] > 0.0);
        assert_eq!(r.labels().len(), 4);
    }

    #[test]
    fn stale_frame_ids_are_ignored() {
        let mut r = runner();
        r.start();
        let (id, _) = r.take_frame_request().unwrap();
        r.restart();
        assert!(!r.on_frame(id, 16.0));
        let (fresh, delay) = r.take_frame_request().unwrap();
        assert_eq!(delay, 100.0);
        assert!(r.on_frame(fresh, 200.0));
    }
}
