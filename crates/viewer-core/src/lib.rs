pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.2;

/// Uniform scale factor applied to every page in the strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    level: f32,
}

impl Zoom {
    pub fn new() -> Self {
        Self { level: 1.0 }
    }

    pub fn level(self) -> f32 {
        self.level
    }

    pub fn zoom_in(&mut self) {
        self.level = (self.level + ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.level = (self.level - ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Reset to the fit-to-width scale, which is exactly 1.0.
    pub fn fit_width(&mut self) {
        self.level = 1.0;
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Untriggered,
    Triggered,
}

/// One-way gate that recognizes the reader reaching the end of the strip.
///
/// `evaluate` returns `true` exactly once per session; only `reset`
/// (a restart) re-arms it. Re-evaluating near the end while already
/// triggered never fires again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionGate {
    state: Completion,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self { state: Completion::Untriggered }
    }

    pub fn is_triggered(self) -> bool {
        self.state == Completion::Triggered
    }

    /// Transition guard, evaluated on every scroll-settle.
    ///
    /// `end_distance_px` is how far the strip bottom sits below the
    /// viewport bottom (negative once it has scrolled past it).
    pub fn evaluate(&mut self, on_last_page: bool, end_distance_px: f32, tolerance_px: f32) -> bool {
        if self.state == Completion::Triggered {
            return false;
        }

        if on_last_page && end_distance_px <= tolerance_px {
            self.state = Completion::Triggered;
            return true;
        }

        false
    }

    pub fn reset(&mut self) {
        self.state = Completion::Untriggered;
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical layout of the rendered strip: per-page display heights at
/// zoom 1.0 plus uniform spacing, scaled by the current zoom factor.
#[derive(Debug, Clone, PartialEq)]
pub struct StripGeometry {
    page_heights_px: Vec<f32>,
    spacing_px: f32,
    zoom: f32,
}

impl StripGeometry {
    pub fn new(page_heights_px: Vec<f32>, spacing_px: f32) -> Self {
        Self { page_heights_px, spacing_px, zoom: 1.0 }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn page_count(&self) -> u32 {
        self.page_heights_px.len() as u32
    }

    fn scaled_height(&self, index: usize) -> f32 {
        self.page_heights_px[index] * self.zoom
    }

    /// Top offset of a page (1-based) within the strip.
    pub fn page_top(&self, page: u32) -> f32 {
        let mut cursor = 0.0;
        for index in 0..self.page_heights_px.len() {
            if index as u32 + 1 == page {
                break;
            }
            cursor += self.scaled_height(index) + self.spacing_px;
        }
        cursor
    }

    pub fn page_center(&self, page: u32) -> f32 {
        let index = page.saturating_sub(1) as usize;
        self.page_top(page) + self.scaled_height(index) / 2.0
    }

    pub fn content_height(&self) -> f32 {
        let pages: f32 = (0..self.page_heights_px.len()).map(|i| self.scaled_height(i)).sum();
        let gaps = self.page_heights_px.len().saturating_sub(1) as f32;
        pages + gaps * self.spacing_px
    }

    /// Page (1-based) whose center is nearest to `center_y` in strip
    /// coordinates. Pages are scanned in order with a strict comparison,
    /// so an exact tie resolves to the lower page number.
    pub fn nearest_page_to(&self, center_y: f32) -> Option<u32> {
        let mut nearest = None;
        let mut nearest_distance = f32::INFINITY;
        let mut cursor = 0.0;

        for index in 0..self.page_heights_px.len() {
            let height = self.scaled_height(index);
            let distance = (cursor + height / 2.0 - center_y).abs();

            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = Some(index as u32 + 1);
            }

            cursor += height + self.spacing_px;
        }

        nearest
    }

    /// Page nearest the viewport's vertical center for a given scroll
    /// offset.
    pub fn page_at_viewport_center(
        &self,
        scroll_offset_px: f32,
        viewport_height_px: f32,
    ) -> Option<u32> {
        self.nearest_page_to(scroll_offset_px + viewport_height_px / 2.0)
    }

    /// How far the strip bottom sits below the viewport bottom.
    pub fn end_distance(&self, scroll_offset_px: f32, viewport_height_px: f32) -> f32 {
        self.content_height() - (scroll_offset_px + viewport_height_px)
    }
}

/// Navigation state of one viewing session. Single-writer: only the UI
/// thread mutates it, through these methods.
#[derive(Debug, Clone)]
pub struct ViewerState {
    current_page: u32,
    total_pages: u32,
    zoom: Zoom,
    completion: CompletionGate,
}

impl ViewerState {
    pub fn new(total_pages: u32) -> Self {
        Self {
            current_page: if total_pages == 0 { 0 } else { 1 },
            total_pages,
            zoom: Zoom::new(),
            completion: CompletionGate::new(),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }

    pub fn on_last_page(&self) -> bool {
        self.total_pages > 0 && self.current_page == self.total_pages
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    pub fn completion_mut(&mut self) -> &mut CompletionGate {
        &mut self.completion
    }

    /// Advance to the next page. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages {
            self.current_page += 1;
            return true;
        }
        false
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            return true;
        }
        false
    }

    /// Jump directly to a page, clamped to the discovered range. Used by
    /// scroll-sync, so out-of-range requests are clamped rather than
    /// rejected.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if self.total_pages == 0 {
            return false;
        }

        let target = page.clamp(1, self.total_pages);
        if target != self.current_page {
            self.current_page = target;
            return true;
        }
        false
    }

    /// Rewind to page 1 and re-arm the completion gate. Does not touch
    /// zoom or rendered pages.
    pub fn restart(&mut self) {
        if self.total_pages > 0 {
            self.current_page = 1;
        }
        self.completion.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn zoom_steps_stay_clamped() {
        let mut zoom = Zoom::new();
        for _ in 0..20 {
            zoom.zoom_in();
        }
        assert!(close_to(zoom.level(), ZOOM_MAX));

        for _ in 0..40 {
            zoom.zoom_out();
        }
        assert!(close_to(zoom.level(), ZOOM_MIN));
    }

    #[test]
    fn fit_width_always_yields_one() {
        let mut zoom = Zoom::new();
        zoom.zoom_in();
        zoom.zoom_in();
        zoom.fit_width();
        assert_eq!(zoom.level(), 1.0);

        zoom.zoom_out();
        zoom.fit_width();
        assert_eq!(zoom.level(), 1.0);
    }

    #[test]
    fn navigation_never_leaves_page_range() {
        let mut state = ViewerState::new(3);
        assert_eq!(state.current_page(), 1);

        assert!(!state.prev_page());
        assert_eq!(state.current_page(), 1);

        assert!(state.next_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert_eq!(state.current_page(), 3);
    }

    #[test]
    fn navigation_is_a_no_op_on_an_empty_library() {
        let mut state = ViewerState::new(0);
        assert!(state.is_empty());
        assert!(!state.next_page());
        assert!(!state.prev_page());
        assert!(!state.go_to_page(5));
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn go_to_page_clamps_to_discovered_range() {
        let mut state = ViewerState::new(5);
        assert!(state.go_to_page(9));
        assert_eq!(state.current_page(), 5);

        assert!(state.go_to_page(0));
        assert_eq!(state.current_page(), 1);

        assert!(!state.go_to_page(1));
    }

    #[test]
    fn restart_rewinds_and_rearms_completion() {
        let mut state = ViewerState::new(2);
        state.next_page();
        assert!(state.completion_mut().evaluate(true, 0.0, 100.0));
        assert!(state.completion_mut().is_triggered());

        state.restart();
        assert_eq!(state.current_page(), 1);
        assert!(!state.completion_mut().is_triggered());
    }

    #[test]
    fn nearest_page_tracks_viewport_center() {
        let strip = StripGeometry::new(vec![1000.0; 6], 16.0);

        // Page 5 spans [4064, 5064); its center is 4564.
        let page = strip.page_at_viewport_center(4164.0, 800.0);
        assert_eq!(page, Some(5));
    }

    #[test]
    fn nearest_page_exact_tie_prefers_lower_page() {
        // Two equal pages, no spacing: y = 1000 is equidistant from both
        // centers (500 and 1500).
        let strip = StripGeometry::new(vec![1000.0, 1000.0], 0.0);
        assert_eq!(strip.nearest_page_to(1000.0), Some(1));
    }

    #[test]
    fn nearest_page_on_empty_strip_is_none() {
        let strip = StripGeometry::new(Vec::new(), 16.0);
        assert_eq!(strip.nearest_page_to(0.0), None);
    }

    #[test]
    fn geometry_scales_with_zoom() {
        let mut strip = StripGeometry::new(vec![1000.0, 1000.0], 10.0);
        assert!(close_to(strip.content_height(), 2010.0));
        assert!(close_to(strip.page_center(2), 1510.0));

        strip.set_zoom(2.0);
        assert!(close_to(strip.content_height(), 4010.0));
        assert!(close_to(strip.page_top(2), 2010.0));
        assert!(close_to(strip.page_center(2), 3010.0));
    }

    #[test]
    fn end_distance_measures_remaining_scroll() {
        let strip = StripGeometry::new(vec![1000.0, 1000.0], 0.0);
        assert!(close_to(strip.end_distance(1200.0, 700.0), 100.0));
        assert!(close_to(strip.end_distance(1400.0, 700.0), -100.0));
    }

    #[test]
    fn completion_gate_fires_exactly_once() {
        let mut gate = CompletionGate::new();

        assert!(!gate.evaluate(false, 0.0, 100.0));
        assert!(!gate.evaluate(true, 250.0, 100.0));

        assert!(gate.evaluate(true, 40.0, 100.0));

        // The reader keeps scrolling near the end; the gate stays shut.
        for _ in 0..10 {
            assert!(!gate.evaluate(true, 0.0, 100.0));
        }

        gate.reset();
        assert!(gate.evaluate(true, -20.0, 100.0));
    }
}
