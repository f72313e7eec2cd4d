use image::{imageops, Rgb, RgbImage};

use crate::mask::{apply_stroke, fill_enclosed, BrushMode, BrushState, MaskBuffer};
use crate::render::{Compositor, ExportPreview, LivePreview};
use crate::session::{LoadedItem, Progress, SessionItem, SessionQueue};
use crate::source::ImageSource;
use crate::store::{LabelStore, StoreError};
use crate::view::CoordinateMapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Draws
    Primary,
    /// Erases
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fill,
    Clear,
    Save,
    Skip,
    AdjustBrush(i32),
}

/// What a command did, for the shell to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Filled { regions: usize },
    NoEnclosedRegion,
    Cleared,
    Saved { name: String },
    NothingToSave,
    Skipped { name: String },
    BrushSize(u8),
    /// The last item was handled or there was nothing to label
    SessionComplete,
}

struct ActiveItem {
    item: SessionItem,
    image: RgbImage,
    mask: MaskBuffer,
}

/// Everything one labeling pass needs, driven by toolkit-agnostic events
///
/// Pointer coordinates are in presentation-surface space; the mapper turns
/// them into mask pixels using the fit for the current surface size.
pub struct Annotator<S: ImageSource, L: LabelStore> {
    queue: SessionQueue,
    source: S,
    store: L,
    brush: BrushState,
    mapper: CoordinateMapper,
    active: Option<ActiveItem>,
    last_point: Option<(u32, u32)>,
    live: LivePreview,
    export: ExportPreview,
}

impl<S: ImageSource, L: LabelStore> Annotator<S, L> {
    /// Load the first readable pending item
    pub fn new(
        queue: SessionQueue,
        source: S,
        store: L,
        brush: BrushState,
        surface: (f32, f32),
    ) -> Self {
        let mut annotator = Self {
            queue,
            source,
            store,
            brush,
            mapper: CoordinateMapper::new(surface.0, surface.1),
            active: None,
            last_point: None,
            live: LivePreview::default(),
            export: ExportPreview::default(),
        };
        let first = annotator.queue.load_current(&mut annotator.source);
        annotator.activate(first);
        annotator
    }

    pub fn current(&self) -> Option<&SessionItem> {
        self.active.as_ref().map(|a| &a.item)
    }

    pub fn mask(&self) -> Option<&MaskBuffer> {
        self.active.as_ref().map(|a| &a.mask)
    }

    pub fn brush(&self) -> BrushState {
        self.brush
    }

    pub fn progress(&self) -> Progress {
        self.queue.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.active.is_none()
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.mapper.resize(width, height);
    }

    pub fn on_pointer_down(&mut self, button: PointerButton, x: f32, y: f32) {
        let Some(point) = self.mapper.to_image(x, y) else {
            return;
        };
        self.brush.mode = match button {
            PointerButton::Primary => BrushMode::Draw,
            PointerButton::Secondary => BrushMode::Erase,
        };
        self.last_point = Some(point);
        self.paint(point, point);
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let Some(from) = self.last_point else {
            return;
        };
        let Some(to) = self.mapper.to_image(x, y) else {
            return;
        };
        self.paint(from, to);
        self.last_point = Some(to);
    }

    pub fn on_pointer_up(&mut self) {
        self.last_point = None;
    }

    /// Apply a command to the active item.
    ///
    /// Only `Save` can fail; on failure the item stays active so the
    /// operator can retry.
    pub fn on_command(&mut self, command: Command) -> Result<Outcome, StoreError> {
        let outcome = match (command, self.active.as_mut()) {
            (Command::AdjustBrush(delta), _) => {
                let size = self.brush.adjust(delta);
                tracing::debug!("Brush size {}", size);
                Outcome::BrushSize(size)
            }
            (_, None) => Outcome::SessionComplete,
            (Command::Fill, Some(active)) => match fill_enclosed(&mut active.mask) {
                0 => {
                    tracing::info!("No enclosed region found, draw a closed boundary first");
                    Outcome::NoEnclosedRegion
                }
                regions => {
                    tracing::info!("Filled {} region(s)", regions);
                    Outcome::Filled { regions }
                }
            },
            (Command::Clear, Some(active)) => {
                active.mask.clear();
                Outcome::Cleared
            }
            (Command::Save, Some(active)) => {
                if active.mask.is_empty() {
                    tracing::info!("Nothing drawn, draw a region before saving");
                    return Ok(Outcome::NothingToSave);
                }
                let preview = self.export.compose(&active.image, &active.mask);
                self.store.save(&active.item.name, &active.mask, &preview)?;

                let name = active.item.name.clone();
                tracing::info!("Saved: {} ({} px)", name, active.mask.count());
                self.queue.mark_labeled();
                self.next_item();
                Outcome::Saved { name }
            }
            (Command::Skip, Some(active)) => {
                let name = active.item.name.clone();
                tracing::info!("Skipped: {}", name);
                self.next_item();
                Outcome::Skipped { name }
            }
        };

        Ok(outcome)
    }

    /// Abandon the session; the in-progress mask is discarded
    pub fn quit(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!("Quit, discarding unsaved work on {}", active.item.name);
        }
        self.mapper.set_image(None);
        self.last_point = None;
    }

    /// Interactive composite at native resolution
    pub fn preview(&self) -> Option<RgbImage> {
        let active = self.active.as_ref()?;
        Some(self.live.compose(&active.image, &active.mask))
    }

    /// Interactive composite scaled and letterboxed onto the surface
    pub fn present(&self) -> Option<RgbImage> {
        let preview = self.preview()?;
        let fit = self.mapper.fit()?;
        let (cw, ch) = self.mapper.surface();

        let w = ((preview.width() as f32 * fit.scale).round() as u32).max(1);
        let h = ((preview.height() as f32 * fit.scale).round() as u32).max(1);
        let scaled = imageops::resize(&preview, w, h, imageops::FilterType::Triangle);

        let mut frame = RgbImage::from_pixel(cw.round() as u32, ch.round() as u32, Rgb([0, 0, 0]));
        imageops::overlay(
            &mut frame,
            &scaled,
            fit.offset_x.round() as i64,
            fit.offset_y.round() as i64,
        );
        Some(frame)
    }

    fn paint(&mut self, from: (u32, u32), to: (u32, u32)) {
        if let Some(active) = self.active.as_mut() {
            apply_stroke(&mut active.mask, from, to, self.brush.size(), self.brush.mode);
        }
    }

    fn next_item(&mut self) {
        let next = self.queue.advance(&mut self.source);
        self.activate(next);
    }

    fn activate(&mut self, loaded: Option<LoadedItem>) {
        self.last_point = None;
        self.active = loaded.map(|loaded| {
            let (width, height) = loaded.image.dimensions();
            tracing::debug!(
                "Now labeling {} ({}x{}), item {} of {} pending",
                loaded.item.name,
                width,
                height,
                self.queue.cursor() + 1,
                self.queue.pending().len()
            );
            ActiveItem {
                item: loaded.item,
                image: loaded.image,
                mask: MaskBuffer::new(width, height),
            }
        });
        self.mapper
            .set_image(self.active.as_ref().map(|a| a.image.dimensions()));

        if self.active.is_none() {
            let progress = self.queue.progress();
            tracing::info!(
                "All images processed ({}/{} labeled)",
                progress.labeled,
                progress.total
            );
        }
    }
}
