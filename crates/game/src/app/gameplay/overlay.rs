use engine::{Canvas, Rgba, ScreenRect};

use super::animation::{SpriteAnimator, SpriteSheet};

const PANEL_WIDTH: f32 = 160.0;
const PANEL_HEIGHT: f32 = 120.0;
const PANEL_MARGIN: f32 = 16.0;
const MASK_SIZE: f32 = 104.0;
const PANEL_FILL: Rgba = [0, 0, 0, 200];
const PANEL_STROKE: Rgba = [255, 255, 255, 85];

/// Decoration shown for the length of a conversation.
pub(crate) trait FaceFilter {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
    fn tick(&mut self, _dt_seconds: f32) {}
    fn render(&self, _canvas: &mut dyn Canvas) {}
}

/// Animated mask in a corner panel. Without a mask sheet it never draws.
#[derive(Debug, Clone)]
pub(crate) struct MaskOverlay {
    visible: bool,
    animator: Option<SpriteAnimator>,
}

impl MaskOverlay {
    pub(crate) fn new(mask: Option<SpriteSheet>) -> Self {
        Self {
            visible: false,
            animator: mask.map(SpriteAnimator::new),
        }
    }

    #[cfg(test)]
    pub(crate) fn has_mask(&self) -> bool {
        self.animator.is_some()
    }
}

impl FaceFilter for MaskOverlay {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn tick(&mut self, dt_seconds: f32) {
        if !self.visible {
            return;
        }
        if let Some(animator) = self.animator.as_mut() {
            animator.update(dt_seconds);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        if !self.visible {
            return;
        }
        let Some(animator) = self.animator.as_ref() else {
            return;
        };
        let (screen_width, _) = canvas.viewport();
        let panel = ScreenRect::new(
            screen_width as f32 - PANEL_WIDTH - PANEL_MARGIN,
            PANEL_MARGIN,
            PANEL_WIDTH,
            PANEL_HEIGHT,
        );
        canvas.fill_rect(panel, PANEL_FILL);
        canvas.stroke_rect(panel, PANEL_STROKE);
        animator.draw(
            canvas,
            panel.x + (PANEL_WIDTH - MASK_SIZE) / 2.0,
            panel.y + (PANEL_HEIGHT - MASK_SIZE) / 2.0,
            MASK_SIZE,
        );
    }
}

#[cfg(test)]
mod tests {
    use engine::{AssetStore, ImageId, LoadedImage, SourceRect};

    use super::*;

    #[derive(Default)]
    struct CountingCanvas {
        fills: Vec<ScreenRect>,
        regions: Vec<(SourceRect, ScreenRect)>,
    }

    impl Canvas for CountingCanvas {
        fn viewport(&self) -> (u32, u32) {
            (1280, 720)
        }

        fn clear(&mut self, _color: Rgba) {}

        fn draw_image(&mut self, _image: ImageId, _dest: ScreenRect) {}

        fn draw_image_region(&mut self, _image: ImageId, source: SourceRect, dest: ScreenRect) {
            self.regions.push((source, dest));
        }

        fn fill_rect(&mut self, dest: ScreenRect, _color: Rgba) {
            self.fills.push(dest);
        }

        fn stroke_rect(&mut self, _dest: ScreenRect, _color: Rgba) {}

        fn draw_text(&mut self, _x: f32, _y: f32, _text: &str, _color: Rgba) {}
    }

    fn mask() -> SpriteSheet {
        let mut store = AssetStore::default();
        SpriteSheet {
            image: store.insert(
                "clown.png",
                LoadedImage::from_rgba(1, 1, vec![0; 4]).expect("image"),
            ),
            frame_width: 128,
            frame_height: 128,
            frame_count: 6,
            frame_seconds: 0.3,
        }
    }

    #[test]
    fn hidden_overlay_draws_nothing() {
        let overlay = MaskOverlay::new(Some(mask()));
        let mut canvas = CountingCanvas::default();

        overlay.render(&mut canvas);

        assert!(canvas.fills.is_empty());
        assert!(canvas.regions.is_empty());
    }

    #[test]
    fn shown_overlay_draws_panel_in_top_right() {
        let mut overlay = MaskOverlay::new(Some(mask()));
        overlay.show();
        let mut canvas = CountingCanvas::default();

        overlay.render(&mut canvas);

        assert_eq!(
            canvas.fills,
            vec![ScreenRect::new(1104.0, 16.0, 160.0, 120.0)]
        );
        assert_eq!(canvas.regions.len(), 1);
    }

    #[test]
    fn mask_animates_only_while_visible() {
        let mut overlay = MaskOverlay::new(Some(mask()));
        overlay.tick(0.3);
        overlay.show();
        overlay.tick(0.3);
        overlay.hide();
        overlay.tick(0.3);
        overlay.show();
        let mut canvas = CountingCanvas::default();

        overlay.render(&mut canvas);

        assert_eq!(canvas.regions[0].0.x, 128);
    }

    #[test]
    fn missing_mask_stays_inert() {
        let mut overlay = MaskOverlay::new(None);
        overlay.show();
        overlay.tick(1.0);
        let mut canvas = CountingCanvas::default();

        overlay.render(&mut canvas);

        assert!(!overlay.has_mask());
        assert!(overlay.is_visible());
        assert!(canvas.fills.is_empty());
    }
}
