use glam::Vec2;

/// Height reserved for the control bar, in logical pixels.
pub const TOP_BAR_HEIGHT: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Width over height; `1.0` for a degenerate rectangle.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Integer scissor rectangle clamped to a `bounds` sized target.
    #[must_use]
    pub fn to_scissor(&self, bounds: (u32, u32)) -> (u32, u32, u32, u32) {
        let clamp = |v: f32, max: u32| (v.max(0.0).round() as u32).min(max);
        let x = clamp(self.x, bounds.0);
        let y = clamp(self.y, bounds.1);
        let right = clamp(self.x + self.width, bounds.0);
        let bottom = clamp(self.y + self.height, bounds.1);
        (x, y, right - x, bottom - y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Side by side.
    Horizontal,
    /// Stacked.
    Vertical,
}

/// Splits the area below the top bar into two equal viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerLayout {
    pub top_bar: Rect,
    pub viewports: [Rect; 2],
    pub axis: SplitAxis,
}

impl ViewerLayout {
    #[must_use]
    pub fn compute(width: f32, height: f32, top_bar_height: f32) -> Self {
        let bar = top_bar_height.clamp(0.0, height.max(0.0));
        let area = Rect::new(0.0, bar, width.max(0.0), (height - bar).max(0.0));

        let axis = if area.width >= area.height {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        };

        let viewports = match axis {
            SplitAxis::Horizontal => {
                let half = (area.width / 2.0).floor();
                [
                    Rect::new(area.x, area.y, half, area.height),
                    Rect::new(area.x + half, area.y, area.width - half, area.height),
                ]
            }
            SplitAxis::Vertical => {
                let half = (area.height / 2.0).floor();
                [
                    Rect::new(area.x, area.y, area.width, half),
                    Rect::new(area.x, area.y + half, area.width, area.height - half),
                ]
            }
        };

        Self {
            top_bar: Rect::new(0.0, 0.0, width.max(0.0), bar),
            viewports,
            axis,
        }
    }

    /// Index of the viewport under `point`.
    #[must_use]
    pub fn viewport_at(&self, point: Vec2) -> Option<usize> {
        self.viewports.iter().position(|r| r.contains(point))
    }
}
